//! Table registry and query dispatch

use super::repository::RepositoryTable;
use super::release::ReleaseTable;
use super::types::{Query, Table};
use super::workflow::WorkflowTable;
use crate::connection::Connection;
use crate::error::{Error, Result};
use crate::fetch::{Fetcher, RetryPolicy};
use crate::github::GitHubClient;
use crate::pagination::{Lister, PaginationOutcome, Paginator, DEFAULT_PER_PAGE};
use crate::sink::{BoundedSink, RowSink};
use crate::types::Row;
use async_trait::async_trait;
use tracing::{debug, info};

/// A queryable table backed by the GitHub API
#[async_trait]
pub trait TableSource: Send + Sync {
    /// Static table description
    fn table(&self) -> &Table;

    /// Build the page lister for a list query, validating its quals
    fn lister<'a>(
        &self,
        client: &'a GitHubClient,
        query: &Query,
    ) -> Result<Box<dyn Lister<Item = Row> + 'a>>;

    /// Fetch the single row addressed by the query's get keys
    async fn get(
        &self,
        client: &GitHubClient,
        fetcher: &Fetcher,
        query: &Query,
    ) -> Result<Option<Row>>;
}

/// All tables served over one connection
pub struct Plugin {
    connection: Connection,
    sources: Vec<Box<dyn TableSource>>,
    policy: RetryPolicy,
    per_page: u32,
}

impl Plugin {
    /// Register every table against `connection`
    pub fn new(connection: Connection) -> Self {
        Self {
            connection,
            sources: vec![
                Box::new(ReleaseTable),
                Box::new(RepositoryTable),
                Box::new(WorkflowTable),
            ],
            policy: RetryPolicy::default(),
            per_page: DEFAULT_PER_PAGE,
        }
    }

    /// Override the retry policy used for every remote call
    #[must_use]
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Override the page size hint
    #[must_use]
    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page;
        self
    }

    /// Underlying connection
    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Metadata of every registered table, sorted by name
    pub fn tables(&self) -> Vec<&Table> {
        let mut tables: Vec<&Table> = self.sources.iter().map(|s| s.table()).collect();
        tables.sort_by_key(|t| t.name);
        tables
    }

    /// Look up a table by name
    pub fn table(&self, name: &str) -> Result<&Table> {
        self.source(name).map(|s| s.table())
    }

    /// Stream every row matching `query` into `sink`.
    ///
    /// Errors matching the table's list ignore predicate end the listing
    /// without failing it; rows already emitted are kept.
    pub async fn list(
        &self,
        table: &str,
        query: &Query,
        sink: &mut dyn RowSink<Row>,
    ) -> Result<PaginationOutcome> {
        let source = self.source(table)?;
        let client = self.connection.client()?;
        let lister = source.lister(client, query)?;

        let paginator = Paginator::new(self.fetcher(query))
            .per_page(self.per_page)
            .ignore_errors(source.table().list_ignore.clone());
        let mut bounded = BoundedSink::new(sink, query.limit, query.cancel.clone());

        info!("Listing {}", table);
        let outcome = paginator.run(lister.as_ref(), &mut bounded).await?;
        debug!(
            "Listed {}: {} rows in {} pages ({:?})",
            table, outcome.items, outcome.pages, outcome.stop
        );
        Ok(outcome)
    }

    /// Fetch the single row addressed by `query`
    pub async fn get(&self, table: &str, query: &Query) -> Result<Option<Row>> {
        let source = self.source(table)?;
        let client = self.connection.client()?;

        info!("Getting row from {}", table);
        source.get(client, &self.fetcher(query), query).await
    }

    fn source(&self, name: &str) -> Result<&dyn TableSource> {
        self.sources
            .iter()
            .find(|s| s.table().name == name)
            .map(|s| &**s)
            .ok_or_else(|| Error::TableNotFound {
                table: name.to_string(),
            })
    }

    fn fetcher(&self, query: &Query) -> Fetcher {
        Fetcher::new(self.policy.clone()).cancel_on(query.cancel.clone())
    }
}

impl std::fmt::Debug for Plugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Plugin")
            .field("connection", &self.connection)
            .field("tables", &self.tables().iter().map(|t| t.name).collect::<Vec<_>>())
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
