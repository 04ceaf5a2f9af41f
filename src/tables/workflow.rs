//! `github_workflow`: GitHub Actions workflows of one repository

use super::plugin::TableSource;
use super::transform::{parse_repo_full_name, timestamp, RowBuilder};
use super::types::{Column, ColumnType, Query, Table};
use crate::error::Result;
use crate::fetch::{Fetcher, Getter};
use crate::github::{GitHubClient, Workflow};
use crate::pagination::{ListOptions, Lister, Page};
use crate::types::Row;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use tracing::trace;

pub const TABLE_NAME: &str = "github_workflow";

/// Table definition
pub fn table() -> Table {
    use ColumnType::String as Text;
    use ColumnType::{Int, Timestamp};

    Table {
        name: TABLE_NAME,
        description: "GitHub Actions workflows defined in a repository.",
        columns: vec![
            Column::new("repository_full_name", Text, "Full name of the repository that contains the workflow."),
            Column::new("name", Text, "The name of the workflow."),
            Column::new("id", Int, "Unique ID of the workflow."),
            Column::new("path", Text, "Path of the workflow."),
            Column::new("badge_url", Text, "Badge URL for the workflow."),
            Column::new("created_at", Timestamp, "Time when the workflow was created."),
            Column::new("html_url", Text, "HTML URL for the workflow."),
            Column::new("node_id", Text, "Node where GitHub stores this data internally."),
            Column::new("state", Text, "State of the workflow."),
            Column::new("updated_at", Timestamp, "Time when the workflow was updated."),
            Column::new("url", Text, "URL of the workflow."),
        ],
        list_keys: vec!["repository_full_name"],
        get_keys: vec!["repository_full_name", "id"],
        list_ignore: None,
        get_ignore: None,
    }
}

/// Convert a workflow into a row
pub fn workflow_row(repository_full_name: &str, workflow: Workflow) -> Row {
    RowBuilder::new()
        .set("repository_full_name", repository_full_name)
        .set("name", workflow.name)
        .set("id", workflow.id)
        .set("path", workflow.path)
        .set("badge_url", workflow.badge_url)
        .set("created_at", timestamp(workflow.created_at))
        .set("html_url", workflow.html_url)
        .set("node_id", workflow.node_id)
        .set("state", workflow.state)
        .set("updated_at", timestamp(workflow.updated_at))
        .set("url", workflow.url)
        .build()
}

/// Lists the workflows of one repository
pub struct WorkflowLister<'a> {
    client: &'a GitHubClient,
    full_name: String,
    owner: String,
    repo: String,
}

impl<'a> WorkflowLister<'a> {
    pub fn new(client: &'a GitHubClient, full_name: impl Into<String>) -> Self {
        let full_name = full_name.into();
        let (owner, repo) = parse_repo_full_name(&full_name);
        Self {
            client,
            full_name,
            owner,
            repo,
        }
    }
}

#[async_trait]
impl Lister for WorkflowLister<'_> {
    type Item = Row;

    async fn fetch_page(&self, opts: &ListOptions) -> Result<Page<Row>> {
        let page = self
            .client
            .list_workflows(&self.owner, &self.repo, opts)
            .await?;
        Ok(page.map(|workflow| workflow_row(&self.full_name, workflow)))
    }
}

/// Key of a single workflow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowKey {
    pub full_name: String,
    pub id: i64,
}

impl WorkflowKey {
    pub fn from_query(query: &Query) -> Result<Self> {
        Ok(Self {
            full_name: query.string_qual(TABLE_NAME, "repository_full_name")?,
            id: query.int_qual(TABLE_NAME, "id")?,
        })
    }
}

pub struct WorkflowGetter<'a> {
    client: &'a GitHubClient,
}

#[async_trait]
impl Getter for WorkflowGetter<'_> {
    type Key = WorkflowKey;
    type Item = Row;

    async fn fetch_one(&self, key: &WorkflowKey) -> Result<Option<Row>> {
        let (owner, repo) = parse_repo_full_name(&key.full_name);
        trace!("Getting workflow owner={} repo={} id={}", owner, repo, key.id);

        let workflow = self.client.get_workflow(&owner, &repo, key.id).await?;
        Ok(workflow.map(|w| workflow_row(&key.full_name, w)))
    }
}

/// `github_workflow` table source
#[derive(Default)]
pub struct WorkflowTable;

#[async_trait]
impl TableSource for WorkflowTable {
    fn table(&self) -> &Table {
        static TABLE: Lazy<Table> = Lazy::new(table);
        &TABLE
    }

    fn lister<'a>(
        &self,
        client: &'a GitHubClient,
        query: &Query,
    ) -> Result<Box<dyn Lister<Item = Row> + 'a>> {
        let full_name = query.string_qual(TABLE_NAME, "repository_full_name")?;
        Ok(Box::new(WorkflowLister::new(client, full_name)))
    }

    async fn get(&self, client: &GitHubClient, fetcher: &Fetcher, query: &Query) -> Result<Option<Row>> {
        let key = WorkflowKey::from_query(query)?;
        fetcher
            .get(&WorkflowGetter { client }, &key, self.table().get_ignore.as_ref())
            .await
    }
}
