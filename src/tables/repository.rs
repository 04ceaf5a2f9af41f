//! `github_repository`: repositories owned by a user or organization

use super::plugin::TableSource;
use super::transform::{login, parse_repo_full_name, timestamp, RowBuilder};
use super::types::{Column, ColumnType, Query, Table};
use crate::error::Result;
use crate::fetch::{Fetcher, Getter, IgnorePredicate};
use crate::github::{GitHubClient, Repository};
use crate::pagination::{ListOptions, Lister, Page};
use crate::types::Row;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use tracing::trace;

pub const TABLE_NAME: &str = "github_repository";

/// Table definition
pub fn table() -> Table {
    use ColumnType::String as Text;
    use ColumnType::{Bool, Int, Timestamp};

    Table {
        name: TABLE_NAME,
        description: "GitHub Repositories contain all of your project's files and each file's revision history.",
        columns: vec![
            Column::new("full_name", Text, "The full name of the repository, including the owner and repo name."),
            Column::new("owner_login", Text, "Login of the repository owner."),
            Column::new("name", Text, "The name of the repository."),
            Column::new("id", Int, "Unique ID of the repository."),
            Column::new("node_id", Text, "Node where GitHub stores this data internally."),
            Column::new("description", Text, "The description of the repository."),
            Column::new("private", Bool, "If true, the repository is private."),
            Column::new("fork", Bool, "If true, the repository is a fork."),
            Column::new("archived", Bool, "If true, the repository is archived and read-only."),
            Column::new("default_branch", Text, "The default branch of the repository."),
            Column::new("language", Text, "The primary language of the repository."),
            Column::new("stargazers_count", Int, "The number of users who have starred the repository."),
            Column::new("forks_count", Int, "The number of forks of the repository."),
            Column::new("open_issues_count", Int, "The number of open issues for the repository."),
            Column::new("created_at", Timestamp, "Timestamp when the repository was created."),
            Column::new("updated_at", Timestamp, "Timestamp when the repository was last updated."),
            Column::new("pushed_at", Timestamp, "Timestamp when the last push to the repository happened."),
            Column::new("html_url", Text, "The URL to view the repository."),
        ],
        list_keys: vec!["owner_login"],
        get_keys: vec!["full_name"],
        list_ignore: None,
        get_ignore: Some(IgnorePredicate::codes(&["404"])),
    }
}

/// Convert a repository into a row
pub fn repository_row(repository: Repository) -> Row {
    RowBuilder::new()
        .set("full_name", repository.full_name)
        .set("owner_login", login(repository.owner.as_ref()))
        .set("name", repository.name)
        .set("id", repository.id)
        .set("node_id", repository.node_id)
        .set("description", repository.description)
        .set("private", repository.private)
        .set("fork", repository.fork)
        .set("archived", repository.archived)
        .set("default_branch", repository.default_branch)
        .set("language", repository.language)
        .set("stargazers_count", repository.stargazers_count)
        .set("forks_count", repository.forks_count)
        .set("open_issues_count", repository.open_issues_count)
        .set("created_at", timestamp(repository.created_at))
        .set("updated_at", timestamp(repository.updated_at))
        .set("pushed_at", timestamp(repository.pushed_at))
        .set("html_url", repository.html_url)
        .build()
}

/// Lists the public repositories of one owner
pub struct RepositoryLister<'a> {
    client: &'a GitHubClient,
    owner: String,
}

impl<'a> RepositoryLister<'a> {
    pub fn new(client: &'a GitHubClient, owner: impl Into<String>) -> Self {
        Self {
            client,
            owner: owner.into(),
        }
    }
}

#[async_trait]
impl Lister for RepositoryLister<'_> {
    type Item = Row;

    async fn fetch_page(&self, opts: &ListOptions) -> Result<Page<Row>> {
        let page = self
            .client
            .list_owner_repositories(&self.owner, opts)
            .await?;
        Ok(page.map(repository_row))
    }
}

pub struct RepositoryGetter<'a> {
    client: &'a GitHubClient,
}

#[async_trait]
impl Getter for RepositoryGetter<'_> {
    /// `owner/repo`
    type Key = String;
    type Item = Row;

    async fn fetch_one(&self, full_name: &String) -> Result<Option<Row>> {
        let (owner, repo) = parse_repo_full_name(full_name);
        trace!("Getting repository owner={} repo={}", owner, repo);

        let repository = self.client.get_repository(&owner, &repo).await?;
        Ok(repository.map(repository_row))
    }
}

/// `github_repository` table source
#[derive(Default)]
pub struct RepositoryTable;

#[async_trait]
impl TableSource for RepositoryTable {
    fn table(&self) -> &Table {
        static TABLE: Lazy<Table> = Lazy::new(table);
        &TABLE
    }

    fn lister<'a>(
        &self,
        client: &'a GitHubClient,
        query: &Query,
    ) -> Result<Box<dyn Lister<Item = Row> + 'a>> {
        let owner = query.string_qual(TABLE_NAME, "owner_login")?;
        Ok(Box::new(RepositoryLister::new(client, owner)))
    }

    async fn get(&self, client: &GitHubClient, fetcher: &Fetcher, query: &Query) -> Result<Option<Row>> {
        let full_name = query.string_qual(TABLE_NAME, "full_name")?;
        fetcher
            .get(&RepositoryGetter { client }, &full_name, self.table().get_ignore.as_ref())
            .await
    }
}
