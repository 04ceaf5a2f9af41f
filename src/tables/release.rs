//! `github_release`: releases of one repository

use super::plugin::TableSource;
use super::transform::{json_column, login, parse_repo_full_name, timestamp, timestamp_non_zero, RowBuilder};
use super::types::{Column, ColumnType, Query, Table};
use crate::error::Result;
use crate::fetch::{Fetcher, Getter, IgnorePredicate};
use crate::github::{GitHubClient, Release};
use crate::pagination::{ListOptions, Lister, Page};
use crate::types::Row;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use tracing::trace;

pub const TABLE_NAME: &str = "github_release";

/// Table definition
pub fn table() -> Table {
    use ColumnType::{Bool, Int, Json, Timestamp};
    use ColumnType::String as Text;

    Table {
        name: TABLE_NAME,
        description: "GitHub Releases bundle project files for download by users.",
        columns: vec![
            Column::new("repository_full_name", Text, "Full name of the repository that contains the release."),
            Column::new("assets", Json, "List of assets contained in the release."),
            Column::new("assets_url", Text, "Assets URL for the release."),
            Column::new("author_login", Text, "The login name of the user that created the release."),
            Column::new("body", Text, "Text describing the contents of the tag."),
            Column::new("created_at", Timestamp, "Time when the release was created."),
            Column::new("draft", Bool, "True if this is a draft (unpublished) release."),
            Column::new("html_url", Text, "HTML URL for the release."),
            Column::new("id", Int, "Unique ID of the release."),
            Column::new("name", Text, "The name of the release."),
            Column::new("node_id", Text, "Node where GitHub stores this data internally."),
            Column::new("prerelease", Bool, "True if this is a prerelease version."),
            Column::new("published_at", Timestamp, "Time when the release was published."),
            Column::new("tag_name", Text, "The name of the tag the release is associated with."),
            Column::new("tarball_url", Text, "Tarball URL for the release."),
            Column::new("target_commitish", Text, "Branch or commit SHA the Git tag is created from."),
            Column::new("upload_url", Text, "Upload URL for the release."),
            Column::new("url", Text, "URL of the release."),
            Column::new("zipball_url", Text, "Zipball URL for the release."),
        ],
        list_keys: vec!["repository_full_name"],
        get_keys: vec!["repository_full_name", "id"],
        list_ignore: Some(IgnorePredicate::codes(&["404"])),
        get_ignore: Some(IgnorePredicate::codes(&["404"])),
    }
}

/// Convert a release into a row
pub fn release_row(repository_full_name: &str, release: Release) -> Row {
    RowBuilder::new()
        .set("repository_full_name", repository_full_name)
        .set("assets", json_column(&release.assets))
        .set("assets_url", release.assets_url)
        .set("author_login", login(release.author.as_ref()))
        .set("body", release.body)
        .set("created_at", timestamp(release.created_at))
        .set("draft", release.draft)
        .set("html_url", release.html_url)
        .set("id", release.id)
        .set("name", release.name)
        .set("node_id", release.node_id)
        .set("prerelease", release.prerelease)
        .set("published_at", timestamp_non_zero(release.published_at))
        .set("tag_name", release.tag_name)
        .set("tarball_url", release.tarball_url)
        .set("target_commitish", release.target_commitish)
        .set("upload_url", release.upload_url)
        .set("url", release.url)
        .set("zipball_url", release.zipball_url)
        .build()
}

/// Lists the releases of one repository
pub struct ReleaseLister<'a> {
    client: &'a GitHubClient,
    full_name: String,
    owner: String,
    repo: String,
}

impl<'a> ReleaseLister<'a> {
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
impl Lister for ReleaseLister<'_> {
    type Item = Row;

    async fn fetch_page(&self, opts: &ListOptions) -> Result<Page<Row>> {
        let page = self
            .client
            .list_releases(&self.owner, &self.repo, opts)
            .await?;
        Ok(page.map(|release| release_row(&self.full_name, release)))
    }
}

/// Key of a single release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseKey {
    pub full_name: String,
    pub id: i64,
}

impl ReleaseKey {
    pub fn from_query(query: &Query) -> Result<Self> {
        Ok(Self {
            full_name: query.string_qual(TABLE_NAME, "repository_full_name")?,
            id: query.int_qual(TABLE_NAME, "id")?,
        })
    }
}

/// Fetches a single release by ID
pub struct ReleaseGetter<'a> {
    client: &'a GitHubClient,
}

#[async_trait]
impl Getter for ReleaseGetter<'_> {
    type Key = ReleaseKey;
    type Item = Row;

    async fn fetch_one(&self, key: &ReleaseKey) -> Result<Option<Row>> {
        let (owner, repo) = parse_repo_full_name(&key.full_name);
        trace!("Getting release owner={} repo={} id={}", owner, repo, key.id);

        let release = self.client.get_release(&owner, &repo, key.id).await?;
        Ok(release.map(|r| release_row(&key.full_name, r)))
    }
}

/// `github_release` table source
#[derive(Default)]
pub struct ReleaseTable;

#[async_trait]
impl TableSource for ReleaseTable {
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
        Ok(Box::new(ReleaseLister::new(client, full_name)))
    }

    async fn get(&self, client: &GitHubClient, fetcher: &Fetcher, query: &Query) -> Result<Option<Row>> {
        let key = ReleaseKey::from_query(query)?;
        fetcher
            .get(&ReleaseGetter { client }, &key, self.table().get_ignore.as_ref())
            .await
    }
}
