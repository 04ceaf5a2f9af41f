//! Typed GitHub REST calls
//!
//! Every method issues exactly one request through [`HttpClient`]; callers run
//! them under a [`crate::fetch::Fetcher`] to get rate-limit retries.

use super::types::{Release, Repository, Workflow, Workflows};
use crate::config::ResolvedConfig;
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpClientConfig, RequestConfig};
use crate::pagination::{next_page, ListOptions, Page};
use serde::de::DeserializeOwned;
use url::Url;

/// GitHub API client bound to one endpoint and token
#[derive(Debug)]
pub struct GitHubClient {
    http: HttpClient,
    base_url: Url,
}

impl GitHubClient {
    /// Build a client for a resolved connection
    pub fn new(resolved: &ResolvedConfig, mut http: HttpClientConfig) -> Result<Self> {
        http.base_url = Some(resolved.base_url.to_string());
        Ok(Self {
            http: HttpClient::with_token(http, resolved.token.as_str())?,
            base_url: resolved.base_url.clone(),
        })
    }

    /// API root requests are sent to
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ========================================================================
    // Releases
    // ========================================================================

    /// `GET /repos/{owner}/{repo}/releases`
    pub async fn list_releases(
        &self,
        owner: &str,
        repo: &str,
        opts: &ListOptions,
    ) -> Result<Page<Release>> {
        self.list(&self.endpoint(&["repos", owner, repo, "releases"])?, opts)
            .await
    }

    /// `GET /repos/{owner}/{repo}/releases/{id}`
    pub async fn get_release(&self, owner: &str, repo: &str, id: i64) -> Result<Option<Release>> {
        self.get(&self.endpoint(&["repos", owner, repo, "releases", &id.to_string()])?)
            .await
    }

    // ========================================================================
    // Workflows
    // ========================================================================

    /// `GET /repos/{owner}/{repo}/actions/workflows`
    pub async fn list_workflows(
        &self,
        owner: &str,
        repo: &str,
        opts: &ListOptions,
    ) -> Result<Page<Workflow>> {
        let url = self.endpoint(&["repos", owner, repo, "actions", "workflows"])?;
        let response = self
            .http
            .get_json::<Workflows>(&url, opts.to_request())
            .await?;

        let workflows = response.body.map(|w| w.workflows).unwrap_or_default();
        Ok(Page::new(workflows, next_page(&response.headers)))
    }

    /// `GET /repos/{owner}/{repo}/actions/workflows/{id}`
    pub async fn get_workflow(
        &self,
        owner: &str,
        repo: &str,
        id: i64,
    ) -> Result<Option<Workflow>> {
        self.get(&self.endpoint(&[
            "repos",
            owner,
            repo,
            "actions",
            "workflows",
            &id.to_string(),
        ])?)
        .await
    }

    // ========================================================================
    // Repositories
    // ========================================================================

    /// `GET /users/{owner}/repos`
    pub async fn list_owner_repositories(
        &self,
        owner: &str,
        opts: &ListOptions,
    ) -> Result<Page<Repository>> {
        self.list(&self.endpoint(&["users", owner, "repos"])?, opts)
            .await
    }

    /// `GET /repos/{owner}/{repo}`
    pub async fn get_repository(&self, owner: &str, repo: &str) -> Result<Option<Repository>> {
        self.get(&self.endpoint(&["repos", owner, repo])?).await
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    /// Absolute URL under the API root; each segment is percent-encoded, so
    /// `/`, `?` and `#` in owner or repo names stay inside their segment
    fn endpoint(&self, segments: &[&str]) -> Result<String> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::config(format!("'{}' cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url.into())
    }

    /// Fetch one page of a bare JSON array listing
    async fn list<T: DeserializeOwned>(&self, path: &str, opts: &ListOptions) -> Result<Page<T>> {
        let response = self
            .http
            .get_json::<Vec<T>>(path, opts.to_request())
            .await?;
        Ok(Page::new(
            response.body.unwrap_or_default(),
            next_page(&response.headers),
        ))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        let response = self.http.get_json::<T>(path, RequestConfig::new()).await?;
        Ok(response.body)
    }
}
