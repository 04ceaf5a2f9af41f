//! Connection configuration
//!
//! A connection is described by an access token and an optional alternate
//! API endpoint (GitHub Enterprise). Values given explicitly in the connection
//! config win over the `GITHUB_TOKEN` / `GITHUB_BASE_URL` environment.

use crate::error::{Error, Result};
use crate::types::OptionStringExt;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use url::Url;

/// Public GitHub API endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.github.com/";

/// Environment variable holding the default access token
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Environment variable holding the default API endpoint
pub const BASE_URL_ENV: &str = "GITHUB_BASE_URL";

// ============================================================================
// Connection Config
// ============================================================================

/// Connection configuration as written in a connection file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Personal access token
    #[serde(default)]
    pub token: Option<String>,

    /// Alternate API endpoint, e.g. `https://github.example.com/`
    #[serde(default)]
    pub base_url: Option<String>,
}

impl ConnectionConfig {
    /// Create a config with an explicit token
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            base_url: None,
        }
    }

    /// Set the base URL
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Parse a config from YAML (JSON documents are accepted too)
    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Parse a config from a JSON string
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| Error::config(format!("Invalid config JSON: {e}")))
    }

    /// Load a config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read config file {}: {e}", path.display()))
        })?;
        Self::from_yaml(&content)
    }

    /// Resolve against the process environment
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        self.resolve_with(|key| std::env::var(key).ok())
    }

    /// Resolve against an arbitrary variable lookup
    pub fn resolve_with<F>(&self, env: F) -> Result<ResolvedConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = self
            .token
            .clone()
            .none_if_empty()
            .or_else(|| env(TOKEN_ENV).none_if_empty())
            .ok_or_else(|| Error::missing_field("token"))?;

        let base_url = match self
            .base_url
            .clone()
            .none_if_empty()
            .or_else(|| env(BASE_URL_ENV).none_if_empty())
        {
            Some(raw) => normalize_base_url(&raw)?,
            None => Url::parse(DEFAULT_BASE_URL)?,
        };

        Ok(ResolvedConfig { token, base_url })
    }
}

// ============================================================================
// Resolved Config
// ============================================================================

/// Fully resolved connection settings, ready to build a client
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Access token
    pub token: String,
    /// API root, always ending with `/`
    pub base_url: Url,
}

impl std::fmt::Debug for ResolvedConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedConfig")
            .field("token", &"<redacted>")
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

/// Turn a user supplied endpoint into an API root.
///
/// Anything other than the public endpoint is an Enterprise install, whose
/// REST API lives under `api/v3/`.
pub fn normalize_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw)
        .map_err(|e| Error::invalid_value("base_url", format!("{raw} is invalid: {e}")))?;

    if url.cannot_be_a_base() {
        return Err(Error::invalid_value(
            "base_url",
            format!("{raw} is not a base URL"),
        ));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    if url.as_str() != DEFAULT_BASE_URL && !url.path().ends_with("api/v3/") {
        let path = format!("{}api/v3/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}
