//! Lazily initialized API connection
//!
//! The client is built on first use and then shared by every query running
//! against the connection. A failed initialization is reported to the caller
//! and retried by the next one.

use crate::config::ConnectionConfig;
use crate::error::Result;
use crate::github::GitHubClient;
use crate::http::HttpClientConfig;
use once_cell::sync::OnceCell;
use tracing::debug;

/// A configured connection owning at most one [`GitHubClient`]
#[derive(Debug)]
pub struct Connection {
    config: ConnectionConfig,
    http: HttpClientConfig,
    client: OnceCell<GitHubClient>,
}

impl Connection {
    /// Create a connection with default HTTP settings
    pub fn new(config: ConnectionConfig) -> Self {
        Self::with_http_config(config, HttpClientConfig::default())
    }

    /// Create a connection with custom HTTP settings
    pub fn with_http_config(config: ConnectionConfig, http: HttpClientConfig) -> Self {
        Self {
            config,
            http,
            client: OnceCell::new(),
        }
    }

    /// Connection configuration as given
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Whether the client has been built yet
    pub fn is_initialized(&self) -> bool {
        self.client.get().is_some()
    }

    /// Get the shared client, building it on first call
    pub fn client(&self) -> Result<&GitHubClient> {
        self.client.get_or_try_init(|| {
            let resolved = self.config.resolve()?;
            debug!("Connecting to {}", resolved.base_url);
            GitHubClient::new(&resolved, self.http.clone())
        })
    }
}
