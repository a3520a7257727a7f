//! Remote schema retrieval.

use std::time::Duration;

use reqwest::blocking::Client;
use url::Url;

use crate::error::SchemaError;

/// Source of schema documents on a local cache miss.
///
/// Implementations return the raw response body; the caller persists it
/// verbatim before parsing.
pub trait SchemaFetcher: Send + Sync {
    /// Fetch the document at `url`.
    fn fetch(&self, url: &Url) -> Result<Vec<u8>, SchemaError>;
}

/// Fetches schemas over HTTP(S) with a blocking `reqwest` client.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    timeout: Option<Duration>,
}

impl HttpFetcher {
    /// A fetcher using the client's default timeout.
    pub fn new() -> Self {
        Self::default()
    }

    /// A fetcher with an explicit request timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }

    fn client(&self, url: &Url) -> Result<Client, SchemaError> {
        let mut builder = Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        builder.build().map_err(|e| SchemaError::Transport {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}

impl SchemaFetcher for HttpFetcher {
    fn fetch(&self, url: &Url) -> Result<Vec<u8>, SchemaError> {
        let transport = |e: reqwest::Error| SchemaError::Transport {
            url: url.to_string(),
            reason: e.to_string(),
        };

        tracing::info!(%url, "fetching schema");
        let response = self.client(url)?.get(url.as_str()).send().map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SchemaError::Fetch {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().map_err(transport)?;
        tracing::debug!(%url, bytes = body.len(), "schema fetched");
        Ok(body.to_vec())
    }
}
