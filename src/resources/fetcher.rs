/// Network access for the cache engine
///
/// The engine only knows the [`ResourceFetcher`] trait; [`HttpFetcher`] is the
/// production implementation over reqwest.
use crate::arguments::is_debug_fetch_enabled;
use crate::config::ServerConfig;
use crate::errors::{ConfigError, FetchError};
use crate::logger::{self, LogTag};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use url::Url;

#[async_trait]
pub trait ResourceFetcher: Send + Sync + 'static {
    /// Retrieve the current value for a resource key
    async fn fetch(&self, key: &str) -> Result<Value, FetchError>;

    /// Send a write to a resource key, returning the created record
    async fn submit(&self, key: &str, _body: &Value) -> Result<Value, FetchError> {
        Err(FetchError::Unsupported {
            key: key.to_string(),
            operation: "submit".to_string(),
        })
    }
}

/// HTTP fetcher resolving resource keys against a base URL
pub struct HttpFetcher {
    client: Client,
    base_url: Url,
}

impl HttpFetcher {
    pub fn new(config: &ServerConfig) -> Result<Self, ConfigError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| ConfigError::Invalid {
            field: "server.base_url".to_string(),
            message: e.to_string(),
        })?;

        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if config.request_timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(config.request_timeout_secs));
        }
        let client = builder.build().map_err(|e| ConfigError::Invalid {
            field: "server".to_string(),
            message: format!("Failed to create HTTP client: {}", e),
        })?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Absolute URL for a resource key (path plus optional query)
    pub fn url_for(&self, key: &str) -> Result<Url, FetchError> {
        self.base_url.join(key).map_err(|e| FetchError::Network {
            key: key.to_string(),
            message: format!("Invalid resource URL: {}", e),
        })
    }

    async fn read_json(key: &str, response: reqwest::Response) -> Result<Value, FetchError> {
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                key: key.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| FetchError::Network {
            key: key.to_string(),
            message: e.to_string(),
        })?;

        if is_debug_fetch_enabled() {
            logger::debug(
                LogTag::Fetch,
                &format!("{} -> {} ({} bytes)", key, status, body.len()),
            );
        }

        serde_json::from_slice(&body).map_err(|e| FetchError::Decode {
            key: key.to_string(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl ResourceFetcher for HttpFetcher {
    async fn fetch(&self, key: &str) -> Result<Value, FetchError> {
        let url = self.url_for(key)?;
        logger::debug(LogTag::Fetch, &format!("GET {}", url));

        let response = self.client.get(url).send().await.map_err(|e| FetchError::Network {
            key: key.to_string(),
            message: e.to_string(),
        })?;

        Self::read_json(key, response).await
    }

    async fn submit(&self, key: &str, body: &Value) -> Result<Value, FetchError> {
        let url = self.url_for(key)?;
        logger::debug(LogTag::Fetch, &format!("POST {}", url));

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| FetchError::Network {
                key: key.to_string(),
                message: e.to_string(),
            })?;

        Self::read_json(key, response).await
    }
}
