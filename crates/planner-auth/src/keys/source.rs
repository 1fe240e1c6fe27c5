//! Where verification keys come from.

use std::fmt::Debug;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use planner_core::config::AuthConfig;
use planner_core::error::{AppError, ErrorKind};
use planner_core::result::AppResult;

/// Supplier of PEM-encoded public key material.
#[async_trait]
pub trait KeySource: Send + Sync + Debug {
    /// Fetch the current PEM text.
    async fn fetch_pem(&self) -> AppResult<String>;

    /// Human-readable origin for logs.
    fn describe(&self) -> String;
}

/// Fetches the key from the identity service's public key endpoint.
#[derive(Debug, Clone)]
pub struct HttpKeySource {
    client: reqwest::Client,
    url: String,
}

impl HttpKeySource {
    /// Build a source from auth configuration.
    pub fn new(config: &AuthConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.key_fetch_timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    "Failed to build identity service client",
                    e,
                )
            })?;
        Ok(Self {
            client,
            url: config.public_key_url(),
        })
    }
}

#[async_trait]
impl KeySource for HttpKeySource {
    async fn fetch_pem(&self) -> AppResult<String> {
        let response = self.client.get(&self.url).send().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::ExternalService,
                format!("GET {} failed", self.url),
                e,
            )
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::external_service(format!(
                "GET {} returned status {}",
                self.url,
                status.as_u16()
            )));
        }

        response.text().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::ExternalService,
                "Failed to read public key response",
                e,
            )
        })
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// A fixed, swappable key. Used for tests and for deployments that mount
/// the key from disk.
#[derive(Debug)]
pub struct StaticKeySource {
    pem: Mutex<String>,
}

impl StaticKeySource {
    /// Create a source that always returns `pem`.
    pub fn new(pem: impl Into<String>) -> Self {
        Self {
            pem: Mutex::new(pem.into()),
        }
    }

    /// Change the key returned by subsequent fetches.
    pub fn set(&self, pem: impl Into<String>) {
        *self.pem.lock().unwrap_or_else(PoisonError::into_inner) = pem.into();
    }
}

#[async_trait]
impl KeySource for StaticKeySource {
    async fn fetch_pem(&self) -> AppResult<String> {
        Ok(self
            .pem
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn describe(&self) -> String {
        "static".to_string()
    }
}
