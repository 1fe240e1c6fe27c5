//! Token verification configuration.

use serde::{Deserialize, Serialize};

/// Where to fetch the identity provider's public key and how often.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Base URL of the identity service.
    #[serde(default = "default_identity_service_url")]
    pub identity_service_url: String,
    /// Path of the PEM public key endpoint on the identity service.
    #[serde(default = "default_public_key_path")]
    pub public_key_path: String,
    /// Interval between background key refreshes.
    #[serde(default = "default_refresh_interval")]
    pub key_refresh_interval_seconds: u64,
    /// Timeout for a single key fetch.
    #[serde(default = "default_fetch_timeout")]
    pub key_fetch_timeout_seconds: u64,
    /// Allowed clock skew when checking `exp`.
    #[serde(default = "default_leeway")]
    pub leeway_seconds: u64,
}

impl AuthConfig {
    /// Full URL of the public key endpoint.
    pub fn public_key_url(&self) -> String {
        format!(
            "{}/{}",
            self.identity_service_url.trim_end_matches('/'),
            self.public_key_path.trim_start_matches('/')
        )
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            identity_service_url: default_identity_service_url(),
            public_key_path: default_public_key_path(),
            key_refresh_interval_seconds: default_refresh_interval(),
            key_fetch_timeout_seconds: default_fetch_timeout(),
            leeway_seconds: default_leeway(),
        }
    }
}

fn default_identity_service_url() -> String {
    "http://localhost:8081".to_string()
}

fn default_public_key_path() -> String {
    "/api/public-key".to_string()
}

fn default_refresh_interval() -> u64 {
    3600
}

fn default_fetch_timeout() -> u64 {
    10
}

fn default_leeway() -> u64 {
    30
}
