//! The single current verification key, hot-swappable under load.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use jsonwebtoken::DecodingKey;

use planner_core::error::AppError;
use planner_core::result::AppResult;

const PKIX_LABEL: &str = "-----BEGIN PUBLIC KEY-----";
const PKCS1_LABEL: &str = "-----BEGIN RSA PUBLIC KEY-----";

/// A parsed RSA public key ready for signature checks.
#[derive(Clone)]
pub struct VerificationKey {
    decoding_key: DecodingKey,
    pem: String,
    loaded_at: DateTime<Utc>,
}

impl VerificationKey {
    /// Parse a PEM-encoded RSA public key in PKIX (`PUBLIC KEY`) or PKCS#1
    /// (`RSA PUBLIC KEY`) framing.
    pub fn from_pem(pem: &str) -> AppResult<Self> {
        let pem = pem.trim();
        if !pem.contains(PKIX_LABEL) && !pem.contains(PKCS1_LABEL) {
            return Err(AppError::validation(
                "Unexpected PEM block: expected an RSA public key",
            ));
        }
        let decoding_key = DecodingKey::from_rsa_pem(pem.as_bytes()).map_err(|e| {
            AppError::validation(format!("Failed to parse RSA public key: {e}"))
        })?;
        Ok(Self {
            decoding_key,
            pem: pem.to_string(),
            loaded_at: Utc::now(),
        })
    }

    /// The key used for signature verification.
    pub fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }

    /// When this key was fetched and parsed.
    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// Whether `other` carries the same key material.
    pub fn same_material(&self, other: &VerificationKey) -> bool {
        self.pem == other.pem
    }
}

impl fmt::Debug for VerificationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerificationKey")
            .field("loaded_at", &self.loaded_at)
            .finish_non_exhaustive()
    }
}

/// Holder of the current verification key.
///
/// Readers clone an `Arc` out under a short read lock and verify outside
/// it, so a swap never waits on in-flight verifications and a verification
/// never observes a half-written key.
#[derive(Debug)]
pub struct KeyCache {
    current: RwLock<Arc<VerificationKey>>,
}

impl KeyCache {
    /// Create a cache seeded with an initial key.
    pub fn new(initial: VerificationKey) -> Self {
        Self {
            current: RwLock::new(Arc::new(initial)),
        }
    }

    /// The key in force right now.
    pub fn current(&self) -> Arc<VerificationKey> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Swap in a new key. Returns `true` when the key material changed.
    pub fn replace(&self, key: VerificationKey) -> bool {
        let mut guard = self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let changed = !guard.same_material(&key);
        *guard = Arc::new(key);
        changed
    }
}
