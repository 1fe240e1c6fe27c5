//! Token verification against the cached key.

use std::sync::Arc;

use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, Validation, decode};
use tracing::debug;

use planner_core::error::AppError;
use planner_core::result::AppResult;
use planner_entity::Principal;

use super::claims::Claims;
use crate::keys::KeyCache;

/// Only RSA PKCS#1 v1.5 signatures are accepted. A symmetric algorithm
/// would let anyone holding the public key mint tokens.
const ACCEPTED_ALGORITHMS: [Algorithm; 3] = [Algorithm::RS256, Algorithm::RS384, Algorithm::RS512];

/// Verifies bearer tokens and extracts the caller's [`Principal`].
#[derive(Debug, Clone)]
pub struct TokenVerifier {
    keys: Arc<KeyCache>,
    validation: Validation,
}

impl TokenVerifier {
    /// Create a verifier reading keys from `keys`, allowing `leeway_seconds`
    /// of clock skew on expiry.
    pub fn new(keys: Arc<KeyCache>, leeway_seconds: u64) -> Self {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.algorithms = ACCEPTED_ALGORITHMS.to_vec();
        validation.validate_exp = true;
        validation.validate_aud = false;
        validation.leeway = leeway_seconds;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self { keys, validation }
    }

    /// The key cache this verifier reads from.
    pub fn keys(&self) -> &Arc<KeyCache> {
        &self.keys
    }

    /// Verify `token` and return the identity it asserts.
    pub fn verify(&self, token: &str) -> AppResult<Principal> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AppError::authentication("Missing bearer token"));
        }

        // Hold the Arc, not the lock, for the duration of the check.
        let key = self.keys.current();
        let data = decode::<Claims>(token, key.decoding_key(), &self.validation).map_err(|e| {
            debug!(error = %e, "Token rejected");
            match e.kind() {
                JwtErrorKind::ExpiredSignature => AppError::authentication("Token has expired"),
                JwtErrorKind::InvalidAlgorithm | JwtErrorKind::InvalidAlgorithmName => {
                    AppError::authentication("Unexpected signing algorithm")
                }
                JwtErrorKind::InvalidSignature => {
                    AppError::authentication("Invalid token signature")
                }
                JwtErrorKind::InvalidToken | JwtErrorKind::Base64(_) => {
                    AppError::authentication("Invalid token format")
                }
                JwtErrorKind::Json(_) | JwtErrorKind::MissingRequiredClaim(_) => {
                    AppError::authentication("Invalid token claims")
                }
                _ => AppError::authentication("Invalid token"),
            }
        })?;

        Ok(data.claims.into_principal())
    }
}
