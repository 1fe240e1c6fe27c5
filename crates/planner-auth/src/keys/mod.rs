//! Verification key cache, key sources, and background refresh.

pub mod cache;
pub mod refresher;
pub mod source;

pub use cache::{KeyCache, VerificationKey};
pub use refresher::KeyRefresher;
pub use source::{HttpKeySource, KeySource, StaticKeySource};
