//! RSA key material for tests.

pub const SIGNING_PEM: &str = include_str!("../../../fixtures/keys/signing.pem");
pub const VERIFY_PKIX_PEM: &str = include_str!("../../../fixtures/keys/verify_pkix.pem");
pub const VERIFY_PKCS1_PEM: &str = include_str!("../../../fixtures/keys/verify_pkcs1.pem");
pub const ROGUE_SIGNING_PEM: &str = include_str!("../../../fixtures/keys/rogue_signing.pem");
pub const ROGUE_VERIFY_PEM: &str = include_str!("../../../fixtures/keys/rogue_verify_pkix.pem");
