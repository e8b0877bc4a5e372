//! Guard password digests.
//!
//! Passwords are stored as an unsalted SHA-256 hex digest so existing store
//! files stay readable. Verification compares digests in constant time.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Hex-encoded SHA-256 digest of a guard password.
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// Check a password against a stored hex digest.
///
/// A stored digest that is not valid hex never matches.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(expected) = hex::decode(stored_hash.trim()) else {
        return false;
    };

    let actual = Sha256::digest(password.as_bytes());
    bool::from(actual.as_slice().ct_eq(expected.as_slice()))
}
