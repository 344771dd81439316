use bcrypt::{hash, verify};

use crate::error::ApiError;

/// Fixed bcrypt work factor for stored passwords
pub const HASH_COST: u32 = 10;

/// Salted bcrypt hash in modular crypt format (`$2b$10$...`)
pub fn hash_password(plain: &str) -> Result<String, ApiError> {
    hash(plain, HASH_COST).map_err(|e| {
        tracing::error!("Password hashing failed: {}", e);
        ApiError::internal("Password hashing failed")
    })
}

/// Check a plain password against a stored hash. Malformed hashes never verify.
pub fn verify_password(plain: &str, stored: &str) -> bool {
    verify(plain, stored).unwrap_or(false)
}
