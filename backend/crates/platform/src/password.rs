//! Password Hashing and Verification
//!
//! bcrypt with a per-call random salt embedded in the output
//! (`$2b$<cost>$<salt><hash>`), plus zeroization of clear text.
//!
//! Strength policy is left to callers; the only rules enforced here are
//! the ones bcrypt itself needs (non-empty, at most 72 bytes, no NUL).

use std::fmt;

use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// bcrypt only consumes the first 72 bytes of input
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Cost used when the caller does not choose one
pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

/// Cheapest cost bcrypt accepts; for tests
pub const MIN_COST: u32 = 4;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordPolicyError {
    #[error("Password cannot be empty")]
    Empty,

    /// Longer input would be silently truncated by bcrypt
    #[error("Password must be at most {max} bytes (got {actual})")]
    TooLong { max: usize, actual: usize },

    #[error("Password contains a NUL character")]
    InvalidCharacter,
}

#[derive(Debug, Error)]
pub enum PasswordHashError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),
}

// ============================================================================
// Clear Text Password (Zeroized on drop)
// ============================================================================

/// Clear text password with automatic memory zeroization
///
/// Does not implement `Clone`, and `Debug` output is redacted.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ClearTextPassword(String);

impl ClearTextPassword {
    pub fn new(raw: String) -> Result<Self, PasswordPolicyError> {
        let password = Self(raw);

        if password.0.is_empty() {
            return Err(PasswordPolicyError::Empty);
        }
        if password.0.len() > MAX_PASSWORD_BYTES {
            return Err(PasswordPolicyError::TooLong {
                max: MAX_PASSWORD_BYTES,
                actual: password.0.len(),
            });
        }
        if password.0.contains('\0') {
            return Err(PasswordPolicyError::InvalidCharacter);
        }

        Ok(password)
    }

    /// Hash with a fresh random salt at the given work factor
    pub fn hash(&self, cost: u32) -> Result<HashedPassword, PasswordHashError> {
        let hash = bcrypt::hash(self.0.as_bytes(), cost)
            .map_err(|e| PasswordHashError::HashingFailed(e.to_string()))?;
        Ok(HashedPassword { hash })
    }
}

impl fmt::Debug for ClearTextPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClearTextPassword")
            .field(&"[REDACTED]")
            .finish()
    }
}

// ============================================================================
// Hashed Password (Safe to store)
// ============================================================================

/// bcrypt hash string as stored in the database
#[derive(Clone, PartialEq, Eq)]
pub struct HashedPassword {
    hash: String,
}

impl HashedPassword {
    /// Wrap a stored hash without parsing it
    ///
    /// A malformed value simply never verifies.
    pub fn from_stored(hash: impl Into<String>) -> Self {
        Self { hash: hash.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.hash
    }

    /// Check a password against this hash
    ///
    /// A malformed hash and a wrong password both yield `false`. The digest
    /// comparison inside bcrypt is constant-time.
    pub fn verify(&self, password: &ClearTextPassword) -> bool {
        bcrypt::verify(password.0.as_bytes(), &self.hash).unwrap_or(false)
    }
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashedPassword")
            .field("hash", &"[HASH]")
            .finish()
    }
}
