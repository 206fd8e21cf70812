//! User Password Value Object
//!
//! Domain wrappers around `platform::password` (bcrypt).
//!
//! ## Usage
//! ```rust
//! use auth::domain::value_object::user_password::{RawPassword, UserPassword};
//! use platform::password::MIN_COST;
//!
//! let raw = RawPassword::new("hunter2".to_string()).unwrap();
//! let hashed = UserPassword::from_raw(&raw, MIN_COST).unwrap();
//! assert!(hashed.verify(&raw));
//! ```

use kernel::error::app_error::{AppError, AppResult};
use platform::password::{ClearTextPassword, HashedPassword, PasswordHashError, PasswordPolicyError};
use std::fmt;

// ============================================================================
// Raw Password (User Input)
// ============================================================================

/// Raw password from user input
///
/// Memory is zeroized when dropped.
pub struct RawPassword(ClearTextPassword);

impl RawPassword {
    /// Validate the bcrypt input rules
    ///
    /// ## Errors
    /// Returns a `BadRequest` `AppError` with a user-facing message
    pub fn new(raw: String) -> AppResult<Self> {
        let clear_text = ClearTextPassword::new(raw).map_err(|e| match e {
            PasswordPolicyError::Empty => AppError::bad_request("Password cannot be empty")
                .with_action("Please enter a password"),

            PasswordPolicyError::TooLong { max, actual } => AppError::bad_request(format!(
                "Password must be at most {} bytes (got {})",
                max, actual
            ))
            .with_action("Please choose a shorter password"),

            PasswordPolicyError::InvalidCharacter => {
                AppError::bad_request("Password contains invalid characters")
                    .with_action("Please remove any NUL characters")
            }
        })?;

        Ok(Self(clear_text))
    }

    pub(crate) fn inner(&self) -> &ClearTextPassword {
        &self.0
    }
}

impl fmt::Debug for RawPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawPassword").field(&"[REDACTED]").finish()
    }
}

// ============================================================================
// User Password (Hashed, for storage)
// ============================================================================

/// Hashed user password for database storage
///
/// Never serialized; it only leaves the process through the store adapter.
#[derive(Clone, PartialEq, Eq)]
pub struct UserPassword(HashedPassword);

impl UserPassword {
    /// Hash a raw password with a fresh salt at the given bcrypt cost
    ///
    /// CPU-bound; async callers should run it on a blocking thread.
    pub fn from_raw(raw: &RawPassword, cost: u32) -> AppResult<Self> {
        let hashed = raw.inner().hash(cost).map_err(|e| match e {
            PasswordHashError::HashingFailed(msg) => {
                AppError::internal(format!("Password hashing failed: {}", msg))
            }
        })?;

        Ok(Self(hashed))
    }

    /// Wrap a hash read from the database
    pub fn from_db(hash: impl Into<String>) -> Self {
        Self(HashedPassword::from_stored(hash))
    }

    /// Hash string for database storage
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Verify a raw password against this hash
    ///
    /// A corrupt stored hash verifies as `false`, same as a wrong password.
    pub fn verify(&self, raw: &RawPassword) -> bool {
        self.0.verify(raw.inner())
    }
}

impl fmt::Debug for UserPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserPassword")
            .field("hash", &"[HASH]")
            .finish()
    }
}

impl fmt::Display for UserPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[HASHED_PASSWORD]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platform::password::{MAX_PASSWORD_BYTES, MIN_COST};

    #[test]
    fn test_raw_password_validation() {
        assert!(RawPassword::new("hunter2".to_string()).is_ok());
        assert!(RawPassword::new("".to_string()).is_err());
        assert!(RawPassword::new("a".repeat(MAX_PASSWORD_BYTES + 1)).is_err());
        assert!(RawPassword::new("nul\0byte".to_string()).is_err());
    }

    #[test]
    fn test_validation_error_is_bad_request() {
        let err = RawPassword::new(String::new()).unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.message(), "Password cannot be empty");
    }

    #[test]
    fn test_hash_and_verify() {
        let raw = RawPassword::new("hunter2".to_string()).unwrap();
        let hashed = UserPassword::from_raw(&raw, MIN_COST).unwrap();

        assert!(hashed.as_str().starts_with("$2"));
        assert!(hashed.verify(&raw));

        let wrong = RawPassword::new("hunter2x".to_string()).unwrap();
        assert!(!hashed.verify(&wrong));
    }

    #[test]
    fn test_db_roundtrip() {
        let raw = RawPassword::new("hunter2".to_string()).unwrap();
        let hashed = UserPassword::from_raw(&raw, MIN_COST).unwrap();

        let restored = UserPassword::from_db(hashed.as_str().to_string());
        assert!(restored.verify(&raw));
    }

    #[test]
    fn test_corrupt_hash_never_verifies() {
        let raw = RawPassword::new("hunter2".to_string()).unwrap();
        assert!(!UserPassword::from_db("not-a-bcrypt-hash").verify(&raw));
    }

    #[test]
    fn test_debug_redaction() {
        let raw = RawPassword::new("SecretPassword123!".to_string()).unwrap();
        let debug = format!("{:?}", raw);
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("Secret"));

        let hashed = UserPassword::from_raw(&raw, MIN_COST).unwrap();
        let debug = format!("{:?}", hashed);
        assert!(debug.contains("HASH"));
        assert!(!debug.contains(hashed.as_str()));
    }
}
