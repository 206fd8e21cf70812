//! User Name Value Object
//!
//! Public identifier used as a login handle and display name.
//!
//! ## Invariants
//! - Surrounding whitespace is trimmed before validation
//! - Length: 3 to 50 characters after trimming, counted in chars
//! - No inner whitespace or control characters
//! - No `@`, so a login handle never looks like an email
//! - Case-sensitive; no normalization

use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimum length for user name (in characters)
pub const USER_NAME_MIN_LENGTH: usize = 3;

/// Maximum length for user name (in characters)
pub const USER_NAME_MAX_LENGTH: usize = 50;

/// Error returned when user name validation fails
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserNameError {
    /// User name is empty after trimming
    Empty,

    /// User name is too short (minimum: USER_NAME_MIN_LENGTH)
    TooShort { length: usize, min: usize },

    /// User name is too long (maximum: USER_NAME_MAX_LENGTH)
    TooLong { length: usize, max: usize },

    /// User name contains whitespace in the middle
    ContainsWhitespace,

    /// User name contains a control character or `@`
    InvalidCharacter { char: char, position: usize },
}

impl fmt::Display for UserNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "User name cannot be empty"),
            Self::TooShort { length, min } => {
                write!(f, "User name is too short ({length} chars, minimum {min})")
            }
            Self::TooLong { length, max } => {
                write!(f, "User name is too long ({length} chars, maximum {max})")
            }
            Self::ContainsWhitespace => write!(f, "User name cannot contain spaces"),
            Self::InvalidCharacter { char, position } => {
                write!(f, "Invalid character {char:?} at position {position}")
            }
        }
    }
}

impl std::error::Error for UserNameError {}

/// Validated user name
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserName(String);

impl UserName {
    /// Validate and wrap a user name
    pub fn new(input: impl AsRef<str>) -> Result<Self, UserNameError> {
        let trimmed = input.as_ref().trim();
        Self::validate(trimmed)?;
        Ok(Self(trimmed.to_owned()))
    }

    /// Create from database value (assumed already validated)
    pub fn from_db(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    fn validate(name: &str) -> Result<(), UserNameError> {
        if name.is_empty() {
            return Err(UserNameError::Empty);
        }

        let length = name.chars().count();
        if length < USER_NAME_MIN_LENGTH {
            return Err(UserNameError::TooShort {
                length,
                min: USER_NAME_MIN_LENGTH,
            });
        }
        if length > USER_NAME_MAX_LENGTH {
            return Err(UserNameError::TooLong {
                length,
                max: USER_NAME_MAX_LENGTH,
            });
        }

        for (position, c) in name.chars().enumerate() {
            if c.is_whitespace() {
                return Err(UserNameError::ContainsWhitespace);
            }
            if c.is_control() || c == '@' {
                return Err(UserNameError::InvalidCharacter { char: c, position });
            }
        }

        Ok(())
    }
}

impl fmt::Debug for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("UserName").field(&self.0).finish()
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UserName {
    type Error = UserNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for UserName {
    type Error = UserNameError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserName> for String {
    fn from(name: UserName) -> Self {
        name.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_whitespace() {
        let name = UserName::new("  alice  ").unwrap();
        assert_eq!(name.as_str(), "alice");
    }

    #[test]
    fn test_case_is_preserved() {
        let name = UserName::new("Alice").unwrap();
        assert_eq!(name.as_str(), "Alice");
        assert_ne!(name, UserName::new("alice").unwrap());
    }

    #[test]
    fn test_empty_fails() {
        assert_eq!(UserName::new(""), Err(UserNameError::Empty));
        assert_eq!(UserName::new("   "), Err(UserNameError::Empty));
    }

    #[test]
    fn test_length_bounds() {
        assert_eq!(
            UserName::new("ab"),
            Err(UserNameError::TooShort { length: 2, min: 3 })
        );
        assert!(UserName::new("abc").is_ok());
        assert!(UserName::new("a".repeat(USER_NAME_MAX_LENGTH)).is_ok());
        assert!(matches!(
            UserName::new("a".repeat(USER_NAME_MAX_LENGTH + 1)),
            Err(UserNameError::TooLong { length: 51, max: 50 })
        ));
    }

    #[test]
    fn test_length_counts_characters() {
        // 3 characters, 9 bytes
        assert!(UserName::new("日本語").is_ok());
    }

    #[test]
    fn test_inner_whitespace_fails() {
        assert_eq!(
            UserName::new("alice bob"),
            Err(UserNameError::ContainsWhitespace)
        );
    }

    #[test]
    fn test_invalid_characters() {
        assert!(matches!(
            UserName::new("alice@x"),
            Err(UserNameError::InvalidCharacter { char: '@', position: 5 })
        ));
        assert!(matches!(
            UserName::new("ali\u{0}ce"),
            Err(UserNameError::InvalidCharacter { .. })
        ));
    }

    #[test]
    fn test_serde_validates() {
        let name: UserName = serde_json::from_str("\"alice\"").unwrap();
        assert_eq!(name.as_str(), "alice");
        assert!(serde_json::from_str::<UserName>("\"al\"").is_err());
    }
}
