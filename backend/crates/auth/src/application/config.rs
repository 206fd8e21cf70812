//! Application Configuration
//!
//! Configuration for the Auth application layer. Validated once in
//! [`AuthConfig::new`]; read-only afterwards.

use std::fmt;
use std::sync::Arc;

use chrono::Duration;
use platform::password::{DEFAULT_COST, MIN_COST};

use crate::domain::entity::otp::OTP_MAX_LENGTH;
use crate::error::{AuthError, AuthResult};

/// Default token lifetime (24 hours)
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 24 * 60;

/// Default OTP length in digits
pub const DEFAULT_OTP_LENGTH: usize = 6;

/// Default OTP validity in minutes
pub const DEFAULT_OTP_VALIDITY_MINUTES: i64 = 15;

/// Auth application configuration
#[derive(Clone)]
pub struct AuthConfig {
    token_secret: Arc<[u8]>,
    token_ttl: Duration,
    token_leeway: Duration,
    password_cost: u32,
    otp_length: usize,
    otp_validity: Duration,
}

impl AuthConfig {
    /// Create config with a signing secret and token lifetime
    ///
    /// ## Errors
    /// `ConfigInvalid` if the secret is empty or the TTL is not positive
    pub fn new(token_secret: impl AsRef<[u8]>, token_ttl: Duration) -> AuthResult<Self> {
        let token_secret = token_secret.as_ref();
        if token_secret.is_empty() {
            return Err(AuthError::ConfigInvalid(
                "token secret must not be empty".to_string(),
            ));
        }
        if token_ttl <= Duration::zero() {
            return Err(AuthError::ConfigInvalid(
                "token TTL must be positive".to_string(),
            ));
        }

        Ok(Self {
            token_secret: Arc::from(token_secret),
            token_ttl,
            token_leeway: Duration::zero(),
            password_cost: DEFAULT_COST,
            otp_length: DEFAULT_OTP_LENGTH,
            otp_validity: Duration::minutes(DEFAULT_OTP_VALIDITY_MINUTES),
        })
    }

    /// Clock skew tolerated before `iat`
    pub fn with_token_leeway(mut self, leeway: Duration) -> AuthResult<Self> {
        if leeway < Duration::zero() {
            return Err(AuthError::ConfigInvalid(
                "token leeway must not be negative".to_string(),
            ));
        }
        self.token_leeway = leeway;
        Ok(self)
    }

    /// bcrypt work factor
    pub fn with_password_cost(mut self, cost: u32) -> AuthResult<Self> {
        if !(MIN_COST..=31).contains(&cost) {
            return Err(AuthError::ConfigInvalid(format!(
                "password cost must be between {MIN_COST} and 31 (got {cost})"
            )));
        }
        self.password_cost = cost;
        Ok(self)
    }

    /// Defaults used by `generate_default_otp` and for clamped arguments
    pub fn with_otp_defaults(mut self, length: usize, validity: Duration) -> AuthResult<Self> {
        if length == 0 || length > OTP_MAX_LENGTH {
            return Err(AuthError::ConfigInvalid(format!(
                "OTP length must be between 1 and {OTP_MAX_LENGTH} (got {length})"
            )));
        }
        if validity <= Duration::zero() {
            return Err(AuthError::ConfigInvalid(
                "OTP validity must be positive".to_string(),
            ));
        }
        self.otp_length = length;
        self.otp_validity = validity;
        Ok(self)
    }

    pub fn token_secret(&self) -> &[u8] {
        &self.token_secret
    }

    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }

    pub fn token_leeway(&self) -> Duration {
        self.token_leeway
    }

    pub fn password_cost(&self) -> u32 {
        self.password_cost
    }

    pub fn otp_length(&self) -> usize {
        self.otp_length
    }

    pub fn otp_validity(&self) -> Duration {
        self.otp_validity
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token_secret", &"[REDACTED]")
            .field("token_ttl", &self.token_ttl)
            .field("token_leeway", &self.token_leeway)
            .field("password_cost", &self.password_cost)
            .field("otp_length", &self.otp_length)
            .field("otp_validity", &self.otp_validity)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AuthConfig::new("secret", Duration::minutes(DEFAULT_TOKEN_TTL_MINUTES)).unwrap();
        assert_eq!(config.token_ttl(), Duration::hours(24));
        assert_eq!(config.token_leeway(), Duration::zero());
        assert_eq!(config.password_cost(), DEFAULT_COST);
        assert_eq!(config.otp_length(), 6);
        assert_eq!(config.otp_validity(), Duration::minutes(15));
    }

    #[test]
    fn test_rejects_empty_secret() {
        let err = AuthConfig::new("", Duration::hours(1)).unwrap_err();
        assert!(matches!(err, AuthError::ConfigInvalid(_)));
    }

    #[test]
    fn test_rejects_non_positive_ttl() {
        assert!(AuthConfig::new("secret", Duration::zero()).is_err());
        assert!(AuthConfig::new("secret", Duration::seconds(-5)).is_err());
    }

    #[test]
    fn test_builder_validation() {
        let config = AuthConfig::new("secret", Duration::hours(1)).unwrap();
        assert!(config.clone().with_password_cost(MIN_COST - 1).is_err());
        assert!(config.clone().with_password_cost(32).is_err());
        assert!(config.clone().with_otp_defaults(17, Duration::minutes(1)).is_err());
        assert!(config.clone().with_otp_defaults(6, Duration::zero()).is_err());
        assert!(config.clone().with_token_leeway(Duration::seconds(-1)).is_err());

        let config = config
            .with_password_cost(MIN_COST)
            .unwrap()
            .with_otp_defaults(8, Duration::minutes(5))
            .unwrap();
        assert_eq!(config.password_cost(), MIN_COST);
        assert_eq!(config.otp_length(), 8);
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = AuthConfig::new("super-secret-value", Duration::hours(1)).unwrap();
        let debug = format!("{:?}", config);
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("super-secret-value"));
    }
}
