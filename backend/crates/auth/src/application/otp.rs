//! OTP Use Cases
//!
//! Issue and verify one-time numeric codes. Delivery (email, SMS) is the
//! caller's job; codes are returned, never sent.

use std::sync::Arc;

use chrono::Duration;
use kernel::clock::Clock;
use platform::otp::generate_numeric_code;

use crate::application::config::AuthConfig;
use crate::domain::entity::otp::OTP_MAX_LENGTH;
use crate::domain::repository::{OtpRepository, UserRepository};
use crate::domain::value_object::user_id::UserId;
use crate::error::{AuthError, AuthResult};

/// Generate OTP use case
pub struct GenerateOtpUseCase<U, O>
where
    U: UserRepository,
    O: OtpRepository,
{
    user_repo: Arc<U>,
    otp_repo: Arc<O>,
    config: Arc<AuthConfig>,
    clock: Arc<dyn Clock>,
}

impl<U, O> GenerateOtpUseCase<U, O>
where
    U: UserRepository,
    O: OtpRepository,
{
    pub fn new(
        user_repo: Arc<U>,
        otp_repo: Arc<O>,
        config: Arc<AuthConfig>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            user_repo,
            otp_repo,
            config,
            clock,
        }
    }

    /// Issue a fresh code, replacing any earlier one for the user
    ///
    /// `length <= 0` and `validity_minutes <= 0` fall back to the
    /// configured defaults.
    pub async fn execute(
        &self,
        user_id: UserId,
        length: i32,
        validity_minutes: i64,
    ) -> AuthResult<String> {
        let length = match usize::try_from(length) {
            Ok(0) | Err(_) => self.config.otp_length(),
            Ok(n) if n > OTP_MAX_LENGTH => {
                return Err(AuthError::Validation(format!(
                    "OTP length must be at most {OTP_MAX_LENGTH} digits"
                )));
            }
            Ok(n) => n,
        };
        let validity = if validity_minutes <= 0 {
            self.config.otp_validity()
        } else {
            Duration::try_minutes(validity_minutes).ok_or_else(|| {
                AuthError::Validation("OTP validity is out of range".to_string())
            })?
        };

        if !self.user_repo.exists(user_id).await? {
            return Err(AuthError::UserNotFound);
        }

        let code = generate_numeric_code(length)?;
        let expires_at = self.clock.now() + validity;
        let otp_id = self
            .otp_repo
            .replace_for_user(user_id, &code, expires_at)
            .await?;

        tracing::info!(
            user_id = %user_id,
            otp_id = %otp_id,
            expires_at = %expires_at,
            "OTP issued"
        );

        Ok(code)
    }
}

/// Verify OTP use case
pub struct VerifyOtpUseCase<O>
where
    O: OtpRepository,
{
    otp_repo: Arc<O>,
}

impl<O> VerifyOtpUseCase<O>
where
    O: OtpRepository,
{
    pub fn new(otp_repo: Arc<O>) -> Self {
        Self { otp_repo }
    }

    /// `Ok(false)` for a wrong, expired or already used code
    pub async fn execute(&self, user_id: UserId, code: &str) -> AuthResult<bool> {
        let Some(otp_id) = self.otp_repo.find_live(user_id, code).await? else {
            tracing::debug!(user_id = %user_id, "No live OTP matched");
            return Ok(false);
        };

        // A concurrent verifier may have flipped the row between the two calls
        let verified = self.otp_repo.mark_verified(otp_id).await?;
        if verified {
            tracing::info!(user_id = %user_id, otp_id = %otp_id, "OTP verified");
        }

        Ok(verified)
    }
}
