//! Password Use Cases
//!
//! Change (knowing the current password) and reset (privileged).
//! Neither revokes tokens already issued; they stay valid until `exp`.

use std::sync::Arc;

use kernel::clock::Clock;

use crate::application::config::AuthConfig;
use crate::application::hashing::{hash_password, verify_password};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{user_id::UserId, user_password::RawPassword};
use crate::error::{AuthError, AuthResult};

/// Change password use case
pub struct ChangePasswordUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    config: Arc<AuthConfig>,
    clock: Arc<dyn Clock>,
}

impl<U> ChangePasswordUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, config: Arc<AuthConfig>, clock: Arc<dyn Clock>) -> Self {
        Self {
            user_repo,
            config,
            clock,
        }
    }

    pub async fn execute(
        &self,
        user_id: UserId,
        current_password: String,
        new_password: String,
    ) -> AuthResult<()> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let current = RawPassword::new(current_password).map_err(|_| AuthError::InvalidPassword)?;
        if !verify_password(user.password_hash, current).await? {
            return Err(AuthError::InvalidPassword);
        }

        let new_password = RawPassword::new(new_password)?;
        let hash = hash_password(new_password, self.config.password_cost()).await?;
        self.user_repo
            .update_password(user_id, &hash, self.clock.now())
            .await?;

        tracing::info!(user_id = %user_id, "Password changed");
        Ok(())
    }
}

/// Reset password use case
///
/// Sets a new password without checking the old one. This is not tied to
/// OTP verification; callers must authorize the reset first (for example
/// with a successful `VerifyOtpUseCase` for the same user).
pub struct ResetPasswordUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    config: Arc<AuthConfig>,
    clock: Arc<dyn Clock>,
}

impl<U> ResetPasswordUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, config: Arc<AuthConfig>, clock: Arc<dyn Clock>) -> Self {
        Self {
            user_repo,
            config,
            clock,
        }
    }

    pub async fn execute(&self, user_id: UserId, new_password: String) -> AuthResult<()> {
        if !self.user_repo.exists(user_id).await? {
            return Err(AuthError::UserNotFound);
        }

        let new_password = RawPassword::new(new_password)?;
        let hash = hash_password(new_password, self.config.password_cost()).await?;
        self.user_repo
            .update_password(user_id, &hash, self.clock.now())
            .await?;

        tracing::info!(user_id = %user_id, "Password reset");
        Ok(())
    }
}
