//! Login Use Case
//!
//! Authenticates a user by user name or email and mints a bearer token.

use std::sync::Arc;

use kernel::clock::Clock;

use crate::application::hashing::{DecoyHash, verify_password};
use crate::application::token::{IssuedToken, TokenCodec};
use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::user_password::RawPassword;
use crate::error::{AuthError, AuthResult};

/// Login input
pub struct LoginInput {
    /// User name or email
    pub handle: String,
    pub password: String,
}

/// Login output
pub struct LoginOutput {
    pub user: User,
    pub token: IssuedToken,
}

/// Login use case
pub struct LoginUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    codec: TokenCodec,
    clock: Arc<dyn Clock>,
    decoy: Arc<DecoyHash>,
}

impl<U> LoginUseCase<U>
where
    U: UserRepository,
{
    pub(crate) fn new(
        user_repo: Arc<U>,
        codec: TokenCodec,
        clock: Arc<dyn Clock>,
        decoy: Arc<DecoyHash>,
    ) -> Self {
        Self {
            user_repo,
            codec,
            clock,
            decoy,
        }
    }

    /// Check credentials and stamp `last_login`
    ///
    /// Unknown handle, inactive account and wrong password are all
    /// `InvalidCredentials`, and each pays one bcrypt verification.
    pub async fn authenticate(&self, handle: &str, password: String) -> AuthResult<User> {
        let raw_password =
            RawPassword::new(password).map_err(|_| AuthError::InvalidCredentials)?;

        let found = self.user_repo.find_by_login(handle).await?;
        let Some(mut user) = found.filter(User::can_login) else {
            self.decoy.verify(raw_password).await?;
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(user.password_hash.clone(), raw_password).await? {
            return Err(AuthError::InvalidCredentials);
        }

        let now = self.clock.now();
        self.user_repo.update_last_login(user.user_id, now).await?;
        user.last_login = Some(now);

        Ok(user)
    }

    pub async fn execute(&self, input: LoginInput) -> AuthResult<LoginOutput> {
        let user = self.authenticate(&input.handle, input.password).await?;

        let token = self
            .codec
            .mint(user.user_id, user.user_name.as_str(), user.is_superuser)
            .map_err(|e| AuthError::Internal(format!("token encoding failed: {e}")))?;

        tracing::info!(user_id = %user.user_id, "User logged in");

        Ok(LoginOutput { user, token })
    }
}
