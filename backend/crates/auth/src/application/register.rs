//! Register Use Case
//!
//! Creates a new user account.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::hashing::hash_password;
use crate::domain::entity::user::NewUser;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    email::Email, user_id::UserId, user_name::UserName, user_password::RawPassword,
};
use crate::error::{AuthError, AuthResult};

/// Register input
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    pub is_superuser: bool,
}

impl RegisterInput {
    /// Active, non-superuser registration
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password: password.into(),
            first_name: String::new(),
            last_name: String::new(),
            is_active: true,
            is_superuser: false,
        }
    }
}

/// Register use case
pub struct RegisterUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    config: Arc<AuthConfig>,
}

impl<U> RegisterUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, config: Arc<AuthConfig>) -> Self {
        Self { user_repo, config }
    }

    /// Validate, hash and insert
    ///
    /// There is no existence pre-check: the store's unique constraints
    /// decide, so concurrent duplicates yield exactly one success and
    /// `Conflict` for the rest.
    pub async fn execute(&self, input: RegisterInput) -> AuthResult<UserId> {
        let user_name =
            UserName::new(&input.username).map_err(|e| AuthError::Validation(e.to_string()))?;
        let email = Email::new(input.email)?;
        let raw_password = RawPassword::new(input.password)?;

        let new_user = NewUser {
            user_name,
            email,
            first_name: input.first_name,
            last_name: input.last_name,
            is_active: input.is_active,
            is_superuser: input.is_superuser,
        };

        let password_hash = hash_password(raw_password, self.config.password_cost()).await?;
        let user_id = self.user_repo.insert(&new_user, &password_hash).await?;

        tracing::info!(
            user_id = %user_id,
            user_name = %new_user.user_name,
            "User registered"
        );

        Ok(user_id)
    }
}
