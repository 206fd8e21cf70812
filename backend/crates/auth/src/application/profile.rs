//! Profile Use Cases
//!
//! Read and update user records by id.

use std::sync::Arc;

use crate::domain::entity::user::{User, UserChanges};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{email::Email, user_id::UserId, user_name::UserName};
use crate::error::{AuthError, AuthResult};

/// Update user input; `None` leaves a field unchanged
#[derive(Debug, Clone, Default)]
pub struct UpdateUserInput {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_active: Option<bool>,
    pub is_superuser: Option<bool>,
}

impl UpdateUserInput {
    fn validate(self) -> AuthResult<UserChanges> {
        let user_name = self
            .username
            .map(UserName::new)
            .transpose()
            .map_err(|e| AuthError::Validation(e.to_string()))?;
        let email = self.email.map(Email::new).transpose()?;

        Ok(UserChanges {
            user_name,
            email,
            first_name: self.first_name,
            last_name: self.last_name,
            is_active: self.is_active,
            is_superuser: self.is_superuser,
        })
    }
}

/// Get user use case
pub struct GetUserUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
}

impl<U> GetUserUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>) -> Self {
        Self { user_repo }
    }

    pub async fn execute(&self, user_id: UserId) -> AuthResult<User> {
        self.user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }
}

/// Update user use case
pub struct UpdateUserUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
}

impl<U> UpdateUserUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>) -> Self {
        Self { user_repo }
    }

    /// Apply changes and persist; a taken user name or email is `Conflict`
    pub async fn execute(&self, user_id: UserId, input: UpdateUserInput) -> AuthResult<User> {
        let changes = input.validate()?;

        let mut user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        user.apply(changes);
        self.user_repo.update_profile(&user).await?;

        tracing::info!(
            user_id = %user_id,
            is_active = user.is_active,
            is_superuser = user.is_superuser,
            "User updated"
        );

        Ok(user)
    }
}
