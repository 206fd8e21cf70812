//! Repository Traits
//!
//! Interfaces for data persistence. Implementations are in the infra layer.

use chrono::{DateTime, Utc};

use crate::domain::entity::{
    otp::OtpId,
    user::{NewUser, User},
};
use crate::domain::value_object::{user_id::UserId, user_password::UserPassword};
use crate::error::AuthResult;

/// User repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Insert a user and return the store-assigned id
    ///
    /// Fails with `AuthError::Conflict` if the user name or email is taken.
    async fn insert(&self, user: &NewUser, password: &UserPassword) -> AuthResult<UserId>;

    /// Find an active user whose user name or email equals `handle`
    async fn find_by_login(&self, handle: &str) -> AuthResult<Option<User>>;

    /// Find user by ID, active or not
    async fn find_by_id(&self, user_id: UserId) -> AuthResult<Option<User>>;

    /// Check if a user with this ID exists
    async fn exists(&self, user_id: UserId) -> AuthResult<bool>;

    async fn update_last_login(&self, user_id: UserId, at: DateTime<Utc>) -> AuthResult<()>;

    /// Write hash and `password_changed` together
    async fn update_password(
        &self,
        user_id: UserId,
        password: &UserPassword,
        at: DateTime<Utc>,
    ) -> AuthResult<()>;

    /// Persist profile fields and flags (not the password)
    async fn update_profile(&self, user: &User) -> AuthResult<()>;
}

/// OTP repository trait
#[trait_variant::make(OtpRepository: Send)]
pub trait LocalOtpRepository {
    /// Delete every OTP of the user, then insert the new one
    ///
    /// Must be atomic per user so at most one live OTP exists.
    async fn replace_for_user(
        &self,
        user_id: UserId,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> AuthResult<OtpId>;

    /// Find an unverified, unexpired OTP with this code
    async fn find_live(&self, user_id: UserId, code: &str) -> AuthResult<Option<OtpId>>;

    /// Flip `verified` to true
    ///
    /// Returns `false` if the row was already verified, so a code is only
    /// accepted once under concurrent replays.
    async fn mark_verified(&self, otp_id: OtpId) -> AuthResult<bool>;
}
