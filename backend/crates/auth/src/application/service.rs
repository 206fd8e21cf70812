//! Auth Service
//!
//! Facade over the use cases, holding the shared store, configuration,
//! clock and token codec. Built once at startup and cloned cheaply into
//! handlers; nothing in it is mutated afterwards.

use std::sync::Arc;

use kernel::clock::Clock;

use crate::application::config::AuthConfig;
use crate::application::hashing::DecoyHash;
use crate::application::login::{LoginInput, LoginOutput, LoginUseCase};
use crate::application::otp::{GenerateOtpUseCase, VerifyOtpUseCase};
use crate::application::password::{ChangePasswordUseCase, ResetPasswordUseCase};
use crate::application::profile::{GetUserUseCase, UpdateUserInput, UpdateUserUseCase};
use crate::application::register::{RegisterInput, RegisterUseCase};
use crate::application::token::TokenCodec;
use crate::domain::entity::user::User;
use crate::domain::repository::{OtpRepository, UserRepository};
use crate::domain::value_object::user_id::UserId;
use crate::error::AuthResult;

/// Store backing the service: users and OTPs behind one handle
pub trait AuthStore: UserRepository + OtpRepository + Send + Sync + 'static {}

impl<T> AuthStore for T where T: UserRepository + OtpRepository + Send + Sync + 'static {}

pub struct AuthService<R>
where
    R: AuthStore,
{
    repo: Arc<R>,
    config: Arc<AuthConfig>,
    clock: Arc<dyn Clock>,
    codec: TokenCodec,
    decoy: Arc<DecoyHash>,
}

impl<R> Clone for AuthService<R>
where
    R: AuthStore,
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            config: self.config.clone(),
            clock: self.clock.clone(),
            codec: self.codec.clone(),
            decoy: self.decoy.clone(),
        }
    }
}

impl<R> AuthService<R>
where
    R: AuthStore,
{
    /// `config` is already validated by `AuthConfig::new`
    pub fn new(repo: R, config: AuthConfig, clock: Arc<dyn Clock>) -> Self {
        let codec = TokenCodec::new(&config, clock.clone());
        let decoy = Arc::new(DecoyHash::new(config.password_cost()));
        Self {
            repo: Arc::new(repo),
            config: Arc::new(config),
            clock,
            codec,
            decoy,
        }
    }

    /// Codec sharing this service's secret and clock, for request filters
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    pub async fn register(&self, input: RegisterInput) -> AuthResult<UserId> {
        RegisterUseCase::new(self.repo.clone(), self.config.clone())
            .execute(input)
            .await
    }

    /// Check credentials without minting a token
    pub async fn authenticate(&self, handle: &str, password: String) -> AuthResult<User> {
        self.login_use_case().authenticate(handle, password).await
    }

    pub async fn login(&self, handle: String, password: String) -> AuthResult<LoginOutput> {
        self.login_use_case()
            .execute(LoginInput { handle, password })
            .await
    }

    /// Issue an OTP; non-positive arguments use the configured defaults
    pub async fn generate_otp(
        &self,
        user_id: UserId,
        length: i32,
        validity_minutes: i64,
    ) -> AuthResult<String> {
        GenerateOtpUseCase::new(
            self.repo.clone(),
            self.repo.clone(),
            self.config.clone(),
            self.clock.clone(),
        )
        .execute(user_id, length, validity_minutes)
        .await
    }

    pub async fn generate_default_otp(&self, user_id: UserId) -> AuthResult<String> {
        self.generate_otp(user_id, 0, 0).await
    }

    pub async fn verify_otp(&self, user_id: UserId, code: &str) -> AuthResult<bool> {
        VerifyOtpUseCase::new(self.repo.clone())
            .execute(user_id, code)
            .await
    }

    pub async fn change_password(
        &self,
        user_id: UserId,
        current_password: String,
        new_password: String,
    ) -> AuthResult<()> {
        ChangePasswordUseCase::new(self.repo.clone(), self.config.clone(), self.clock.clone())
            .execute(user_id, current_password, new_password)
            .await
    }

    /// Set a password without the current one
    ///
    /// Not coupled to OTP verification. Only call this after the caller
    /// has independently proven control of the account, typically
    /// `verify_otp(user_id, code) == Ok(true)`.
    pub async fn reset_password(&self, user_id: UserId, new_password: String) -> AuthResult<()> {
        ResetPasswordUseCase::new(self.repo.clone(), self.config.clone(), self.clock.clone())
            .execute(user_id, new_password)
            .await
    }

    pub async fn get_user(&self, user_id: UserId) -> AuthResult<User> {
        GetUserUseCase::new(self.repo.clone()).execute(user_id).await
    }

    pub async fn update_user(&self, user_id: UserId, input: UpdateUserInput) -> AuthResult<User> {
        UpdateUserUseCase::new(self.repo.clone())
            .execute(user_id, input)
            .await
    }

    fn login_use_case(&self) -> LoginUseCase<R> {
        LoginUseCase::new(
            self.repo.clone(),
            self.codec.clone(),
            self.clock.clone(),
            self.decoy.clone(),
        )
    }
}
