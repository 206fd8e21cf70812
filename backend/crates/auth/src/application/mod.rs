//! Application Layer
//!
//! Use cases, the token codec and the `AuthService` facade.

pub mod config;
pub(crate) mod hashing;
pub mod login;
pub mod otp;
pub mod password;
pub mod profile;
pub mod register;
pub mod service;
pub mod token;

// Re-exports
pub use config::AuthConfig;
pub use login::{LoginInput, LoginOutput, LoginUseCase};
pub use otp::{GenerateOtpUseCase, VerifyOtpUseCase};
pub use password::{ChangePasswordUseCase, ResetPasswordUseCase};
pub use profile::{GetUserUseCase, UpdateUserInput, UpdateUserUseCase};
pub use register::{RegisterInput, RegisterUseCase};
pub use service::{AuthService, AuthStore};
pub use token::{IssuedToken, TokenClaims, TokenCodec, TokenError};
