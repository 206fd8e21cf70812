//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository traits
//! - `application/` - Use cases, token codec, `AuthService`
//! - `infra/` - PostgreSQL and in-memory stores, schema setup
//! - `presentation/` - HTTP handlers, DTOs, router, bearer filter
//!
//! ## Features
//! - Register and log in by user name or email
//! - Stateless HS256 bearer tokens
//! - One-time numeric codes for out-of-band confirmation
//! - Password change and privileged reset
//! - Superuser gating and custom claim predicates
//!
//! ## Security Model
//! - Passwords hashed with bcrypt; hashes never serialized
//! - Login failures are indistinguishable (no account enumeration)
//! - At most one live OTP per user; a code verifies once
//! - Protected routes check the token signature only; no store lookup
//! - Tokens are not revoked by a password change and stay valid until `exp`

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::AuthConfig;
pub use application::service::{AuthService, AuthStore};
pub use application::token::{TokenClaims, TokenCodec, TokenError};
pub use error::{AuthError, AuthResult};
pub use infra::{InMemoryAuthRepository, PgAuthRepository, initialize_schema};
pub use presentation::middleware::{AuthFilter, CurrentUser};
pub use presentation::router::auth_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}
