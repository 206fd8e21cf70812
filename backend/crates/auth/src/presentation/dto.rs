//! API DTOs (Data Transfer Objects)
//!
//! Wire names are snake_case.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::{RegisterInput, TokenClaims};
use crate::domain::entity::user::User;
use crate::domain::value_object::user_id::UserId;

// ============================================================================
// Register
// ============================================================================

/// Not `Debug`: carries a clear-text password
#[derive(Clone, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl From<RegisterRequest> for RegisterInput {
    fn from(req: RegisterRequest) -> Self {
        let mut input = RegisterInput::new(req.username, req.email, req.password);
        input.first_name = req.first_name;
        input.last_name = req.last_name;
        input
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterResponse {
    pub user_id: UserId,
    pub username: String,
    pub message: &'static str,
}

// ============================================================================
// Login
// ============================================================================

#[derive(Clone, Deserialize)]
pub struct LoginRequest {
    /// User name or email
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user_id: UserId,
}

// ============================================================================
// Profile
// ============================================================================

/// User projection without the password hash
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub user_id: UserId,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    pub is_superuser: bool,
    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            user_id: user.user_id,
            username: user.user_name.into_inner(),
            email: user.email.into_db(),
            first_name: user.first_name,
            last_name: user.last_name,
            is_active: user.is_active,
            is_superuser: user.is_superuser,
            date_joined: user.date_joined,
            last_login: user.last_login,
        }
    }
}

// ============================================================================
// Password
// ============================================================================

#[derive(Clone, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

// ============================================================================
// Role-gated areas
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct AccessResponse {
    pub message: &'static str,
    pub user_id: UserId,
    pub username: Option<String>,
}

impl AccessResponse {
    pub fn new(message: &'static str, claims: &TokenClaims) -> Self {
        Self {
            message,
            user_id: claims.sub,
            username: claims.username.clone(),
        }
    }
}
