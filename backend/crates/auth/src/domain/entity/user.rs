//! User Entity
//!
//! A principal: login handles, password hash, role flags and timestamps.

use chrono::{DateTime, Utc};

use crate::domain::value_object::{
    email::Email, user_id::UserId, user_name::UserName, user_password::UserPassword,
};

/// User entity as stored
///
/// Deliberately not `Serialize`: the password hash must never reach a
/// response body. Presentation maps it to a DTO.
#[derive(Debug, Clone)]
pub struct User {
    /// Store-assigned identifier
    pub user_id: UserId,
    /// Unique, case-sensitive login handle
    pub user_name: UserName,
    /// Unique, lowercased login handle
    pub email: Email,
    pub password_hash: UserPassword,
    pub first_name: String,
    pub last_name: String,
    /// Inactive users cannot authenticate
    pub is_active: bool,
    /// Passes the admin/superuser filters
    pub is_superuser: bool,
    pub date_joined: DateTime<Utc>,
    /// Last successful authentication
    pub last_login: Option<DateTime<Utc>>,
    pub password_changed: DateTime<Utc>,
}

impl User {
    /// Check if user can login
    pub fn can_login(&self) -> bool {
        self.is_active
    }

    /// Whether `handle` is this user's user name or email
    pub fn matches_login(&self, handle: &str) -> bool {
        self.user_name.as_str() == handle || self.email.as_str() == handle.to_lowercase()
    }

    /// Apply a profile update; `None` fields are left unchanged
    pub fn apply(&mut self, changes: UserChanges) {
        if let Some(user_name) = changes.user_name {
            self.user_name = user_name;
        }
        if let Some(email) = changes.email {
            self.email = email;
        }
        if let Some(first_name) = changes.first_name {
            self.first_name = first_name;
        }
        if let Some(last_name) = changes.last_name {
            self.last_name = last_name;
        }
        if let Some(is_active) = changes.is_active {
            self.is_active = is_active;
        }
        if let Some(is_superuser) = changes.is_superuser {
            self.is_superuser = is_superuser;
        }
    }
}

/// Validated registration data, before the store assigns an id
#[derive(Debug, Clone)]
pub struct NewUser {
    pub user_name: UserName,
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    pub is_superuser: bool,
}

impl NewUser {
    /// Active, non-superuser account
    pub fn new(user_name: UserName, email: Email) -> Self {
        Self {
            user_name,
            email,
            first_name: String::new(),
            last_name: String::new(),
            is_active: true,
            is_superuser: false,
        }
    }
}

/// Validated profile changes
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub user_name: Option<UserName>,
    pub email: Option<Email>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_active: Option<bool>,
    pub is_superuser: Option<bool>,
}
