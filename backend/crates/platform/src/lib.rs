//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (HMAC-SHA256, Base64url)
//! - Password hashing (bcrypt)
//! - Numeric one-time code generation from the OS entropy source

pub mod crypto;
pub mod otp;
pub mod password;
