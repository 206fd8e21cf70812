//! Entity Module

pub mod otp;
pub mod user;
