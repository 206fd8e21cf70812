//! Schema Initializer
//!
//! Idempotent DDL for the `users` and `otp` tables, run once at startup.
//! Only creates what is missing; it never alters existing tables.

use sqlx::PgPool;

use crate::error::AuthResult;

const CREATE_USERS: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id               BIGSERIAL PRIMARY KEY,
    username         VARCHAR(50)  NOT NULL UNIQUE,
    email            VARCHAR(254) NOT NULL UNIQUE,
    password         TEXT         NOT NULL,
    first_name       TEXT         NOT NULL DEFAULT '',
    last_name        TEXT         NOT NULL DEFAULT '',
    is_active        BOOLEAN      NOT NULL DEFAULT TRUE,
    is_superuser     BOOLEAN      NOT NULL DEFAULT FALSE,
    date_joined      TIMESTAMPTZ  NOT NULL DEFAULT NOW(),
    last_login       TIMESTAMPTZ,
    password_changed TIMESTAMPTZ  NOT NULL DEFAULT NOW()
)
"#;

const CREATE_OTP: &str = r#"
CREATE TABLE IF NOT EXISTS otp (
    id         BIGSERIAL PRIMARY KEY,
    user_id    BIGINT      NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    otp        VARCHAR(16) NOT NULL,
    expires_at TIMESTAMPTZ NOT NULL,
    verified   BOOLEAN     NOT NULL DEFAULT FALSE
)
"#;

const CREATE_OTP_USER_INDEX: &str = "CREATE INDEX IF NOT EXISTS idx_otp_user_id ON otp (user_id)";

/// Statements in dependency order
pub const SCHEMA_STATEMENTS: [&str; 3] = [CREATE_USERS, CREATE_OTP, CREATE_OTP_USER_INDEX];

/// Create the auth tables if they do not exist
pub async fn initialize_schema(pool: &PgPool) -> AuthResult<()> {
    for statement in SCHEMA_STATEMENTS {
        sqlx::query(statement).execute(pool).await?;
    }

    tracing::info!("Auth schema initialized");
    Ok(())
}
