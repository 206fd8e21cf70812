//! PostgreSQL Repository Implementations
//!
//! Parameterized queries only. Liveness of OTP rows is judged by the
//! database clock (`NOW()`), never the caller's.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::entity::{
    otp::OtpId,
    user::{NewUser, User},
};
use crate::domain::repository::{OtpRepository, UserRepository};
use crate::domain::value_object::{
    email::Email, user_id::UserId, user_name::UserName, user_password::UserPassword,
};
use crate::error::{AuthError, AuthResult};

/// PostgreSQL-backed auth repository
///
/// The pool is owned by the caller; dropping the repository does not close it.
#[derive(Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Unique violations (SQLSTATE 23505) become `Conflict`
fn map_unique_violation(err: sqlx::Error) -> AuthError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => AuthError::Conflict,
        _ => AuthError::Database(err),
    }
}

const USER_COLUMNS: &str = r#"
    id,
    username,
    email,
    password,
    first_name,
    last_name,
    is_active,
    is_superuser,
    date_joined,
    last_login,
    password_changed
"#;

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for PgAuthRepository {
    async fn insert(&self, user: &NewUser, password: &UserPassword) -> AuthResult<UserId> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO users (
                username,
                email,
                password,
                first_name,
                last_name,
                is_active,
                is_superuser
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(user.user_name.as_str())
        .bind(user.email.as_str())
        .bind(password.as_str())
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.is_active)
        .bind(user.is_superuser)
        .fetch_one(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        Ok(UserId::from_raw(id))
    }

    async fn find_by_login(&self, handle: &str) -> AuthResult<Option<User>> {
        let query = format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE is_active = TRUE AND (username = $1 OR email = LOWER($1)) \
             LIMIT 1"
        );
        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(handle)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(UserRow::into_user))
    }

    async fn find_by_id(&self, user_id: UserId) -> AuthResult<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(user_id.as_i64())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(UserRow::into_user))
    }

    async fn exists(&self, user_id: UserId) -> AuthResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(user_id.as_i64())
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    async fn update_last_login(&self, user_id: UserId, at: DateTime<Utc>) -> AuthResult<()> {
        let affected = sqlx::query("UPDATE users SET last_login = $2 WHERE id = $1")
            .bind(user_id.as_i64())
            .bind(at)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if affected == 0 {
            return Err(AuthError::UserNotFound);
        }
        Ok(())
    }

    async fn update_password(
        &self,
        user_id: UserId,
        password: &UserPassword,
        at: DateTime<Utc>,
    ) -> AuthResult<()> {
        let affected =
            sqlx::query("UPDATE users SET password = $2, password_changed = $3 WHERE id = $1")
                .bind(user_id.as_i64())
                .bind(password.as_str())
                .bind(at)
                .execute(&self.pool)
                .await?
                .rows_affected();

        if affected == 0 {
            return Err(AuthError::UserNotFound);
        }
        Ok(())
    }

    async fn update_profile(&self, user: &User) -> AuthResult<()> {
        let affected = sqlx::query(
            r#"
            UPDATE users SET
                username = $2,
                email = $3,
                first_name = $4,
                last_name = $5,
                is_active = $6,
                is_superuser = $7
            WHERE id = $1
            "#,
        )
        .bind(user.user_id.as_i64())
        .bind(user.user_name.as_str())
        .bind(user.email.as_str())
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.is_active)
        .bind(user.is_superuser)
        .execute(&self.pool)
        .await
        .map_err(map_unique_violation)?
        .rows_affected();

        if affected == 0 {
            return Err(AuthError::UserNotFound);
        }
        Ok(())
    }
}

// ============================================================================
// OTP Repository Implementation
// ============================================================================

impl OtpRepository for PgAuthRepository {
    async fn replace_for_user(
        &self,
        user_id: UserId,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> AuthResult<OtpId> {
        let mut tx = self.pool.begin().await?;

        // Serialize issuance per user; released at commit or rollback
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(user_id.as_i64())
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM otp WHERE user_id = $1")
            .bind(user_id.as_i64())
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let otp_id: i64 = sqlx::query_scalar(
            "INSERT INTO otp (user_id, otp, expires_at) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(user_id.as_i64())
        .bind(code)
        .bind(expires_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::debug!(user_id = %user_id, replaced = deleted, "Replaced OTP rows");

        Ok(OtpId::from_raw(otp_id))
    }

    async fn find_live(&self, user_id: UserId, code: &str) -> AuthResult<Option<OtpId>> {
        let otp_id: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT id FROM otp
            WHERE user_id = $1
              AND otp = $2
              AND expires_at > NOW()
              AND verified = FALSE
            LIMIT 1
            "#,
        )
        .bind(user_id.as_i64())
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(otp_id.map(OtpId::from_raw))
    }

    async fn mark_verified(&self, otp_id: OtpId) -> AuthResult<bool> {
        let affected = sqlx::query(
            r#"
            UPDATE otp SET verified = TRUE
            WHERE id = $1
              AND verified = FALSE
              AND expires_at > NOW()
            "#,
        )
        .bind(otp_id.as_i64())
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(affected == 1)
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    password: String,
    first_name: String,
    last_name: String,
    is_active: bool,
    is_superuser: bool,
    date_joined: DateTime<Utc>,
    last_login: Option<DateTime<Utc>>,
    password_changed: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> User {
        User {
            user_id: UserId::from_raw(self.id),
            user_name: UserName::from_db(self.username),
            email: Email::from_db(self.email),
            password_hash: UserPassword::from_db(self.password),
            first_name: self.first_name,
            last_name: self.last_name,
            is_active: self.is_active,
            is_superuser: self.is_superuser,
            date_joined: self.date_joined,
            last_login: self.last_login,
            password_changed: self.password_changed,
        }
    }
}
