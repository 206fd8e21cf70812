//! HTTP Handlers

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;

use crate::application::service::{AuthService, AuthStore};
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    AccessResponse, ChangePasswordRequest, LoginRequest, LoginResponse, RegisterRequest,
    RegisterResponse, UserResponse,
};
use crate::presentation::middleware::CurrentUser;

pub const INVALID_BODY: &str = "Invalid request body";

/// Missing fields, bad JSON and a wrong content type all answer 400
fn parse_body<T>(body: Result<Json<T>, JsonRejection>) -> AuthResult<T> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => {
            tracing::debug!(reason = %rejection.body_text(), "Rejected request body");
            Err(AuthError::Validation(INVALID_BODY.to_string()))
        }
    }
}

// ============================================================================
// Register
// ============================================================================

/// POST /register
pub async fn register<R>(
    State(service): State<AuthService<R>>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> AuthResult<(StatusCode, Json<RegisterResponse>)>
where
    R: AuthStore,
{
    let req = parse_body(body)?;
    let username = req.username.trim().to_string();
    let user_id = service.register(req.into()).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user_id,
            username,
            message: "User registered successfully",
        }),
    ))
}

// ============================================================================
// Login
// ============================================================================

/// POST /login
///
/// `username` may hold either the user name or the email.
pub async fn login<R>(
    State(service): State<AuthService<R>>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> AuthResult<Json<LoginResponse>>
where
    R: AuthStore,
{
    let req = parse_body(body)?;
    let output = service.login(req.username, req.password).await?;

    Ok(Json(LoginResponse {
        token: output.token.token,
        expires_at: output.token.expires_at,
        user_id: output.user.user_id,
    }))
}

// ============================================================================
// Authenticated
// ============================================================================

/// GET /profile
pub async fn profile<R>(
    State(service): State<AuthService<R>>,
    CurrentUser(claims): CurrentUser,
) -> AuthResult<Json<UserResponse>>
where
    R: AuthStore,
{
    let user = service.get_user(claims.sub).await?;
    Ok(Json(user.into()))
}

/// POST /password
pub async fn change_password<R>(
    State(service): State<AuthService<R>>,
    CurrentUser(claims): CurrentUser,
    body: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> AuthResult<StatusCode>
where
    R: AuthStore,
{
    let req = parse_body(body)?;
    service
        .change_password(claims.sub, req.current_password, req.new_password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Role-gated
// ============================================================================

/// GET /admin
pub async fn admin(CurrentUser(claims): CurrentUser) -> Json<AccessResponse> {
    Json(AccessResponse::new("Welcome to the admin area", &claims))
}

/// GET /superuser
pub async fn superuser(CurrentUser(claims): CurrentUser) -> Json<AccessResponse> {
    Json(AccessResponse::new("Welcome to the superuser area", &claims))
}
