//! Auth Middleware
//!
//! Bearer-token filter for protected routes. A filter is assembled once
//! at wiring time from ordered stages and run by [`enforce`] through
//! `axum::middleware::from_fn_with_state`. It never touches the store:
//! one HMAC check plus claim predicates per request.

use std::borrow::Cow;
use std::sync::Arc;

use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::http::{Extensions, HeaderMap, header};
use axum::middleware::Next;
use axum::response::Response;

use crate::application::token::{TokenClaims, TokenCodec};
use crate::error::{AuthError, AuthResult};

pub const MISSING_HEADER: &str = "Authorization header is required";
pub const BAD_HEADER_FORMAT: &str = "Authorization header format must be Bearer <token>";

type Predicate = dyn Fn(&TokenClaims) -> bool + Send + Sync;

/// One authorization check over verified claims
#[derive(Clone)]
struct Stage {
    predicate: Arc<Predicate>,
    denial: Cow<'static, str>,
}

/// Composable request filter
///
/// ```rust,ignore
/// let admin = AuthFilter::authenticated(codec).superuser("Admin access required");
/// router.route_layer(axum::middleware::from_fn_with_state(admin, enforce));
/// ```
#[derive(Clone)]
pub struct AuthFilter {
    codec: TokenCodec,
    stages: Arc<[Stage]>,
}

impl AuthFilter {
    /// Require a valid bearer token and nothing else
    pub fn authenticated(codec: TokenCodec) -> Self {
        Self {
            codec,
            stages: Arc::from(Vec::new()),
        }
    }

    /// Additionally require `is_superuser`
    pub fn superuser(self, denial: impl Into<Cow<'static, str>>) -> Self {
        self.require(|claims| claims.is_superuser, denial)
    }

    /// Additionally require a caller-supplied predicate; `denial` becomes
    /// the 403 message
    pub fn require<F>(self, predicate: F, denial: impl Into<Cow<'static, str>>) -> Self
    where
        F: Fn(&TokenClaims) -> bool + Send + Sync + 'static,
    {
        let mut stages = self.stages.to_vec();
        stages.push(Stage {
            predicate: Arc::new(predicate),
            denial: denial.into(),
        });
        Self {
            codec: self.codec,
            stages: stages.into(),
        }
    }

    /// Run every stage against the request headers
    pub fn check(&self, headers: &HeaderMap) -> AuthResult<TokenClaims> {
        let token = bearer_token(headers)?;
        let claims = self.codec.parse(token)?;

        for stage in self.stages.iter() {
            if !(stage.predicate)(&claims) {
                tracing::debug!(user_id = %claims.sub, "Filter predicate refused claims");
                return Err(AuthError::Forbidden(stage.denial.clone().into_owned()));
            }
        }

        Ok(claims)
    }
}

/// Extract the token from `Authorization: Bearer <token>`
///
/// Exactly two whitespace-separated parts; the scheme is case-sensitive.
fn bearer_token(headers: &HeaderMap) -> AuthResult<&str> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Err(AuthError::Unauthorized(MISSING_HEADER));
    };
    let value = value
        .to_str()
        .map_err(|_| AuthError::Unauthorized(BAD_HEADER_FORMAT))?;
    if value.trim().is_empty() {
        return Err(AuthError::Unauthorized(MISSING_HEADER));
    }

    let mut parts = value.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) => Ok(token),
        _ => Err(AuthError::Unauthorized(BAD_HEADER_FORMAT)),
    }
}

/// Middleware entry point
///
/// On success the claims are stored as [`CurrentUser`] in the request
/// extensions.
pub async fn enforce(
    State(filter): State<AuthFilter>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let claims = filter.check(req.headers())?;
    req.extensions_mut().insert(CurrentUser(claims));
    Ok(next.run(req).await)
}

/// Claims of the authenticated caller
///
/// Keyed by type in the request extensions, so nothing else can collide
/// with it.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub TokenClaims);

impl CurrentUser {
    /// `UnauthenticatedAccess` if no filter admitted this request
    pub fn from_extensions(extensions: &Extensions) -> AuthResult<Self> {
        extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(AuthError::UnauthenticatedAccess)
    }

    pub fn is_authenticated(extensions: &Extensions) -> bool {
        extensions.get::<CurrentUser>().is_some()
    }

    pub fn claims(&self) -> &TokenClaims {
        &self.0
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::from_extensions(&parts.extensions)
    }
}
