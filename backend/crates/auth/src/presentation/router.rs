//! Auth Router

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::application::service::{AuthService, AuthStore};
use crate::presentation::handlers;
use crate::presentation::middleware::{AuthFilter, enforce};

pub const ADMIN_REQUIRED: &str = "Admin access required";
pub const SUPERUSER_REQUIRED: &str = "Superuser access required";

/// Create the Auth router for any store implementation
///
/// Filters are built here once and share the service's token codec.
pub fn auth_router<R>(service: AuthService<R>) -> Router
where
    R: AuthStore,
{
    let codec = service.codec().clone();
    let authenticated = AuthFilter::authenticated(codec.clone());
    let admin = AuthFilter::authenticated(codec.clone()).superuser(ADMIN_REQUIRED);
    let superuser = AuthFilter::authenticated(codec).superuser(SUPERUSER_REQUIRED);

    let authenticated_routes = Router::new()
        .route("/profile", get(handlers::profile::<R>))
        .route("/password", post(handlers::change_password::<R>))
        .route_layer(middleware::from_fn_with_state(authenticated, enforce));

    let admin_routes = Router::new()
        .route("/admin", get(handlers::admin))
        .route_layer(middleware::from_fn_with_state(admin, enforce));

    let superuser_routes = Router::new()
        .route("/superuser", get(handlers::superuser))
        .route_layer(middleware::from_fn_with_state(superuser, enforce));

    Router::new()
        .route("/register", post(handlers::register::<R>))
        .route("/login", post(handlers::login::<R>))
        .merge(authenticated_routes)
        .merge(admin_routes)
        .merge(superuser_routes)
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use http_body_util::BodyExt;
    use kernel::clock::{Clock, ManualClock};
    use platform::password::MIN_COST;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::application::config::AuthConfig;
    use crate::application::profile::UpdateUserInput;
    use crate::domain::value_object::user_id::UserId;
    use crate::infra::memory::InMemoryAuthRepository;

    const ALICE: &str = r#"{"username":"alice","email":"a@x","password":"hunter2","first_name":"A","last_name":"L"}"#;

    struct TestApp {
        router: Router,
        service: AuthService<InMemoryAuthRepository>,
        clock: ManualClock,
    }

    fn test_app() -> TestApp {
        test_app_with_secret("router-test-secret")
    }

    fn test_app_with_secret(secret: &str) -> TestApp {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        let shared: Arc<dyn Clock> = Arc::new(clock.clone());
        let config = AuthConfig::new(secret, Duration::hours(24))
            .unwrap()
            .with_password_cost(MIN_COST)
            .unwrap();
        let service = AuthService::new(
            InMemoryAuthRepository::new(shared.clone()),
            config,
            shared,
        );
        TestApp {
            router: auth_router(service.clone()),
            service,
            clock,
        }
    }

    impl TestApp {
        async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
            let res = self.router.clone().oneshot(req).await.unwrap();
            let status = res.status();
            let bytes = res.into_body().collect().await.unwrap().to_bytes();
            let body = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap()
            };
            (status, body)
        }

        async fn post(&self, uri: &str, body: &str, token: Option<&str>) -> (StatusCode, Value) {
            let mut req = Request::post(uri).header(header::CONTENT_TYPE, "application/json");
            if let Some(token) = token {
                req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
            }
            self.send(req.body(Body::from(body.to_string())).unwrap())
                .await
        }

        async fn get(&self, uri: &str, authorization: Option<&str>) -> (StatusCode, Value) {
            let mut req = Request::get(uri);
            if let Some(value) = authorization {
                req = req.header(header::AUTHORIZATION, value);
            }
            self.send(req.body(Body::empty()).unwrap()).await
        }

        async fn login(&self, handle: &str, password: &str) -> (StatusCode, Value) {
            let body = json!({ "username": handle, "password": password }).to_string();
            self.post("/login", &body, None).await
        }

        async fn token_for(&self, handle: &str, password: &str) -> String {
            let (status, body) = self.login(handle, password).await;
            assert_eq!(status, StatusCode::OK);
            body["token"].as_str().unwrap().to_string()
        }
    }

    #[tokio::test]
    async fn test_register_login_profile() {
        let app = test_app();

        let (status, body) = app.post("/register", ALICE, None).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["user_id"], 1);
        assert_eq!(body["username"], "alice");
        assert_eq!(body["message"], "User registered successfully");

        let (status, body) = app.login("alice", "hunter2").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user_id"], 1);
        let token = body["token"].as_str().unwrap();
        assert!(!token.is_empty());
        let expires_at: DateTime<Utc> = body["expires_at"].as_str().unwrap().parse().unwrap();
        assert_eq!(expires_at, app.clock.now() + Duration::hours(24));

        let (status, body) = app.get("/profile", Some(&format!("Bearer {token}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["username"], "alice");
        assert_eq!(body["email"], "a@x");
        assert_eq!(body["first_name"], "A");
        assert!(body.get("password").is_none());
        assert!(body.get("password_hash").is_none());
    }

    #[tokio::test]
    async fn test_login_by_email() {
        let app = test_app();
        app.post("/register", ALICE, None).await;

        let (status, body) = app.login("a@x", "hunter2").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user_id"], 1);
    }

    #[tokio::test]
    async fn test_wrong_password() {
        let app = test_app();
        app.post("/register", ALICE, None).await;

        let (status, body) = app.login("alice", "nope").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["detail"], "Invalid credentials");

        let (status, body) = app.login("nobody", "hunter2").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["detail"], "Invalid credentials");
    }

    #[tokio::test]
    async fn test_admin_gating() {
        let app = test_app();
        app.post("/register", ALICE, None).await;
        let token = app.token_for("alice", "hunter2").await;

        let (status, body) = app.get("/admin", Some(&format!("Bearer {token}"))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["detail"], ADMIN_REQUIRED);

        let (status, body) = app.get("/superuser", Some(&format!("Bearer {token}"))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["detail"], SUPERUSER_REQUIRED);

        app.service
            .update_user(
                UserId::from_raw(1),
                UpdateUserInput {
                    is_superuser: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        // The old token still carries is_superuser = false
        let (status, _) = app.get("/admin", Some(&format!("Bearer {token}"))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let fresh = app.token_for("alice", "hunter2").await;
        let (status, body) = app.get("/admin", Some(&format!("Bearer {fresh}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user_id"], 1);
        assert_eq!(body["username"], "alice");

        let (status, _) = app.get("/superuser", Some(&format!("Bearer {fresh}"))).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_duplicate_register() {
        let app = test_app();
        let (status, _) = app.post("/register", ALICE, None).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = app.post("/register", ALICE, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "User name or email already exists");
    }

    #[tokio::test]
    async fn test_register_validation_error() {
        let app = test_app();
        let body = r#"{"username":"al","email":"a@x","password":"hunter2"}"#;

        let (status, body) = app.post("/register", body, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], 400);

        let body = r#"{"username":"alice","email":"not-an-email","password":"hunter2"}"#;
        let (status, body) = app.post("/register", body, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "Invalid email format");
        assert_eq!(body["action"], "Use the form local@domain");
    }

    #[tokio::test]
    async fn test_malformed_bodies_are_bad_requests() {
        let app = test_app();
        app.post("/register", ALICE, None).await;
        let token = app.token_for("alice", "hunter2").await;

        for (uri, body, token) in [
            ("/register", r#"{"username":"bob","email":"b@x"}"#, None),
            ("/login", r#"{"username":"alice"}"#, None),
            ("/login", "{not json", None),
            ("/password", r#"{"new_password":"s3cret"}"#, Some(token.as_str())),
        ] {
            let (status, body) = app.post(uri, body, token).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(body["status"], 400);
            assert_eq!(body["detail"], handlers::INVALID_BODY);
        }
    }

    #[tokio::test]
    async fn test_register_without_content_type() {
        let app = test_app();
        let req = Request::post("/register").body(Body::from(ALICE)).unwrap();

        let (status, body) = app.send(req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], handlers::INVALID_BODY);
        assert!(app.service.get_user(UserId::from_raw(1)).await.is_err());
    }

    #[tokio::test]
    async fn test_protected_routes_reject_bad_credentials() {
        let app = test_app();
        app.post("/register", ALICE, None).await;
        let token = app.token_for("alice", "hunter2").await;

        let other = test_app_with_secret("some-other-secret");
        other.post("/register", ALICE, None).await;
        let foreign = other.token_for("alice", "hunter2").await;

        let unsigned = {
            let mut parts: Vec<&str> = token.split('.').collect();
            parts[2] = "";
            parts.join(".")
        };

        for path in ["/profile", "/admin", "/superuser"] {
            for auth in [
                None,
                Some(format!("Basic {token}")),
                Some(token.clone()),
                Some(format!("Bearer {unsigned}")),
                Some(format!("Bearer {foreign}")),
            ] {
                let (status, _) = app.get(path, auth.as_deref()).await;
                assert_eq!(status, StatusCode::UNAUTHORIZED, "{path} {auth:?}");
            }
        }
    }

    #[tokio::test]
    async fn test_expired_token_is_rejected() {
        let app = test_app();
        app.post("/register", ALICE, None).await;
        let token = app.token_for("alice", "hunter2").await;

        app.clock.advance(Duration::hours(24));
        let (status, body) = app.get("/profile", Some(&format!("Bearer {token}"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["detail"], "Invalid or expired token");
    }

    #[tokio::test]
    async fn test_change_password_endpoint() {
        let app = test_app();
        app.post("/register", ALICE, None).await;
        let token = app.token_for("alice", "hunter2").await;

        let wrong = r#"{"current_password":"nope","new_password":"s3cret"}"#;
        let (status, body) = app.post("/password", wrong, Some(&token)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "Current password is incorrect");

        let right = r#"{"current_password":"hunter2","new_password":"s3cret"}"#;
        let (status, _) = app.post("/password", right, Some(&token)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        assert_eq!(app.login("alice", "hunter2").await.0, StatusCode::UNAUTHORIZED);
        assert_eq!(app.login("alice", "s3cret").await.0, StatusCode::OK);

        let (status, _) = app.post("/password", right, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
