//! Request gate behavior tests
//!
//! Drives a minimal router through tower's `oneshot` to exercise the bearer
//! token gate end to end, without a database: missing, valid, tampered and
//! expired tokens, plus the admin-role gate.

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    routing::get,
    Router,
};
use tower::ServiceExt;
use uuid::Uuid;

use wes_portal_server::auth::JwtConfig;
use wes_portal_server::middleware::{AdminUser, AuthUser};
use wes_portal_server::models::UserRole;

fn test_router(jwt: JwtConfig) -> Router {
    Router::new()
        .route(
            "/protected",
            get(|user: AuthUser| async move { user.user_id.to_string() }),
        )
        .route(
            "/admin",
            get(|AdminUser(user): AdminUser| async move { user.user_id.to_string() }),
        )
        .with_state(jwt)
}

fn bearer_request(path: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(path)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_missing_token_is_rejected() {
    let app = test_router(JwtConfig::new("test-secret-key", 900));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/protected")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Access token required");
}

#[tokio::test]
async fn test_valid_token_reaches_the_handler() {
    let jwt = JwtConfig::new("test-secret-key", 900);
    let user_id = Uuid::new_v4();
    let token = jwt.issue(user_id, UserRole::Applicant).unwrap();

    let response = test_router(jwt)
        .oneshot(bearer_request("/protected", &token))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(bytes, user_id.to_string().as_bytes());
}

#[tokio::test]
async fn test_truncated_token_is_rejected() {
    let jwt = JwtConfig::new("test-secret-key", 900);
    let token = jwt.issue(Uuid::new_v4(), UserRole::Applicant).unwrap();
    let truncated = &token[..token.len() - 1];

    let response = test_router(jwt)
        .oneshot(bearer_request("/protected", truncated))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Invalid or expired token");
}

#[tokio::test]
async fn test_expired_token_is_rejected_with_the_same_message() {
    // TTL far enough in the past to clear the default validation leeway
    let jwt = JwtConfig::new("test-secret-key", -120);
    let token = jwt.issue(Uuid::new_v4(), UserRole::Applicant).unwrap();

    let response = test_router(jwt)
        .oneshot(bearer_request("/protected", &token))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Expired and malformed tokens must be indistinguishable to the client
    let body = body_json(response).await;
    assert_eq!(body["message"], "Invalid or expired token");
}

#[tokio::test]
async fn test_token_signed_with_another_secret_is_rejected() {
    let jwt = JwtConfig::new("test-secret-key", 900);
    let foreign = JwtConfig::new("other-secret", 900)
        .issue(Uuid::new_v4(), UserRole::Applicant)
        .unwrap();

    let response = test_router(jwt)
        .oneshot(bearer_request("/protected", &foreign))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_gate_rejects_applicants() {
    let jwt = JwtConfig::new("test-secret-key", 900);
    let token = jwt.issue(Uuid::new_v4(), UserRole::Applicant).unwrap();

    let response = test_router(jwt)
        .oneshot(bearer_request("/admin", &token))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body = body_json(response).await;
    assert_eq!(body["message"], "Admin access required");
}

#[tokio::test]
async fn test_admin_gate_passes_admins() {
    let jwt = JwtConfig::new("test-secret-key", 900);
    let token = jwt.issue(Uuid::new_v4(), UserRole::Admin).unwrap();

    let response = test_router(jwt)
        .oneshot(bearer_request("/admin", &token))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_gate_verification_is_stateless_and_repeatable() {
    let jwt = JwtConfig::new("test-secret-key", 900);
    let user_id = Uuid::new_v4();
    let token = jwt.issue(user_id, UserRole::Applicant).unwrap();

    for _ in 0..3 {
        let response = test_router(jwt.clone())
            .oneshot(bearer_request("/protected", &token))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(bytes, user_id.to_string().as_bytes());
    }
}
