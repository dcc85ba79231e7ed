//! End-to-end authentication flow tests
//!
//! These exercise the full register/login/introspect path against a real
//! PostgreSQL database and are gated behind `TEST_DATABASE_URL`.

use sqlx::PgPool;
use uuid::Uuid;

use wes_portal_server::auth::{AuthError, AuthService, JwtConfig};
use wes_portal_server::models::{ChangePasswordRequest, LoginRequest, RegisterRequest};
use wes_portal_server::users::UserStore;

/// Helper to create a test database pool with the schema applied
async fn setup_test_service() -> AuthService {
    let database_url = std::env::var("TEST_DATABASE_URL")
        .unwrap_or_else(|_| "postgresql://localhost/wes_portal_test".to_string());

    let pool: PgPool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to apply migrations");

    AuthService::new(UserStore::new(pool), JwtConfig::new("test-secret-key", 900))
}

/// Fresh email per call so runs do not collide in a shared database
fn unique_email(tag: &str) -> String {
    format!("{}-{}@example.com", tag, Uuid::new_v4())
}

fn register_request(email: &str) -> RegisterRequest {
    RegisterRequest {
        first_name: "Jane".to_string(),
        last_name: "Doe".to_string(),
        email: email.to_string(),
        password: "secret1".to_string(),
        phone: None,
        date_of_birth: None,
        country: None,
    }
}

#[tokio::test]
#[ignore] // Requires database setup
async fn test_register_then_login_round_trip() {
    let service = setup_test_service().await;
    let email = unique_email("roundtrip");

    let registered = service.register(register_request(&email)).await.unwrap();
    assert!(!registered.token.is_empty());
    assert_eq!(registered.user.email, email.to_lowercase());

    // The issued token resolves back to the same user
    let check = service.verify_session(&registered.token).unwrap();
    assert!(check.valid);
    assert_eq!(check.user_id, registered.user.id);

    let logged_in = service
        .login(LoginRequest {
            email: email.clone(),
            password: "secret1".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(logged_in.user.id, registered.user.id);
    assert!(logged_in.user.last_login_at.is_some());

    let check = service.verify_session(&logged_in.token).unwrap();
    assert_eq!(check.user_id, registered.user.id);
}

#[tokio::test]
#[ignore] // Requires database setup
async fn test_duplicate_email_is_rejected_case_insensitively() {
    let service = setup_test_service().await;
    let email = unique_email("dupe");

    service.register(register_request(&email)).await.unwrap();

    let shouted = email.to_uppercase();
    let result = service.register(register_request(&shouted)).await;
    assert!(matches!(result, Err(AuthError::DuplicateEmail)));
}

#[tokio::test]
#[ignore] // Requires database setup
async fn test_wrong_password_and_unknown_email_are_indistinguishable() {
    let service = setup_test_service().await;
    let email = unique_email("oracle");

    service.register(register_request(&email)).await.unwrap();

    let wrong_password = service
        .login(LoginRequest {
            email,
            password: "wrong-password".to_string(),
        })
        .await
        .unwrap_err();

    let unknown_email = service
        .login(LoginRequest {
            email: unique_email("never-registered"),
            password: "secret1".to_string(),
        })
        .await
        .unwrap_err();

    // Same variant, same message: no user-existence oracle
    assert!(matches!(wrong_password, AuthError::InvalidCredentials));
    assert!(matches!(unknown_email, AuthError::InvalidCredentials));
    assert_eq!(wrong_password.to_string(), unknown_email.to_string());
}

#[tokio::test]
#[ignore] // Requires database setup
async fn test_valid_token_for_a_missing_user_fails_lookup() {
    let service = setup_test_service().await;

    // verify_session stays token-only and passes; loading the user fails
    let token = service
        .jwt()
        .issue(
            Uuid::new_v4(),
            wes_portal_server::models::UserRole::Applicant,
        )
        .unwrap();
    assert!(service.verify_session(&token).unwrap().valid);

    let result = service.current_user(Uuid::new_v4()).await;
    assert!(matches!(result, Err(AuthError::UserNotFound)));
}

#[tokio::test]
#[ignore] // Requires database setup
async fn test_change_password_requires_the_current_one() {
    let service = setup_test_service().await;
    let email = unique_email("rotate");

    let registered = service.register(register_request(&email)).await.unwrap();
    let user_id = registered.user.id;

    // Wrong current password leaves everything unchanged
    let result = service
        .change_password(
            user_id,
            ChangePasswordRequest {
                current_password: "wrong-password".to_string(),
                new_password: "next-secret".to_string(),
            },
        )
        .await;
    assert!(matches!(result, Err(AuthError::InvalidCredentials)));

    service
        .login(LoginRequest {
            email: email.clone(),
            password: "secret1".to_string(),
        })
        .await
        .expect("old password must still work");

    // Correct current password rotates the credential
    service
        .change_password(
            user_id,
            ChangePasswordRequest {
                current_password: "secret1".to_string(),
                new_password: "next-secret".to_string(),
            },
        )
        .await
        .unwrap();

    let old = service
        .login(LoginRequest {
            email: email.clone(),
            password: "secret1".to_string(),
        })
        .await;
    assert!(matches!(old, Err(AuthError::InvalidCredentials)));

    service
        .login(LoginRequest {
            email,
            password: "next-secret".to_string(),
        })
        .await
        .expect("new password must work");
}
