//! WES Portal Backend Server
//!
//! REST API for the WES credential evaluation portal: user registration and
//! login, token-based session verification, and application submission and
//! tracking.

use axum::extract::State;
use axum::http::{HeaderValue, Method};
use axum::{routing::get, Json, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};

use wes_portal_server::application::ApplicationService;
use wes_portal_server::auth::{AuthService, JwtConfig};
use wes_portal_server::config::Config;
use wes_portal_server::db::{self, Database};
use wes_portal_server::middleware::{hsts_header, request_tracing, security_headers};
use wes_portal_server::routes;
use wes_portal_server::state::AppState;
use wes_portal_server::users::UserStore;

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .with_target(true)
        .init();

    // Initialize database connection pool and schema
    let pool = match db::create_pool(&config).await {
        Ok(p) => p,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = db::run_migrations(&pool).await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }

    // The signing configuration is built once here and shared read-only
    let jwt = JwtConfig::new(&config.jwt_secret, config.jwt_ttl_seconds);

    let store = UserStore::new(pool.clone());
    let auth_service = Arc::new(AuthService::new(store, jwt.clone()));
    let application_service = Arc::new(ApplicationService::new(pool.clone()));

    let state = AppState::new(auth_service, application_service, jwt, Database::new(pool));

    // Create the app router
    let mut app = Router::new()
        .route("/api", get(api_index))
        .route("/api/health", get(health_check))
        .merge(routes::auth_routes())
        .merge(routes::user_routes())
        .merge(routes::application_routes())
        .with_state(state)
        .layer(axum::middleware::from_fn(security_headers))
        .layer(axum::middleware::from_fn(request_tracing))
        .layer(configure_cors(&config));

    if config.environment.is_production() {
        app = app.layer(axum::middleware::from_fn(hsts_header));
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    tracing::info!("Server listening on {}", addr);
    tracing::info!(
        environment = config.environment.as_str(),
        "WES Portal API started"
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind server address");

    // Serve with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Server shutdown complete");
}

/// GET /api - Service banner with endpoint listing
async fn api_index() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "WES Credential Portal API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/api/health",
            "auth": {
                "register": "POST /api/auth/register",
                "login": "POST /api/auth/login",
                "me": "GET /api/auth/me",
                "verify": "GET /api/auth/verify-token"
            },
            "applications": "/api/applications"
        }
    }))
}

/// Health check response
#[derive(serde::Serialize)]
struct HealthResponse {
    status: String,
    database: String,
    version: String,
}

/// GET /api/health - Health check endpoint
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let database_connected = state.db.is_healthy().await;

    Json(HealthResponse {
        status: if database_connected {
            "OK".to_string()
        } else {
            "unhealthy".to_string()
        },
        database: if database_connected {
            "connected".to_string()
        } else {
            "error".to_string()
        },
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

fn configure_cors(config: &Config) -> CorsLayer {
    let allowed_origins = config.cors_allowed_origins.clone().unwrap_or_default();

    if allowed_origins.is_empty() {
        tracing::warn!("CORS_ALLOWED_ORIGINS not set, allowing all origins (permissive)");
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
