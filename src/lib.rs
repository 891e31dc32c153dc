pub mod api;
pub mod auth;
pub mod cli;
pub mod db;
pub mod jwt;
pub mod pages;
pub mod password;
pub mod rate_limit;

use api::create_api_router;
use axum::{Router, http::HeaderName};
use db::Database;
use jwt::JwtConfig;
use pages::PagesState;
use rate_limit::RateLimitConfig;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

pub struct ServerConfig {
    /// Database handle obtained from the connection provider
    pub db: Database,
    /// JWT secret for signing session tokens
    pub jwt_secret: Vec<u8>,
    /// Whether to set Secure flag on cookies (should be true in production with HTTPS)
    pub secure_cookies: bool,
    /// Header carrying the client IP when running behind a proxy
    pub ip_header: Option<HeaderName>,
}

/// Create the application router with the given configuration.
pub fn create_app(config: &ServerConfig) -> Router {
    create_app_with_rate_limit(
        config,
        Arc::new(RateLimitConfig::new(config.ip_header.clone())),
    )
}

/// Create the application router with an explicit login rate limiter.
pub fn create_app_with_rate_limit(
    config: &ServerConfig,
    rate_limit: Arc<RateLimitConfig>,
) -> Router {
    let jwt = Arc::new(JwtConfig::new(&config.jwt_secret));

    let api_router = create_api_router(
        config.db.clone(),
        jwt.clone(),
        config.secure_cookies,
        rate_limit,
    );

    let page_router = pages::router(PagesState {
        db: config.db.clone(),
        jwt,
    });

    Router::new().nest("/api", api_router).merge(page_router)
}

/// Run the server on the given listener. This function blocks until the server exits.
pub async fn run_server(config: ServerConfig, listener: TcpListener) -> Result<(), std::io::Error> {
    let limiter = Arc::new(RateLimitConfig::new(config.ip_header.clone()));
    rate_limit::spawn_limiter_cleanup(limiter.clone());

    let app = create_app_with_rate_limit(&config, limiter);
    let make_service = app.into_make_service_with_connect_info::<SocketAddr>();
    axum::serve(listener, make_service).await
}
