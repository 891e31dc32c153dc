mod auth;
mod error;

use axum::Router;
use std::sync::Arc;

use crate::db::Database;
use crate::jwt::JwtConfig;
use crate::rate_limit::RateLimitConfig;

pub use auth::AuthApiState;
pub use error::{ApiError, ResultExt};

/// Create the API router.
pub fn create_api_router(
    db: Database,
    jwt: Arc<JwtConfig>,
    secure_cookies: bool,
    rate_limit: Arc<RateLimitConfig>,
) -> Router {
    let auth_state = auth::AuthApiState {
        db,
        jwt,
        secure_cookies,
        rate_limit,
    };

    Router::new().nest("/auth", auth::router(auth_state))
}
