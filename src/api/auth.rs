//! Session endpoints: login, logout and identity lookups.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use super::error::{ApiError, ResultExt};
use crate::auth::{ApiAuth, OptionalSession, clear_session_cookie, session_cookie};
use crate::db::{Database, UserRole};
use crate::impl_has_auth_backend;
use crate::jwt::{JwtConfig, SessionUser};
use crate::password::verify_password_or_dummy;
use crate::rate_limit::{RateLimitConfig, rate_limit_login};

#[derive(Clone)]
pub struct AuthApiState {
    pub db: Database,
    pub jwt: Arc<JwtConfig>,
    pub secure_cookies: bool,
    pub rate_limit: Arc<RateLimitConfig>,
}

impl_has_auth_backend!(AuthApiState);

pub fn router(state: AuthApiState) -> Router {
    let login_router = Router::new()
        .route("/login", post(login))
        .with_state(state.clone())
        .layer(middleware::from_fn_with_state(
            state.rate_limit.clone(),
            rate_limit_login,
        ));

    Router::new()
        .route("/logout", post(logout))
        .route("/role", get(get_role))
        .route("/me", get(get_me))
        .with_state(state)
        .merge(login_router)
}

#[derive(Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

async fn login(
    State(state): State<AuthApiState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let email = payload.email.trim();

    if email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }

    let user = state
        .db
        .users()
        .get_by_email(email)
        .await
        .db_err("Failed to look up user")?;
    let verified = verify_password_or_dummy(
        user.as_ref().map(|user| user.password_hash.as_str()),
        &payload.password,
    );

    let Some(user) = user.filter(|_| verified) else {
        info!(email = %email, "Failed login attempt");
        return Err(ApiError::unauthorized("Invalid email or password"));
    };

    let session = SessionUser {
        id: user.id,
        email: user.email,
        role: user.role,
        name: user.name,
    };

    let token = state
        .jwt
        .generate_session_token(&session)
        .internal_err("Failed to generate session token")?;

    info!(user_id = session.id, role = %session.role, "User logged in");

    let cookie = session_cookie(&token.token, token.duration, state.secure_cookies);
    Ok(([(header::SET_COOKIE, cookie)], Json(session)))
}

async fn logout(State(state): State<AuthApiState>) -> impl IntoResponse {
    (
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, clear_session_cookie(state.secure_cookies))],
    )
}

#[derive(Serialize)]
struct RoleResponse {
    rol: Option<UserRole>,
}

/// Role of the current session, `null` when there is none. Always 200.
async fn get_role(OptionalSession(user): OptionalSession) -> Json<RoleResponse> {
    Json(RoleResponse {
        rol: user.map(|u| u.role),
    })
}

async fn get_me(ApiAuth(user): ApiAuth) -> Json<SessionUser> {
    Json(user)
}
