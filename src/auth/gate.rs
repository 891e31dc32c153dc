//! Request gate for page routes.
//!
//! Every page request passes through [`gate_request`]. Public paths are let
//! through untouched. Any other path needs a session token that verifies
//! against the server secret (signature, structure and expiry); the verified
//! user is attached to that request's extensions and dropped with it.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use super::cookie::{AUTH_COOKIE_NAME, get_cookie};
use super::errors::PageRedirect;
use super::session::verify_token;
use crate::jwt::{JwtConfig, SessionUser};

/// Paths reachable without a session. Matched exactly.
pub const PUBLIC_PATHS: [&str; 3] = ["/login", "/olvide-mi-contrasena", "/registro"];

pub fn is_public_path(path: &str) -> bool {
    PUBLIC_PATHS.contains(&path)
}

/// What the gate does with a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Public path; no session looked at.
    Public,
    /// Session verified; continue with this user attached.
    Authenticated(SessionUser),
    /// Missing or invalid session.
    RedirectToLogin,
}

/// Decide the fate of a request from its path and raw session token.
pub fn decide(path: &str, token: Option<&str>, jwt: &JwtConfig) -> GateDecision {
    if is_public_path(path) {
        return GateDecision::Public;
    }

    match verify_token(token, jwt).into_user() {
        Some(user) => GateDecision::Authenticated(user),
        None => GateDecision::RedirectToLogin,
    }
}

/// Middleware applying [`decide`] to every request of the router it wraps.
pub async fn gate_request(
    State(jwt): State<Arc<JwtConfig>>,
    mut request: Request,
    next: Next,
) -> Response {
    let decision = decide(
        request.uri().path(),
        get_cookie(request.headers(), AUTH_COOKIE_NAME),
        &jwt,
    );

    match decision {
        GateDecision::Public => next.run(request).await,
        GateDecision::Authenticated(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        GateDecision::RedirectToLogin => {
            debug!(path = %request.uri().path(), "Redirecting to login");
            PageRedirect::Login.into_response()
        }
    }
}
