//! Role gate and the axum extractors built on it.

use std::marker::PhantomData;

use axum::{extract::FromRequestParts, http::request::Parts};

use super::errors::{ApiAuthError, PageRedirect};
use super::session::get_user;
use super::state::HasAuthBackend;
use crate::db::UserRole;
use crate::jwt::{JwtConfig, SessionUser};

/// Require a verified session, else send the request to the login page.
pub fn require_auth(user: Option<SessionUser>) -> Result<SessionUser, PageRedirect> {
    user.ok_or(PageRedirect::Login)
}

/// Require a verified session whose role is one of `allowed`.
///
/// Without a session the request goes to the login page; with the wrong role
/// it goes to the dashboard. On success the user is returned unchanged.
pub fn require_role(
    user: Option<SessionUser>,
    allowed: &[UserRole],
) -> Result<SessionUser, PageRedirect> {
    let user = require_auth(user)?;
    if allowed.contains(&user.role) {
        Ok(user)
    } else {
        Err(PageRedirect::Dashboard)
    }
}

/// Roles a handler accepts.
pub trait RoleConstraint: Send + Sync + 'static {
    const ALLOWED: &'static [UserRole];
}

/// Any authenticated user.
pub struct AnyRole;

impl RoleConstraint for AnyRole {
    const ALLOWED: &'static [UserRole] = &[UserRole::Admin, UserRole::Teacher, UserRole::Student];
}

/// Administrators only.
pub struct AdminOnly;

impl RoleConstraint for AdminOnly {
    const ALLOWED: &'static [UserRole] = &[UserRole::Admin];
}

/// Administrators and teachers.
pub struct StaffOnly;

impl RoleConstraint for StaffOnly {
    const ALLOWED: &'static [UserRole] = &[UserRole::Admin, UserRole::Teacher];
}

/// The user verified for this request.
///
/// Prefers the user the request gate already attached; otherwise verifies the
/// cookie. Nothing outlives the request.
fn session_user(parts: &Parts, jwt: &JwtConfig) -> Option<SessionUser> {
    if let Some(user) = parts.extensions.get::<SessionUser>() {
        return Some(user.clone());
    }
    get_user(&parts.headers, jwt)
}

/// Extractor for pages that require a session with one of the roles in `C`.
/// Rejects with a redirect (see [`require_role`]).
pub struct Auth<C: RoleConstraint = AnyRole> {
    pub user: SessionUser,
    _constraint: PhantomData<C>,
}

impl<S, C> FromRequestParts<S> for Auth<C>
where
    S: HasAuthBackend + Send + Sync,
    C: RoleConstraint,
{
    type Rejection = PageRedirect;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = require_role(session_user(parts, state.jwt()), C::ALLOWED)?;
        Ok(Auth {
            user,
            _constraint: PhantomData,
        })
    }
}

/// Extractor for API endpoints that require a session.
/// Returns a JSON 401 instead of redirecting.
pub struct ApiAuth(pub SessionUser);

impl<S> FromRequestParts<S> for ApiAuth
where
    S: HasAuthBackend + Send + Sync,
{
    type Rejection = ApiAuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        session_user(parts, state.jwt())
            .map(ApiAuth)
            .ok_or(ApiAuthError)
    }
}

/// Optional session extractor - never fails.
pub struct OptionalSession(pub Option<SessionUser>);

impl<S> FromRequestParts<S> for OptionalSession
where
    S: HasAuthBackend + Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalSession(session_user(parts, state.jwt())))
    }
}
