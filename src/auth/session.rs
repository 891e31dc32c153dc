//! Reads and verifies the session cookie of a request.

use axum::http::HeaderMap;
use tracing::{debug, warn};

use super::cookie::{AUTH_COOKIE_NAME, get_cookie};
use crate::jwt::{JwtConfig, SessionUser};

/// Outcome of looking up the session behind a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionLookup {
    /// No session cookie was sent.
    Missing,
    /// A token was sent but is malformed, expired or wrongly signed.
    Rejected,
    /// The token verified against the server secret.
    Valid(SessionUser),
}

impl SessionLookup {
    pub fn into_user(self) -> Option<SessionUser> {
        match self {
            SessionLookup::Valid(user) => Some(user),
            SessionLookup::Missing | SessionLookup::Rejected => None,
        }
    }
}

/// Verify an optional raw token.
///
/// Absence is logged at debug level, rejection at warn level, so the two stay
/// distinguishable even though callers treat both as unauthenticated.
pub fn verify_token(token: Option<&str>, jwt: &JwtConfig) -> SessionLookup {
    let Some(token) = token else {
        debug!("No session cookie");
        return SessionLookup::Missing;
    };

    match jwt.validate_session_token(token) {
        Ok(claims) => SessionLookup::Valid(claims.into()),
        Err(e) => {
            warn!(error = %e, "Rejected session token");
            SessionLookup::Rejected
        }
    }
}

/// Look up the session carried by the request's `auth-token` cookie.
pub fn lookup_session(headers: &HeaderMap, jwt: &JwtConfig) -> SessionLookup {
    verify_token(get_cookie(headers, AUTH_COOKIE_NAME), jwt)
}

/// Return the verified user behind the request, or nothing.
///
/// Never fails: a missing cookie and a token that does not verify both yield `None`.
pub fn get_user(headers: &HeaderMap, jwt: &JwtConfig) -> Option<SessionUser> {
    lookup_session(headers, jwt).into_user()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::UserRole;
    use axum::http::{HeaderValue, header};

    const SECRET: &[u8] = b"session-reader-test-secret-0123456789";

    fn admin() -> SessionUser {
        SessionUser {
            id: 1,
            email: "direccion@colegio.test".to_string(),
            role: UserRole::Admin,
            name: "Dirección".to_string(),
        }
    }

    fn headers_with_token(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("{}={}", AUTH_COOKIE_NAME, token)).unwrap(),
        );
        headers
    }

    #[test]
    fn test_missing_cookie_returns_none() {
        let jwt = JwtConfig::new(SECRET);

        assert_eq!(lookup_session(&HeaderMap::new(), &jwt), SessionLookup::Missing);
        assert_eq!(get_user(&HeaderMap::new(), &jwt), None);
    }

    #[test]
    fn test_valid_token_returns_claims() {
        let jwt = JwtConfig::new(SECRET);
        let token = jwt.generate_session_token(&admin()).unwrap().token;

        assert_eq!(get_user(&headers_with_token(&token), &jwt), Some(admin()));
    }

    #[test]
    fn test_wrong_signature_is_rejected() {
        let jwt = JwtConfig::new(SECRET);
        let other = JwtConfig::new(b"some-other-secret-that-is-long-enough");
        let token = other.generate_session_token(&admin()).unwrap().token;

        let headers = headers_with_token(&token);
        assert_eq!(lookup_session(&headers, &jwt), SessionLookup::Rejected);
        assert_eq!(get_user(&headers, &jwt), None);
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        let jwt = JwtConfig::new(SECRET);

        assert_eq!(
            lookup_session(&headers_with_token("not-a-token"), &jwt),
            SessionLookup::Rejected
        );
    }
}
