//! Authentication rejections.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Serialize;

/// Page a request is sent to when it has no valid session.
pub const LOGIN_PATH: &str = "/login";

/// Default page for authenticated users who lack the role a page requires.
pub const DASHBOARD_PATH: &str = "/dashboard";

/// Page rejection: a temporary redirect, cookies left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRedirect {
    /// No valid session; go log in.
    Login,
    /// Valid session, insufficient role; fall back to the dashboard.
    Dashboard,
}

impl PageRedirect {
    pub fn location(&self) -> &'static str {
        match self {
            PageRedirect::Login => LOGIN_PATH,
            PageRedirect::Dashboard => DASHBOARD_PATH,
        }
    }
}

impl IntoResponse for PageRedirect {
    fn into_response(self) -> Response {
        Redirect::temporary(self.location()).into_response()
    }
}

/// API authentication error (JSON body instead of a redirect).
#[derive(Debug)]
pub struct ApiAuthError;

impl IntoResponse for ApiAuthError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: &'static str,
        }

        (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: "Not authenticated",
            }),
        )
            .into_response()
    }
}
