//! Cookie-based session authentication with role-gated pages.
//!
//! A signed session token lives in the `auth-token` cookie. Page routes sit
//! behind [`gate_request`], which verifies the token once per request; pages
//! then apply role constraints through the [`Auth`] extractor. API routes
//! verify the cookie themselves and answer in JSON.

mod cookie;
mod errors;
mod gate;
mod guard;
mod ip;
mod session;
mod state;

pub use cookie::{AUTH_COOKIE_NAME, clear_session_cookie, get_cookie, session_cookie};
pub use errors::{ApiAuthError, DASHBOARD_PATH, LOGIN_PATH, PageRedirect};
pub use gate::{GateDecision, PUBLIC_PATHS, decide, gate_request, is_public_path};
pub use guard::{
    AdminOnly, AnyRole, ApiAuth, Auth, OptionalSession, RoleConstraint, StaffOnly, require_auth,
    require_role,
};
pub use ip::{HasHeadersAndExtensions, extract_client_ip};
pub use session::{SessionLookup, get_user, lookup_session, verify_token};
pub use state::HasAuthBackend;
