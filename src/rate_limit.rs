//! Rate limiting for the login endpoint.
//!
//! Uses a token bucket algorithm with per-IP tracking to prevent brute force attacks.

use axum::{
    extract::{Request, State},
    http::{HeaderName, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{Quota, RateLimiter, clock::DefaultClock, state::keyed::DefaultKeyedStateStore};
use std::{num::NonZeroU32, sync::Arc, time::Duration};
use tracing::{debug, warn};

use crate::auth::extract_client_ip;

/// Per-IP rate limiter.
pub type IpLimiter = RateLimiter<String, DefaultKeyedStateStore<String>, DefaultClock>;

const LOGIN_PER_SEC: NonZeroU32 = NonZeroU32::new(1).unwrap();
const LOGIN_BURST: NonZeroU32 = NonZeroU32::new(5).unwrap();

/// Interval between sweeps of idle per-IP limiter state.
const LIMITER_CLEANUP_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Rate limiting configuration for authentication endpoints.
#[derive(Clone)]
pub struct RateLimitConfig {
    /// Per-IP limiter for login attempts (5 requests burst, 1 per second sustained)
    pub login: Arc<IpLimiter>,
    /// Header carrying the client IP when running behind a proxy
    pub ip_header: Option<HeaderName>,
}

impl RateLimitConfig {
    /// Create rate limiters with the default login quota.
    pub fn new(ip_header: Option<HeaderName>) -> Self {
        Self::with_login_quota(ip_header, LOGIN_PER_SEC, LOGIN_BURST)
    }

    pub fn with_login_quota(
        ip_header: Option<HeaderName>,
        per_second: NonZeroU32,
        burst: NonZeroU32,
    ) -> Self {
        Self {
            login: Arc::new(RateLimiter::keyed(
                Quota::per_second(per_second).allow_burst(burst),
            )),
            ip_header,
        }
    }
}

impl RateLimitConfig {
    /// Drop per-IP state that has fully replenished. Such clients are
    /// indistinguishable from ones never seen. Returns the number of IPs still tracked.
    pub fn retain_recent(&self) -> usize {
        self.login.retain_recent();
        self.login.shrink_to_fit();
        self.login.len()
    }
}

/// Spawn a background task that periodically evicts idle limiter state.
/// Returns a handle that can be used to abort the task.
pub fn spawn_limiter_cleanup(config: Arc<RateLimitConfig>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(LIMITER_CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            let tracked = config.retain_recent();
            debug!(tracked, "Swept login rate limiter");
        }
    })
}

/// Middleware for rate limiting login attempts.
pub async fn rate_limit_login(
    State(config): State<Arc<RateLimitConfig>>,
    request: Request,
    next: Next,
) -> Response {
    let ip = match extract_client_ip(&request, config.ip_header.as_ref()) {
        Ok(ip) => ip,
        Err(reason) => {
            warn!(reason, "Unable to determine client IP for login");
            return (StatusCode::FORBIDDEN, "Unable to determine client IP.").into_response();
        }
    };

    match config.login.check_key(&ip) {
        Ok(_) => next.run(request).await,
        Err(_) => {
            warn!(ip = %ip, "Login rate limit exceeded");
            (
                StatusCode::TOO_MANY_REQUESTS,
                "Too many login attempts. Please wait before trying again.",
            )
                .into_response()
        }
    }
}
