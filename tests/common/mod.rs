#![allow(dead_code)]

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{Request, Response},
};
use colegio::{
    ServerConfig, create_app,
    db::{Database, UserRole},
    jwt::{JwtConfig, SessionClaims, SessionUser},
    password::hash_password,
};
use std::net::SocketAddr;

pub const TEST_JWT_SECRET: &[u8] = b"test-jwt-secret-for-testing-0123456789";

pub fn test_config(db: Database) -> ServerConfig {
    ServerConfig {
        db,
        jwt_secret: TEST_JWT_SECRET.to_vec(),
        secure_cookies: false,
        ip_header: None,
    }
}

pub async fn create_test_app() -> (axum::Router, Database) {
    let db = Database::open(":memory:")
        .await
        .expect("Failed to open test database");
    (create_app(&test_config(db.clone())), db)
}

pub fn create_jwt() -> JwtConfig {
    JwtConfig::new(TEST_JWT_SECRET)
}

/// Insert a user and return its session identity.
pub async fn create_user(
    db: &Database,
    email: &str,
    password: &str,
    role: UserRole,
) -> SessionUser {
    let hash = hash_password(password).expect("Failed to hash password");
    let name = email.split('@').next().unwrap_or(email).to_string();
    let id = db
        .users()
        .create(email, &hash, &name, role)
        .await
        .expect("Failed to create user");
    SessionUser {
        id,
        email: email.to_string(),
        role,
        name,
    }
}

/// Cookie header value holding a valid session token for `user`.
pub fn session_cookie_for(user: &SessionUser) -> String {
    let token = create_jwt()
        .generate_session_token(user)
        .expect("Failed to generate token");
    format!("auth-token={}", token.token)
}

/// Cookie header value holding a correctly signed token with explicit timestamps.
pub fn signed_cookie_with_exp(user: &SessionUser, iat: u64, exp: u64) -> String {
    let claims = SessionClaims {
        sub: user.id,
        email: user.email.clone(),
        role: user.role,
        name: user.name.clone(),
        iat,
        exp,
    };
    let token = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(TEST_JWT_SECRET),
    )
    .expect("Failed to sign token");
    format!("auth-token={}", token)
}

pub fn sample_user(role: UserRole) -> SessionUser {
    SessionUser {
        id: 1,
        email: format!("{}@colegio.test", role),
        role,
        name: format!("Usuario {}", role),
    }
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header("cookie", cookie);
    }
    builder.body(Body::empty()).unwrap()
}

/// JSON POST carrying a client address, as the server's connect-info layer would.
pub fn post_json(uri: &str, body: &str, client: [u8; 4]) -> Request<Body> {
    let mut request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    request
        .extensions_mut()
        .insert(ConnectInfo(SocketAddr::from((client, 50000))));
    request
}

pub fn location(response: &Response<Body>) -> Option<&str> {
    response
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}
