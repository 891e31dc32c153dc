mod common;

use axum::http::StatusCode;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use colegio::db::UserRole;
use common::{
    body_text, create_test_app, create_user, get, location, sample_user, session_cookie_for,
    signed_cookie_with_exp,
};
use std::time::{SystemTime, UNIX_EPOCH};
use tower::ServiceExt;

fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

fn forged_cookie(payload: &str) -> String {
    format!(
        "auth-token={}.{}.{}",
        URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#),
        URL_SAFE_NO_PAD.encode(payload),
        URL_SAFE_NO_PAD.encode("signature")
    )
}

#[tokio::test]
async fn test_public_pages_allowed_without_cookie() {
    let (app, _db) = create_test_app().await;

    for path in ["/login", "/olvide-mi-contrasena", "/registro"] {
        let response = app.clone().oneshot(get(path, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{} should be public", path);
    }
}

#[tokio::test]
async fn test_public_pages_allowed_with_invalid_cookie() {
    let (app, _db) = create_test_app().await;

    for path in ["/login", "/olvide-mi-contrasena", "/registro"] {
        let response = app
            .clone()
            .oneshot(get(path, Some("auth-token=garbage")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{} should be public", path);
    }
}

#[tokio::test]
async fn test_dashboard_without_cookie_redirects_to_login() {
    let (app, _db) = create_test_app().await;

    let response = app.oneshot(get("/dashboard", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), Some("/login"));
}

#[tokio::test]
async fn test_gated_pages_without_cookie_redirect_to_login() {
    let (app, _db) = create_test_app().await;

    for path in ["/", "/dashboard", "/alumnos", "/usuarios"] {
        let response = app.clone().oneshot(get(path, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(location(&response), Some("/login"), "path {}", path);
    }
}

#[tokio::test]
async fn test_expired_payload_redirects_to_login() {
    let (app, _db) = create_test_app().await;
    let cookie = forged_cookie(&format!(r#"{{"exp":{}}}"#, now() - 3600));

    let response = app.oneshot(get("/dashboard", Some(&cookie))).await.unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), Some("/login"));
}

#[tokio::test]
async fn test_signed_token_expired_one_second_ago_redirects_to_login() {
    let (app, _db) = create_test_app().await;
    let issued = now();
    let cookie = signed_cookie_with_exp(&sample_user(UserRole::Admin), issued - 60, issued - 1);

    let response = app.oneshot(get("/dashboard", Some(&cookie))).await.unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), Some("/login"));
}

#[tokio::test]
async fn test_signed_token_expiring_this_second_passes_gate() {
    let (app, _db) = create_test_app().await;
    let user = sample_user(UserRole::Admin);

    // Retry if the clock ticks over between signing and the request.
    for _ in 0..3 {
        let issued = now();
        let cookie = signed_cookie_with_exp(&user, issued - 60, issued);

        let response = app
            .clone()
            .oneshot(get("/dashboard", Some(&cookie)))
            .await
            .unwrap();

        if now() != issued {
            continue;
        }
        assert_eq!(response.status(), StatusCode::OK);
        return;
    }
    panic!("clock kept ticking over during the request");
}

#[tokio::test]
async fn test_wrong_segment_count_redirects_to_login() {
    let (app, _db) = create_test_app().await;

    for cookie in ["auth-token=abc", "auth-token=a.b", "auth-token=a.b.c.d"] {
        let response = app
            .clone()
            .oneshot(get("/dashboard", Some(cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(location(&response), Some("/login"));
    }
}

#[tokio::test]
async fn test_unsigned_future_token_redirects_to_login() {
    let (app, _db) = create_test_app().await;
    let cookie = forged_cookie(&format!(
        r#"{{"sub":1,"email":"x@colegio.test","role":"admin","name":"X","iat":{},"exp":{}}}"#,
        now(),
        now() + 3600
    ));

    let response = app.oneshot(get("/usuarios", Some(&cookie))).await.unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), Some("/login"));
}

#[tokio::test]
async fn test_valid_token_passes_gate() {
    let (app, _db) = create_test_app().await;
    let cookie = session_cookie_for(&sample_user(UserRole::Student));

    let response = app.oneshot(get("/dashboard", Some(&cookie))).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Usuario student"));
}

#[tokio::test]
async fn test_root_redirects_to_dashboard_when_authenticated() {
    let (app, _db) = create_test_app().await;
    let cookie = session_cookie_for(&sample_user(UserRole::Student));

    let response = app.oneshot(get("/", Some(&cookie))).await.unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), Some("/dashboard"));
}

#[tokio::test]
async fn test_teacher_on_admin_page_redirects_to_dashboard() {
    let (app, _db) = create_test_app().await;
    let cookie = session_cookie_for(&sample_user(UserRole::Teacher));

    let response = app.oneshot(get("/usuarios", Some(&cookie))).await.unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), Some("/dashboard"));
}

#[tokio::test]
async fn test_student_on_staff_page_redirects_to_dashboard() {
    let (app, _db) = create_test_app().await;
    let cookie = session_cookie_for(&sample_user(UserRole::Student));

    let response = app.oneshot(get("/alumnos", Some(&cookie))).await.unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), Some("/dashboard"));
}

#[tokio::test]
async fn test_teacher_sees_students() {
    let (app, db) = create_test_app().await;
    create_user(&db, "lucia@colegio.test", "clave", UserRole::Student).await;
    create_user(&db, "ana@colegio.test", "clave", UserRole::Teacher).await;
    let cookie = session_cookie_for(&sample_user(UserRole::Teacher));

    let response = app.oneshot(get("/alumnos", Some(&cookie))).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("lucia@colegio.test"));
    assert!(!html.contains("ana@colegio.test"));
}

#[tokio::test]
async fn test_admin_sees_all_users() {
    let (app, db) = create_test_app().await;
    create_user(&db, "lucia@colegio.test", "clave", UserRole::Student).await;
    create_user(&db, "ana@colegio.test", "clave", UserRole::Teacher).await;
    let cookie = session_cookie_for(&sample_user(UserRole::Admin));

    let response = app.oneshot(get("/usuarios", Some(&cookie))).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("lucia@colegio.test"));
    assert!(html.contains("ana@colegio.test"));
}

#[tokio::test]
async fn test_token_signed_with_other_secret_redirects() {
    let (app, _db) = create_test_app().await;
    let other = colegio::jwt::JwtConfig::new(b"another-secret-entirely-0123456789ab");
    let token = other
        .generate_session_token(&sample_user(UserRole::Admin))
        .unwrap()
        .token;

    let response = app
        .oneshot(get("/dashboard", Some(&format!("auth-token={}", token))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), Some("/login"));
}
