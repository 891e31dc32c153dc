//! Page routes. All of them sit behind the request gate; the markup is a bare
//! shell around the data each page shows.

use axum::{
    Router,
    extract::State,
    middleware,
    response::{Html, IntoResponse, Redirect},
    routing::get,
};
use std::fmt::Write;
use std::sync::Arc;

use crate::api::{ApiError, ResultExt};
use crate::auth::{AdminOnly, AnyRole, Auth, DASHBOARD_PATH, StaffOnly, gate_request};
use crate::db::{Database, UserRole, UserSummary};
use crate::impl_has_auth_backend;
use crate::jwt::JwtConfig;

#[derive(Clone)]
pub struct PagesState {
    pub db: Database,
    pub jwt: Arc<JwtConfig>,
}

impl_has_auth_backend!(PagesState);

/// Page router wrapped in the request gate.
pub fn router(state: PagesState) -> Router {
    let jwt = state.jwt.clone();

    Router::new()
        .route("/", get(Redirect::temporary(DASHBOARD_PATH)))
        .route("/login", get(login_page))
        .route("/olvide-mi-contrasena", get(forgot_password_page))
        .route("/registro", get(register_page))
        .route("/dashboard", get(dashboard_page))
        .route("/alumnos", get(students_page))
        .route("/usuarios", get(users_page))
        .with_state(state)
        .layer(middleware::from_fn_with_state(jwt, gate_request))
}

/// Escape text for inclusion in HTML.
fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn page(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!doctype html>\n<html lang=\"es\"><head><meta charset=\"utf-8\"><title>{} - Colegio</title></head><body>{}</body></html>",
        escape_html(title),
        body
    ))
}

fn users_table(users: &[UserSummary]) -> String {
    let mut html = String::from("<table><thead><tr><th>Nombre</th><th>Email</th><th>Rol</th></tr></thead><tbody>");
    for user in users {
        let _ = write!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape_html(&user.name),
            escape_html(&user.email),
            user.role
        );
    }
    html.push_str("</tbody></table>");
    html
}

async fn login_page() -> Html<String> {
    page(
        "Iniciar sesión",
        "<h1>Iniciar sesión</h1><form id=\"login-form\" data-action=\"/api/auth/login\">\
         <input name=\"email\" type=\"email\"><input name=\"password\" type=\"password\">\
         <button type=\"submit\">Entrar</button></form>\
         <a href=\"/olvide-mi-contrasena\">¿Olvidaste tu contraseña?</a> <a href=\"/registro\">Registro</a>",
    )
}

async fn forgot_password_page() -> Html<String> {
    page(
        "Recuperar contraseña",
        "<h1>Recuperar contraseña</h1><p>Contacta con la secretaría del colegio.</p><a href=\"/login\">Volver</a>",
    )
}

async fn register_page() -> Html<String> {
    page(
        "Registro",
        "<h1>Registro</h1><p>Las cuentas las crea la administración del colegio.</p><a href=\"/login\">Volver</a>",
    )
}

async fn dashboard_page(auth: Auth<AnyRole>) -> Html<String> {
    let user = auth.user;
    let mut links = String::new();
    if matches!(user.role, UserRole::Admin | UserRole::Teacher) {
        links.push_str("<li><a href=\"/alumnos\">Alumnos</a></li>");
    }
    if user.role == UserRole::Admin {
        links.push_str("<li><a href=\"/usuarios\">Usuarios</a></li>");
    }

    page(
        "Panel",
        &format!(
            "<h1>Hola, {}</h1><p id=\"role\">{}</p><ul>{}</ul>",
            escape_html(&user.name),
            user.role,
            links
        ),
    )
}

async fn students_page(
    State(state): State<PagesState>,
    _auth: Auth<StaffOnly>,
) -> Result<impl IntoResponse, ApiError> {
    let students = state
        .db
        .users()
        .list_by_role(UserRole::Student)
        .await
        .db_err("Failed to list students")?;

    Ok(page(
        "Alumnos",
        &format!("<h1>Alumnos</h1>{}", users_table(&students)),
    ))
}

async fn users_page(
    State(state): State<PagesState>,
    _auth: Auth<AdminOnly>,
) -> Result<impl IntoResponse, ApiError> {
    let users = state.db.users().list().await.db_err("Failed to list users")?;

    Ok(page(
        "Usuarios",
        &format!("<h1>Usuarios</h1>{}", users_table(&users)),
    ))
}
