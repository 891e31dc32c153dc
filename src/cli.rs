//! CLI argument parsing, validation, and startup helpers.

use crate::ServerConfig;
use crate::db::{ConnectionProvider, DATABASE_PATH_ENV, Database, UserRole};
use crate::password::hash_password;
use axum::http::HeaderName;
use clap::Parser;
use tracing::{error, info};
use url::Url;

const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Environment variable holding the password for `--create-admin`.
pub const ADMIN_PASSWORD_ENV: &str = "ADMIN_PASSWORD";

#[derive(clap::ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "colegio", about = "School management server")]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "3000")]
    pub port: u16,

    /// Path to SQLite database file (defaults to colegio.db in the working directory)
    #[arg(short, long, env = DATABASE_PATH_ENV)]
    pub database: Option<String>,

    /// Public origin of the server (full URL). HTTPS origins get Secure cookies
    #[arg(long, default_value = "http://localhost:3000")]
    pub origin: String,

    /// Path to file containing JWT secret. Prefer using JWT_SECRET env var instead
    #[arg(long)]
    pub jwt_secret_file: Option<String>,

    /// Header carrying the client IP when running behind a reverse proxy (e.g. X-Real-IP)
    #[arg(long, value_parser = parse_header_name)]
    pub ip_header: Option<HeaderName>,

    /// Create an admin user with this email on startup (password read from ADMIN_PASSWORD)
    #[arg(long, value_name = "EMAIL")]
    pub create_admin: Option<String>,

    /// Display name for the admin created with --create-admin
    #[arg(long, default_value = "Administración")]
    pub admin_name: String,

    /// Log output format
    #[arg(short, long, default_value = "pretty")]
    pub log_format: LogFormat,
}

fn parse_header_name(s: &str) -> Result<HeaderName, String> {
    HeaderName::try_from(s).map_err(|e| format!("Invalid header name '{}': {}", s, e))
}

/// Initialize logging based on the specified format.
pub fn init_logging(format: &LogFormat) {
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt::init(),
        LogFormat::Json => tracing_subscriber::fmt().json().init(),
        LogFormat::Compact => tracing_subscriber::fmt().compact().init(),
    }
}

/// Load JWT secret from environment variable or file.
/// Returns None and logs an error if the secret cannot be loaded.
pub fn load_jwt_secret(jwt_secret_file: Option<&str>) -> Option<String> {
    let secret = if let Ok(secret) = std::env::var("JWT_SECRET") {
        // Clear the environment variable to prevent leaking
        // SAFETY: We're single-threaded at this point during startup,
        // and no other code is reading this environment variable.
        unsafe { std::env::remove_var("JWT_SECRET") };
        secret.trim().to_string()
    } else if let Some(path) = jwt_secret_file {
        match std::fs::read_to_string(path) {
            Ok(content) => content.trim().to_string(),
            Err(e) => {
                error!(path = %path, error = %e, "Failed to read JWT secret file");
                return None;
            }
        }
    } else {
        error!(
            "JWT secret is required. Set JWT_SECRET environment variable (recommended) or use --jwt-secret-file"
        );
        return None;
    };

    if secret.len() < MIN_JWT_SECRET_LENGTH {
        error!(
            "JWT secret is shorter than {} characters. Use a longer secret",
            MIN_JWT_SECRET_LENGTH
        );
        return None;
    }

    Some(secret)
}

/// Parse and validate the public origin URL.
/// Returns None and logs an error if validation fails.
pub fn validate_origin(origin: &str) -> Option<Url> {
    let url = match Url::parse(origin) {
        Ok(url) => url,
        Err(e) => {
            error!(origin = %origin, error = %e, "Invalid origin URL");
            return None;
        }
    };

    let is_https = url.scheme() == "https";
    let is_localhost = url.host_str() == Some("localhost");

    if !is_https && !is_localhost {
        error!("origin must use HTTPS for non-localhost deployments");
        return None;
    }

    Some(url)
}

/// Open the database through the provider, logging errors if it fails.
pub async fn open_database(provider: &ConnectionProvider) -> Option<Database> {
    match provider.get_connection().await {
        Ok(db) => Some(db.clone()),
        Err(e) => {
            error!(path = %provider.path(), error = %e, "Failed to open database");
            None
        }
    }
}

/// Handle the --create-admin flag: create the admin unless the email is already registered.
/// `ADMIN_PASSWORD` is removed from the environment whatever the outcome.
/// Returns false and logs an error if the admin could not be created.
pub async fn handle_create_admin(db: &Database, email: &str, name: &str) -> bool {
    let password = std::env::var(ADMIN_PASSWORD_ENV).ok();
    // SAFETY: Still single-threaded startup, same as JWT_SECRET above.
    unsafe { std::env::remove_var(ADMIN_PASSWORD_ENV) };

    create_admin(db, email, name, password.as_deref()).await
}

async fn create_admin(db: &Database, email: &str, name: &str, password: Option<&str>) -> bool {
    match db.users().get_by_email(email).await {
        Ok(Some(existing)) => {
            info!(email = %existing.email, role = %existing.role, "User already exists, not creating admin");
            true
        }
        Ok(None) => {
            let Some(password) = password.filter(|p| !p.is_empty()) else {
                error!("{} is required with --create-admin", ADMIN_PASSWORD_ENV);
                return false;
            };

            let hash = match hash_password(password) {
                Ok(hash) => hash,
                Err(e) => {
                    error!(error = %e, "Failed to hash admin password");
                    return false;
                }
            };

            match db.users().create(email, &hash, name, UserRole::Admin).await {
                Ok(id) => {
                    info!(user_id = id, email = %email, "Admin user created");
                    true
                }
                Err(e) => {
                    error!(error = %e, "Failed to create admin user");
                    false
                }
            }
        }
        Err(e) => {
            error!(error = %e, "Failed to check for existing user");
            false
        }
    }
}

/// Build ServerConfig from validated arguments.
pub fn build_config(
    db: Database,
    origin: &Url,
    jwt_secret: String,
    ip_header: Option<HeaderName>,
) -> ServerConfig {
    let secure_cookies = origin.scheme() == "https";

    ServerConfig {
        db,
        jwt_secret: jwt_secret.into_bytes(),
        secure_cookies,
        ip_header,
    }
}
