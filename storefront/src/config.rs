// harvest_store/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

const MIN_JWT_SECRET_LEN: usize = 16;
const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365 * 10;

/// Administrator created at startup when no user with `email` exists yet.
#[derive(Debug, Clone)]
pub struct AdminBootstrap {
  pub name: String,
  pub email: String,
  pub password: String,
}

#[derive(Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  /// `None` runs the service on the in-memory stores.
  pub database_url: Option<String>,
  /// Prefix used to turn stored image filenames into URLs.
  pub public_base_url: String,
  pub jwt_secret: String,
  pub token_ttl_hours: i64,
  pub max_units_per_product: i64,
  pub request_timeout_secs: u64,
  pub seed_db: bool,
  pub admin_bootstrap: Option<AdminBootstrap>,
}

// Hand-written so secrets never end up in logs.
impl std::fmt::Debug for AppConfig {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("AppConfig")
      .field("server_host", &self.server_host)
      .field("server_port", &self.server_port)
      .field("database_url", &self.database_url.as_ref().map(|_| "[REDACTED]"))
      .field("public_base_url", &self.public_base_url)
      .field("jwt_secret", &"[REDACTED]")
      .field("token_ttl_hours", &self.token_ttl_hours)
      .field("max_units_per_product", &self.max_units_per_product)
      .field("request_timeout_secs", &self.request_timeout_secs)
      .field("seed_db", &self.seed_db)
      .field("admin_email", &self.admin_bootstrap.as_ref().map(|a| a.email.as_str()))
      .finish()
  }
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present
    let config = Self::from_lookup(|var_name| env::var(var_name).ok())?;
    tracing::info!("Application configuration loaded successfully.");
    tracing::debug!(config = ?config, "Loaded config details");
    Ok(config)
  }

  /// Builds the config from any key lookup; `from_env` passes the process environment.
  pub fn from_lookup<F>(lookup: F) -> Result<Self>
  where
    F: Fn(&str) -> Option<String>,
  {
    let get_env = |var_name: &str| lookup(var_name).filter(|v| !v.trim().is_empty());

    let server_host = get_env("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
    let server_port = parse_or(get_env("SERVER_PORT"), "SERVER_PORT", 5000u16)?;
    let database_url = get_env("DATABASE_URL");
    let public_base_url = get_env("PUBLIC_BASE_URL")
      .unwrap_or_else(|| format!("http://{}:{}", server_host, server_port))
      .trim_end_matches('/')
      .to_string();

    let jwt_secret = get_env("JWT_SECRET")
      .ok_or_else(|| AppError::Config("Missing environment variable 'JWT_SECRET'".to_string()))?;
    if jwt_secret.len() < MIN_JWT_SECRET_LEN {
      return Err(AppError::Config(format!(
        "JWT_SECRET must be at least {} bytes long",
        MIN_JWT_SECRET_LEN
      )));
    }

    let token_ttl_hours = parse_or(get_env("TOKEN_TTL_HOURS"), "TOKEN_TTL_HOURS", 720i64)?;
    if !(1..=MAX_TOKEN_TTL_HOURS).contains(&token_ttl_hours) {
      return Err(AppError::Config(format!(
        "TOKEN_TTL_HOURS must be between 1 and {}",
        MAX_TOKEN_TTL_HOURS
      )));
    }
    let max_units_per_product = parse_or(get_env("MAX_UNITS_PER_PRODUCT"), "MAX_UNITS_PER_PRODUCT", 10i64)?;
    if max_units_per_product <= 0 {
      return Err(AppError::Config("MAX_UNITS_PER_PRODUCT must be positive".to_string()));
    }
    let request_timeout_secs = parse_or(get_env("REQUEST_TIMEOUT_SECS"), "REQUEST_TIMEOUT_SECS", 30u64)?;
    let seed_db = parse_or(get_env("SEED_DB"), "SEED_DB", false)?;

    let admin_bootstrap = match (get_env("ADMIN_EMAIL"), get_env("ADMIN_PASSWORD")) {
      (Some(email), Some(password)) => Some(AdminBootstrap {
        name: get_env("ADMIN_NAME").unwrap_or_else(|| "Admin User".to_string()),
        email,
        password,
      }),
      (None, None) => None,
      _ => {
        return Err(AppError::Config(
          "ADMIN_EMAIL and ADMIN_PASSWORD must be set together".to_string(),
        ))
      }
    };

    Ok(Self {
      server_host,
      server_port,
      database_url,
      public_base_url,
      jwt_secret,
      token_ttl_hours,
      max_units_per_product,
      request_timeout_secs,
      seed_db,
      admin_bootstrap,
    })
  }
}

fn parse_or<T>(raw: Option<String>, var_name: &str, default: T) -> Result<T>
where
  T: FromStr,
  T::Err: std::fmt::Display,
{
  match raw {
    Some(value) => value
      .trim()
      .parse::<T>()
      .map_err(|e| AppError::Config(format!("Invalid {} value '{}': {}", var_name, value, e))),
    None => Ok(default),
  }
}
