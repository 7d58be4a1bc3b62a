// harvest_store/src/main.rs

use harvest_store::config::AppConfig;
use harvest_store::errors::AppError;
use harvest_store::seed;
use harvest_store::state::AppState;
use harvest_store::store::{postgres, Stores};
use harvest_store::web;

use actix_web::{web as actix_data, App, HttpServer};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

fn init_tracing() {
  let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  let builder = tracing_subscriber::fmt()
    .with_env_filter(env_filter) // RUST_LOG override
    .with_span_events(FmtSpan::CLOSE); // Log when spans close, showing duration

  if std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json")) {
    builder.json().init();
  } else {
    builder.init();
  }
}

fn startup_error(context: &str, err: AppError) -> std::io::Error {
  tracing::error!(error = %err, "{}", context);
  std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", context, err))
}

async fn build_stores(app_config: &AppConfig) -> Result<Stores, AppError> {
  match &app_config.database_url {
    Some(database_url) => {
      let db_pool = PgPool::connect(database_url).await?;
      tracing::info!("Successfully connected to the database.");
      postgres::run_migrations(&db_pool).await?;
      Ok(Stores::postgres(db_pool))
    }
    None => {
      tracing::warn!("DATABASE_URL not set; using in-memory stores. Data is lost on restart.");
      Ok(Stores::in_memory())
    }
  }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  init_tracing();
  tracing::info!("Starting Harvest storefront server...");

  let app_config = AppConfig::from_env()
    .map(Arc::new)
    .map_err(|e| startup_error("Failed to load application configuration.", e))?;

  let stores = build_stores(&app_config)
    .await
    .map_err(|e| startup_error("Failed to initialise storage.", e))?;

  if app_config.seed_db {
    seed::seed_catalog_if_empty(stores.catalog.as_ref())
      .await
      .map_err(|e| startup_error("Failed to seed catalog.", e))?;
  }
  if let Some(admin) = &app_config.admin_bootstrap {
    seed::ensure_admin(stores.users.as_ref(), admin)
      .await
      .map_err(|e| startup_error("Failed to bootstrap admin user.", e))?;
  }

  // Pipelines are registered while building the state.
  let app_state = AppState::new(app_config.clone(), stores);

  let server_address = format!("{}:{}", app_config.server_host, app_config.server_port);
  tracing::info!("Attempting to bind server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone())) // Share AppState with handlers
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(web::configure_app_routes)
  })
  .client_request_timeout(Duration::from_secs(app_config.request_timeout_secs))
  .bind(&server_address)?
  .run()
  .await
}
