// src/main.rs

use anyhow::Context;
use actix_web::{web as actix_data, App, HttpServer};
use ecart::config::{AppConfig, LogFormat, StorageBackend};
use ecart::services::account_service;
use ecart::state::AppState;
use ecart::store::Repositories;
use ecart::web::routes::configure_app_routes;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

fn init_tracing(format: LogFormat) {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  let builder = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_span_events(FmtSpan::CLOSE);
  match format {
    LogFormat::Json => builder.json().init(),
    LogFormat::Pretty => builder.init(),
  }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
  let app_config = AppConfig::from_env().context("Failed to load application configuration")?;
  init_tracing(app_config.log_format);
  tracing::info!(config = ?app_config, "Starting ecart server...");

  let repos = match app_config.storage {
    StorageBackend::Postgres => {
      let database_url = app_config
        .database_url
        .as_deref()
        .context("DATABASE_URL is required for the postgres backend")?;
      let pool = PgPoolOptions::new()
        .max_connections(app_config.database_max_connections)
        .connect(database_url)
        .await
        .context("Failed to connect to the database")?;
      tracing::info!("Connected to the database.");

      if app_config.run_migrations {
        sqlx::migrate!("./migrations")
          .run(&pool)
          .await
          .context("Failed to run database migrations")?;
        tracing::info!("Database migrations applied.");
      }
      Repositories::postgres(pool)
    }
    StorageBackend::Memory => {
      tracing::warn!("Using the in-memory store; data is lost on shutdown.");
      Repositories::in_memory()
    }
  };

  if let Some(seed) = &app_config.admin_seed {
    let created = account_service::ensure_admin(&repos, seed)
      .await
      .context("Failed to create the admin account")?;
    tracing::info!(created, "Admin account checked.");
  }

  let server_address = format!("{}:{}", app_config.server_host, app_config.server_port);
  let app_state = AppState::new(repos, app_config);

  tracing::info!("Binding server to {}...", server_address);
  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(configure_app_routes)
  })
  .bind(&server_address)
  .with_context(|| format!("Failed to bind {}", server_address))?
  .run()
  .await
  .context("Server terminated with an error")
}
