pub mod config;
pub mod db;
pub mod error;
pub mod exercises;
pub mod models;
pub mod one_rep_max;
pub mod plan;
pub mod routes;
pub mod stats;
pub mod store;
pub mod workouts;

#[cfg(test)]
mod test_utils;

use config::AppConfig;
use db::AppState;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
fn init_tracing(level: &str) {
  let filter = std::env::var("RUST_LOG")
    .map_or_else(|_| EnvFilter::new(level), |directive| EnvFilter::new(&directive))
    .add_directive("sqlx=warn".parse().unwrap_or_else(|_| tracing::Level::WARN.into()))
    .add_directive("tower_http=info".parse().unwrap_or_else(|_| tracing::Level::INFO.into()));

  // A subscriber may already be installed when embedded
  let _ = tracing_subscriber::registry()
    .with(filter)
    .with(tracing_subscriber::fmt::layer().with_target(true))
    .try_init();
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(error = %e, "Failed to listen for shutdown signal");
  }
  tracing::info!("Shutting down");
}

/// Load configuration, open the database and serve the API until Ctrl-C
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
  // Load environment variables from .env file
  dotenvy::dotenv().ok();

  let config = AppConfig::from_env()?;
  init_tracing(&config.log_level);

  let pool = db::initialize_db(&config).await?;
  let state = Arc::new(AppState { db: pool });

  let addr = config.bind_addr()?;
  let listener = tokio::net::TcpListener::bind(addr).await?;
  tracing::info!(%addr, "Workout log API listening");

  axum::serve(listener, routes::app(state))
    .with_graceful_shutdown(shutdown_signal())
    .await?;

  Ok(())
}
