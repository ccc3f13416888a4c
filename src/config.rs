use std::env;
use std::net::SocketAddr;
use std::str::FromStr;

/// ---------------------------------------------------------------------------
/// Configuration Defaults
/// ---------------------------------------------------------------------------

const DEFAULT_DATABASE_URL: &str = "sqlite://workout-log.db?mode=rwc";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 5001;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("Invalid value for {key}: {value}")]
  Invalid { key: String, value: String },
}

/// Runtime settings, read from the environment (and `.env` when present)
#[derive(Debug, Clone)]
pub struct AppConfig {
  pub database_url: String,
  pub host: String,
  pub port: u16,
  pub max_connections: u32,
  pub log_level: String,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      database_url: DEFAULT_DATABASE_URL.to_string(),
      host: DEFAULT_HOST.to_string(),
      port: DEFAULT_PORT,
      max_connections: DEFAULT_MAX_CONNECTIONS,
      log_level: DEFAULT_LOG_LEVEL.to_string(),
    }
  }
}

impl AppConfig {
  pub fn from_env() -> Result<Self, ConfigError> {
    Ok(Self {
      database_url: env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
      host: env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string()),
      port: parse_var("PORT", DEFAULT_PORT)?,
      max_connections: parse_var("DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?,
      log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string()),
    })
  }

  pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
    let addr = format!("{}:{}", self.host, self.port);
    addr.parse().map_err(|_| ConfigError::Invalid {
      key: "HOST".into(),
      value: addr,
    })
  }
}

fn parse_var<T: FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
  match env::var(key) {
    Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
      key: key.to_string(),
      value: raw,
    }),
    Err(_) => Ok(default),
  }
}
