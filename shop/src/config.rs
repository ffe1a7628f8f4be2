// src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
  Postgres,
  Memory,
}

impl FromStr for StorageBackend {
  type Err = AppError;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
      "memory" => Ok(StorageBackend::Memory),
      other => Err(AppError::Config(format!("Unknown STORAGE_BACKEND '{}'", other))),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
  Pretty,
  Json,
}

/// Credentials for the admin account created at startup.
#[derive(Clone)]
pub struct AdminSeed {
  pub username: String,
  pub password: String,
  pub mail: String,
}

impl std::fmt::Debug for AdminSeed {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("AdminSeed")
      .field("username", &self.username)
      .field("mail", &self.mail)
      .finish_non_exhaustive()
  }
}

#[derive(Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub storage: StorageBackend,
  pub database_url: Option<String>,
  pub database_max_connections: u32,
  pub run_migrations: bool,
  pub jwt_secret: String,
  pub token_ttl_hours: i64,
  pub admin_seed: Option<AdminSeed>,
  pub log_format: LogFormat,
}

impl std::fmt::Debug for AppConfig {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("AppConfig")
      .field("server_host", &self.server_host)
      .field("server_port", &self.server_port)
      .field("storage", &self.storage)
      .field("database_max_connections", &self.database_max_connections)
      .field("run_migrations", &self.run_migrations)
      .field("token_ttl_hours", &self.token_ttl_hours)
      .field("admin_seed", &self.admin_seed)
      .field("log_format", &self.log_format)
      .finish_non_exhaustive()
  }
}

fn parse_var<T: FromStr>(name: &str, raw: String) -> Result<T>
where
  T::Err: std::fmt::Display,
{
  raw
    .parse::<T>()
    .map_err(|e| AppError::Config(format!("Invalid {} value '{}': {}", name, raw, e)))
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok();

    let get_env = |var_name: &str| {
      env::var(var_name).map_err(|e| AppError::Config(format!("Missing environment variable '{}': {}", var_name, e)))
    };

    let server_host = get_env("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let server_port = parse_var("SERVER_PORT", get_env("SERVER_PORT").unwrap_or_else(|_| "8080".to_string()))?;
    let storage: StorageBackend = get_env("STORAGE_BACKEND")
      .unwrap_or_else(|_| "postgres".to_string())
      .parse()?;
    let database_url = match storage {
      StorageBackend::Postgres => Some(get_env("DATABASE_URL")?),
      StorageBackend::Memory => get_env("DATABASE_URL").ok(),
    };
    let database_max_connections = parse_var(
      "DATABASE_MAX_CONNECTIONS",
      get_env("DATABASE_MAX_CONNECTIONS").unwrap_or_else(|_| "10".to_string()),
    )?;
    let run_migrations = parse_var(
      "RUN_MIGRATIONS",
      get_env("RUN_MIGRATIONS").unwrap_or_else(|_| "false".to_string()),
    )?;

    let jwt_secret = get_env("JWT_SECRET")?;
    if jwt_secret.len() < 16 {
      return Err(AppError::Config("JWT_SECRET must be at least 16 bytes".to_string()));
    }
    let token_ttl_hours: i64 = parse_var(
      "TOKEN_TTL_HOURS",
      get_env("TOKEN_TTL_HOURS").unwrap_or_else(|_| "3".to_string()),
    )?;
    if token_ttl_hours <= 0 {
      return Err(AppError::Config("TOKEN_TTL_HOURS must be positive".to_string()));
    }

    let admin_seed = match (get_env("ADMIN_USERNAME"), get_env("ADMIN_PASSWORD")) {
      (Ok(username), Ok(password)) => Some(AdminSeed {
        mail: get_env("ADMIN_MAIL").unwrap_or_else(|_| format!("{}@localhost", username)),
        username,
        password,
      }),
      _ => None,
    };

    let log_format = match get_env("LOG_FORMAT").unwrap_or_default().to_ascii_lowercase().as_str() {
      "json" => LogFormat::Json,
      _ => LogFormat::Pretty,
    };

    Ok(Self {
      server_host,
      server_port,
      storage,
      database_url,
      database_max_connections,
      run_migrations,
      jwt_secret,
      token_ttl_hours,
      admin_seed,
      log_format,
    })
  }

  /// In-memory configuration for tests and local experiments.
  pub fn for_memory(jwt_secret: impl Into<String>) -> Self {
    Self {
      server_host: "127.0.0.1".to_string(),
      server_port: 0,
      storage: StorageBackend::Memory,
      database_url: None,
      database_max_connections: 1,
      run_migrations: false,
      jwt_secret: jwt_secret.into(),
      token_ttl_hours: 3,
      admin_seed: None,
      log_format: LogFormat::Pretty,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn storage_backend_parses_known_values() {
    assert_eq!("Postgres".parse::<StorageBackend>().unwrap(), StorageBackend::Postgres);
    assert_eq!(" memory ".parse::<StorageBackend>().unwrap(), StorageBackend::Memory);
    assert!(matches!("sqlite".parse::<StorageBackend>(), Err(AppError::Config(_))));
  }

  #[test]
  fn debug_output_hides_secrets() {
    let mut config = AppConfig::for_memory("a-very-secret-signing-key");
    config.admin_seed = Some(AdminSeed {
      username: "root".to_string(),
      password: "hunter22hunter22".to_string(),
      mail: "root@localhost".to_string(),
    });
    let rendered = format!("{:?}", config);
    assert!(!rendered.contains("a-very-secret-signing-key"));
    assert!(!rendered.contains("hunter22"));
    assert!(rendered.contains("root"));
  }
}
