// src/services/token_service.rs

//! HS256 bearer tokens.

use crate::config::AppConfig;
use crate::errors::{AppError, Result};
use crate::models::User;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
  pub sub: String,
  pub user_id: i64,
  pub username: String,
  pub is_admin: bool,
  pub iat: i64,
  pub exp: i64,
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
  pub token: String,
  pub expires_at: DateTime<Utc>,
}

#[instrument(name = "token_service::issue", skip(config, user), fields(user_id = user.id), err(Display))]
pub fn issue_token(config: &AppConfig, user: &User) -> Result<IssuedToken> {
  let issued_at = Utc::now();
  let expires_at = issued_at + Duration::hours(config.token_ttl_hours);
  let claims = Claims {
    sub: user.id.to_string(),
    user_id: user.id,
    username: user.username.clone(),
    is_admin: user.is_admin,
    iat: issued_at.timestamp(),
    exp: expires_at.timestamp(),
  };

  let token = encode(
    &Header::new(Algorithm::HS256),
    &claims,
    &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
  )
  .map_err(|e| AppError::Internal(format!("Token encoding failed: {}", e)))?;
  debug!(%expires_at, "Token issued.");
  Ok(IssuedToken { token, expires_at })
}

/// Validates signature and expiry. Every failure is an `Auth` error.
pub fn decode_token(secret: &str, token: &str) -> Result<Claims> {
  let mut validation = Validation::new(Algorithm::HS256);
  validation.validate_exp = true;
  validation.leeway = 0;

  decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
    .map(|data| data.claims)
    .map_err(|e| AppError::Auth(format!("Invalid or expired token: {}", e)))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn user(is_admin: bool) -> User {
    let now = Utc::now();
    User {
      id: 42,
      username: "dana".to_string(),
      password: String::new(),
      address: String::new(),
      pincode: 1,
      phone_number: 1,
      mail: "dana@example.com".to_string(),
      active: true,
      is_admin,
      created_at: now,
      updated_at: now,
    }
  }

  #[test]
  fn issued_token_decodes_with_same_secret() {
    let config = AppConfig::for_memory("unit-test-secret-0123456789");
    let issued = issue_token(&config, &user(true)).unwrap();
    let claims = decode_token(&config.jwt_secret, &issued.token).unwrap();
    assert_eq!(claims.user_id, 42);
    assert!(claims.is_admin);
    assert_eq!(claims.exp, issued.expires_at.timestamp());
  }

  #[test]
  fn wrong_secret_and_expired_tokens_are_rejected() {
    let mut config = AppConfig::for_memory("unit-test-secret-0123456789");
    let issued = issue_token(&config, &user(false)).unwrap();
    assert!(matches!(decode_token("another-secret-9876543210", &issued.token), Err(AppError::Auth(_))));

    config.token_ttl_hours = -1;
    let expired = issue_token(&config, &user(false)).unwrap();
    assert!(matches!(decode_token(&config.jwt_secret, &expired.token), Err(AppError::Auth(_))));
  }
}
