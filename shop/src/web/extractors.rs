// src/web/extractors.rs

//! Bearer-token identities for handlers.

use crate::errors::AppError;
use crate::services::token_service::{self, Claims};
use crate::state::AppState;
use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use tracing::warn;

/// Caller identity decoded from `Authorization: Bearer <jwt>`.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
  pub user_id: i64,
  pub username: String,
  pub is_admin: bool,
}

impl From<Claims> for AuthenticatedUser {
  fn from(claims: Claims) -> Self {
    Self {
      user_id: claims.user_id,
      username: claims.username,
      is_admin: claims.is_admin,
    }
  }
}

fn bearer_token(req: &HttpRequest) -> Result<&str, AppError> {
  let value = req
    .headers()
    .get(header::AUTHORIZATION)
    .ok_or_else(|| AppError::Auth("Missing Authorization header.".to_string()))?
    .to_str()
    .map_err(|_| AppError::Auth("Malformed Authorization header.".to_string()))?;

  value
    .strip_prefix("Bearer ")
    .map(str::trim)
    .filter(|token| !token.is_empty())
    .ok_or_else(|| AppError::Auth("Expected a Bearer token.".to_string()))
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, AppError> {
  let state = req
    .app_data::<web::Data<AppState>>()
    .ok_or_else(|| AppError::Internal("Application state is not configured".to_string()))?;
  let token = bearer_token(req)?;
  let claims = token_service::decode_token(&state.config.jwt_secret, token).map_err(|err| {
    warn!(error = %err, path = %req.path(), "Rejected bearer token.");
    err
  })?;
  Ok(AuthenticatedUser::from(claims))
}

impl FromRequest for AuthenticatedUser {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    ready(authenticate(req))
  }
}

/// An authenticated caller whose token carries the admin flag.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthenticatedUser);

impl FromRequest for AdminUser {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let result = authenticate(req).and_then(|user| {
      if user.is_admin {
        Ok(AdminUser(user))
      } else {
        warn!(user_id = user.user_id, path = %req.path(), "Non-admin called an admin route.");
        Err(AppError::Forbidden("Admin access required.".to_string()))
      }
    });
    ready(result)
  }
}

impl std::ops::Deref for AdminUser {
  type Target = AuthenticatedUser;

  fn deref(&self) -> &Self::Target {
    &self.0
  }
}
