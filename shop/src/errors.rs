// src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use ecart_flow::FlowError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Authentication Failed: {0}")]
  Auth(String),

  #[error("Forbidden: {0}")]
  Forbidden(String),

  #[error("Account is blocked: user {user_id}")]
  AccountBlocked { user_id: i64 },

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Conflict: {0}")]
  Conflict(String),

  #[error("Insufficient stock for brand {brand_id}: requested {requested}, available {available}")]
  InsufficientStock { brand_id: i64, requested: i64, available: i64 },

  #[error("Cart is empty")]
  CartEmpty,

  #[error("Transaction failed: {0}")]
  TransactionFailure(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Workflow Error: {source}")]
  Workflow {
    #[from]
    source: FlowError,
  },

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl AppError {
  /// Stable machine-readable code sent to clients.
  pub fn code(&self) -> &'static str {
    match self {
      AppError::Validation(_) => "VALIDATION_ERROR",
      AppError::Auth(_) => "UNAUTHORIZED",
      AppError::Forbidden(_) => "FORBIDDEN",
      AppError::AccountBlocked { .. } => "ACCOUNT_BLOCKED",
      AppError::NotFound(_) => "NOT_FOUND",
      AppError::Conflict(_) => "CONFLICT",
      AppError::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
      AppError::CartEmpty => "CART_EMPTY",
      AppError::TransactionFailure(_) => "TRANSACTION_FAILURE",
      AppError::Config(_) => "CONFIG_ERROR",
      AppError::Sqlx(_) => "DATABASE_ERROR",
      AppError::Workflow { .. } => "WORKFLOW_ERROR",
      AppError::Internal(_) => "INTERNAL_ERROR",
    }
  }

  /// Wraps a store failure raised inside the checkout transaction. Domain
  /// errors pass through untouched.
  pub fn into_transaction_failure(self) -> AppError {
    match self {
      AppError::Sqlx(e) => AppError::TransactionFailure(e.to_string()),
      AppError::Internal(m) => AppError::TransactionFailure(m),
      other => other,
    }
  }

  fn client_message(&self) -> String {
    match self {
      AppError::Sqlx(_) => "Database operation failed".to_string(),
      AppError::Workflow { .. } => "Workflow processing error".to_string(),
      AppError::Internal(_) | AppError::Config(_) => "An internal error occurred".to_string(),
      AppError::TransactionFailure(_) => "The order could not be completed".to_string(),
      other => other.to_string(),
    }
  }

  fn detail(&self) -> Option<serde_json::Value> {
    match self {
      AppError::InsufficientStock {
        brand_id,
        requested,
        available,
      } => Some(json!({ "brandId": brand_id, "requested": requested, "available": available })),
      AppError::AccountBlocked { user_id } => Some(json!({ "userId": user_id })),
      _ => None,
    }
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) => StatusCode::BAD_REQUEST,
      AppError::Auth(_) => StatusCode::UNAUTHORIZED,
      AppError::Forbidden(_) | AppError::AccountBlocked { .. } => StatusCode::FORBIDDEN,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::Conflict(_) | AppError::InsufficientStock { .. } => StatusCode::CONFLICT,
      AppError::CartEmpty => StatusCode::UNPROCESSABLE_ENTITY,
      AppError::TransactionFailure(_)
      | AppError::Config(_)
      | AppError::Sqlx(_)
      | AppError::Workflow { .. }
      | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    if status.is_server_error() {
      tracing::error!(application_error = %self, code = self.code(), "Responding with error");
    } else {
      tracing::warn!(application_error = %self, code = self.code(), "Responding with error");
    }

    let mut body = json!({ "code": self.code(), "message": self.client_message() });
    if let Some(detail) = self.detail() {
      body["detail"] = detail;
    }
    HttpResponse::build(status).json(body)
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;

/// Maps a unique-constraint violation to `Conflict`, everything else to `Sqlx`.
pub(crate) fn map_unique_violation(err: sqlx::Error, message: impl Into<String>) -> AppError {
  match &err {
    sqlx::Error::Database(db_err) if db_err.is_unique_violation() => AppError::Conflict(message.into()),
    _ => AppError::Sqlx(err),
  }
}

/// Maps a numeric overflow (SQLSTATE 22003) to `Validation`, everything else to `Sqlx`.
pub(crate) fn map_out_of_range(err: sqlx::Error, message: impl Into<String>) -> AppError {
  match &err {
    sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("22003") => AppError::Validation(message.into()),
    _ => AppError::Sqlx(err),
  }
}
