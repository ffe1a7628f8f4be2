// src/web/handlers/auth_handlers.rs

use crate::dto::{LoginRequest, SignupRequest};
use crate::errors::AppError;
use crate::services::account_service;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use tracing::instrument;

#[instrument(name = "handler::signup", skip(app_state, req_payload), fields(username = %req_payload.username))]
pub async fn signup_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<SignupRequest>,
) -> Result<HttpResponse, AppError> {
  let saved = account_service::signup(app_state.get_ref(), req_payload.into_inner()).await?;
  Ok(HttpResponse::Created().json(saved))
}

#[instrument(name = "handler::login", skip(app_state, req_payload), fields(username = %req_payload.username))]
pub async fn login_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
  let login = account_service::login(app_state.get_ref(), req_payload.into_inner()).await?;
  Ok(HttpResponse::Ok().json(login))
}
