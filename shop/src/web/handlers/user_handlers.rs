// src/web/handlers/user_handlers.rs

use crate::dto::{ChangePasswordRequest, FavoriteRequest, MessageResponse};
use crate::errors::AppError;
use crate::models::ProfilePatch;
use crate::services::{account_service, favorite_service, order_service};
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;
use actix_web::{web, HttpResponse};
use tracing::instrument;

#[instrument(name = "handler::get_profile", skip(app_state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn get_profile_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let profile = account_service::get_profile(app_state.get_ref(), auth_user.user_id).await?;
  Ok(HttpResponse::Ok().json(profile))
}

#[instrument(name = "handler::update_profile", skip(app_state, auth_user, req_payload), fields(user_id = auth_user.user_id))]
pub async fn update_profile_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  req_payload: web::Json<ProfilePatch>,
) -> Result<HttpResponse, AppError> {
  let profile = account_service::update_profile(app_state.get_ref(), auth_user.user_id, &req_payload).await?;
  Ok(HttpResponse::Ok().json(profile))
}

#[instrument(name = "handler::change_password", skip(app_state, auth_user, req_payload), fields(user_id = auth_user.user_id))]
pub async fn change_password_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  req_payload: web::Json<ChangePasswordRequest>,
) -> Result<HttpResponse, AppError> {
  account_service::change_password(app_state.get_ref(), auth_user.user_id, &req_payload).await?;
  Ok(HttpResponse::Ok().json(MessageResponse::new("Password changed.")))
}

#[instrument(name = "handler::order_history", skip(app_state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn order_history_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  account_service::require_active_user(&app_state.repos, auth_user.user_id).await?;
  let history = order_service::customer_order_history(app_state.get_ref(), auth_user.user_id).await?;
  Ok(HttpResponse::Ok().json(history))
}

#[instrument(name = "handler::set_favorite", skip(app_state, auth_user, req_payload), fields(user_id = auth_user.user_id))]
pub async fn set_favorite_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  req_payload: web::Json<FavoriteRequest>,
) -> Result<HttpResponse, AppError> {
  let favorite = favorite_service::set_favorite(app_state.get_ref(), auth_user.user_id, &req_payload).await?;
  Ok(HttpResponse::Ok().json(favorite))
}

#[instrument(name = "handler::list_favorites", skip(app_state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn list_favorites_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let favorites = favorite_service::list_favorites(app_state.get_ref(), auth_user.user_id).await?;
  Ok(HttpResponse::Ok().json(favorites))
}
