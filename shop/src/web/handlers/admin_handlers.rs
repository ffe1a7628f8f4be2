// src/web/handlers/admin_handlers.rs

use crate::dto::MessageResponse;
use crate::errors::AppError;
use crate::services::{account_service, order_service};
use crate::state::AppState;
use crate::web::extractors::AdminUser;
use actix_web::{web, HttpResponse};
use tracing::instrument;

#[instrument(name = "handler::block_user", skip(app_state, admin), fields(admin_id = admin.user_id))]
pub async fn block_user_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  let user_id = path.into_inner();
  account_service::block_user(app_state.get_ref(), user_id).await?;
  Ok(HttpResponse::Ok().json(MessageResponse::new(format!("User {} blocked.", user_id))))
}

#[instrument(name = "handler::unblock_user", skip(app_state, admin), fields(admin_id = admin.user_id))]
pub async fn unblock_user_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  let user_id = path.into_inner();
  account_service::unblock_user(app_state.get_ref(), user_id).await?;
  Ok(HttpResponse::Ok().json(MessageResponse::new(format!("User {} unblocked.", user_id))))
}

#[instrument(name = "handler::list_active_users", skip_all)]
pub async fn list_active_users_handler(
  app_state: web::Data<AppState>,
  _admin: AdminUser,
) -> Result<HttpResponse, AppError> {
  Ok(HttpResponse::Ok().json(account_service::list_active_users(app_state.get_ref()).await?))
}

#[instrument(name = "handler::list_blocked_users", skip_all)]
pub async fn list_blocked_users_handler(
  app_state: web::Data<AppState>,
  _admin: AdminUser,
) -> Result<HttpResponse, AppError> {
  Ok(HttpResponse::Ok().json(account_service::list_blocked_users(app_state.get_ref()).await?))
}

#[instrument(name = "handler::customer_order_history", skip(app_state, _admin))]
pub async fn customer_order_history_handler(
  app_state: web::Data<AppState>,
  _admin: AdminUser,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  let history = order_service::customer_order_history(app_state.get_ref(), path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(history))
}

#[instrument(name = "handler::all_order_history", skip_all)]
pub async fn all_order_history_handler(
  app_state: web::Data<AppState>,
  _admin: AdminUser,
) -> Result<HttpResponse, AppError> {
  Ok(HttpResponse::Ok().json(order_service::all_order_history(app_state.get_ref()).await?))
}
