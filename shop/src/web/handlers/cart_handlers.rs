// src/web/handlers/cart_handlers.rs

use crate::dto::{AddCartItemRequest, MessageResponse};
use crate::errors::AppError;
use crate::services::cart_service;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;
use actix_web::{web, HttpResponse};
use tracing::instrument;

#[instrument(
  name = "handler::add_to_cart",
  skip(app_state, req_payload, auth_user),
  fields(user_id = auth_user.user_id, brand_id = req_payload.brand_id, quantity = req_payload.quantity)
)]
pub async fn add_to_cart_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<AddCartItemRequest>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let item = cart_service::add_to_cart(app_state.get_ref(), auth_user.user_id, req_payload.into_inner()).await?;
  Ok(HttpResponse::Ok().json(item))
}

#[instrument(name = "handler::view_cart", skip(app_state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn view_cart_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let cart = cart_service::view_cart(app_state.get_ref(), auth_user.user_id).await?;
  Ok(HttpResponse::Ok().json(cart))
}

#[instrument(name = "handler::clear_cart", skip(app_state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn clear_cart_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let removed = cart_service::clear_cart(app_state.get_ref(), auth_user.user_id).await?;
  Ok(HttpResponse::Ok().json(MessageResponse::new(format!("Removed {} cart line(s).", removed))))
}
