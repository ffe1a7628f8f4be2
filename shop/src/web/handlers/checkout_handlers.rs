// src/web/handlers/checkout_handlers.rs

use crate::dto::PlaceOrderRequest;
use crate::errors::AppError;
use crate::services::order_service;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;
use actix_web::{web, HttpResponse};
use tracing::instrument;

#[instrument(
  name = "handler::place_order",
  skip(app_state, req_payload, auth_user),
  fields(user_id = auth_user.user_id, cart_id = req_payload.cart_id)
)]
pub async fn place_order_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<PlaceOrderRequest>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let receipt = order_service::place_order(app_state.get_ref(), auth_user.user_id, req_payload.cart_id).await?;
  Ok(HttpResponse::Ok().json(receipt))
}
