// src/services/cart_service.rs

use crate::dto::{AddCartItemRequest, CartItemResponse, CartViewResponse};
use crate::errors::{AppError, Result};
use crate::pipelines::contexts::AddToCartCtxData;
use crate::services::account_service::require_active_user;
use crate::state::AppState;
use ecart_flow::ContextData;
use tracing::{info, instrument};

/// Adds `request.quantity` of a brand to the caller's cart, merging with an
/// existing active line for the same brand.
#[instrument(name = "cart_service::add_to_cart", skip(state, request), fields(brand_id = request.brand_id, quantity = request.quantity))]
pub async fn add_to_cart(state: &AppState, user_id: i64, request: AddCartItemRequest) -> Result<CartItemResponse> {
  let ctx_data = ContextData::new(AddToCartCtxData::new(state.clone(), user_id, request));
  state.flows.run(ctx_data.clone()).await?;

  let response = ctx_data.read().response.clone();
  response.ok_or_else(|| AppError::Internal("Add-to-cart finished without a cart line".to_string()))
}

pub async fn view_cart(state: &AppState, user_id: i64) -> Result<CartViewResponse> {
  require_active_user(&state.repos, user_id).await?;
  let lines = state.repos.carts.active_lines(user_id).await?;

  let items: Vec<CartItemResponse> = lines
    .iter()
    .map(|view| CartItemResponse::new(&view.line, &view.brand_name))
    .collect();
  let total_price_cents = items
    .iter()
    .try_fold(0i64, |total, item| total.checked_add(item.total_price_cents))
    .ok_or_else(|| AppError::Validation("Cart total is too large.".to_string()))?;
  Ok(CartViewResponse {
    items,
    total_price_cents,
  })
}

/// Removes every active line. An already empty cart is `CartEmpty`.
#[instrument(name = "cart_service::clear_cart", skip(state))]
pub async fn clear_cart(state: &AppState, user_id: i64) -> Result<u64> {
  require_active_user(&state.repos, user_id).await?;
  let removed = state.repos.carts.clear(user_id).await?;
  info!(removed, "Cart cleared.");
  Ok(removed)
}
