// src/pipelines/cart_pipeline.rs

//! Add-to-cart workflow. The stock check here is advisory; stock is only
//! reserved when the order is placed.

use crate::dto::CartItemResponse;
use crate::errors::{AppError, Result as AppResult};
use crate::pipelines::contexts::AddToCartCtxData;
use crate::services::account_service;
use ecart_flow::{ContextData, FlowRegistry, StepControl, Workflow};
use tracing::{event, info, warn, Level};

pub fn register_add_to_cart_pipeline(flows: &FlowRegistry<AppError>) {
  let mut add_to_cart = Workflow::<AddToCartCtxData, AppError>::new(&[
    ("verify_account", false, None),
    ("validate_quantity", false, None),
    ("load_brand", false, None),
    ("check_availability", false, None),
    ("upsert_cart_line", false, None),
  ]);

  add_to_cart.on("verify_account", verify_account);
  add_to_cart.on("validate_quantity", validate_quantity);
  add_to_cart.on("load_brand", load_brand);
  add_to_cart.on("check_availability", check_availability);
  add_to_cart.on("upsert_cart_line", upsert_cart_line);

  flows.register(add_to_cart);
}

async fn verify_account(ctx_data: ContextData<AddToCartCtxData>) -> AppResult<StepControl> {
  let (user_id, repos) = {
    let guard = ctx_data.read();
    (guard.user_id, guard.app_state.repos.clone())
  };
  account_service::require_active_user(&repos, user_id).await?;
  Ok(StepControl::Continue)
}

async fn validate_quantity(ctx_data: ContextData<AddToCartCtxData>) -> AppResult<StepControl> {
  let quantity = ctx_data.read().quantity;
  if quantity <= 0 {
    warn!(quantity, "Rejected non-positive cart quantity.");
    return Err(AppError::Validation("Quantity must be greater than zero.".to_string()));
  }
  Ok(StepControl::Continue)
}

async fn load_brand(ctx_data: ContextData<AddToCartCtxData>) -> AppResult<StepControl> {
  let (brand_id, category_id, repos) = {
    let guard = ctx_data.read();
    (guard.brand_id, guard.category_id, guard.app_state.repos.clone())
  };

  let brand = repos
    .catalog
    .brand_by_id(brand_id)
    .await?
    .map(|found| found.brand)
    .ok_or_else(|| AppError::NotFound(format!("Brand {} not found", brand_id)))?;
  if brand.category_id != category_id {
    warn!(brand_id, category_id, actual = brand.category_id, "Brand is not in the requested category.");
    return Err(AppError::NotFound(format!(
      "Brand {} not found in category {}",
      brand_id, category_id
    )));
  }

  ctx_data.write().brand = Some(brand);
  Ok(StepControl::Continue)
}

async fn check_availability(ctx_data: ContextData<AddToCartCtxData>) -> AppResult<StepControl> {
  let (user_id, quantity, brand, repos) = {
    let guard = ctx_data.read();
    (guard.user_id, guard.quantity, guard.brand.clone(), guard.app_state.repos.clone())
  };
  let brand = brand.ok_or_else(|| AppError::Internal("Brand not loaded before stock check".to_string()))?;

  let in_cart = repos.carts.active_quantity(user_id, brand.id).await?;
  let requested = in_cart
    .checked_add(quantity)
    .ok_or_else(|| AppError::Validation("Quantity is too large.".to_string()))?;
  if requested > brand.stock_count {
    warn!(brand_id = brand.id, requested, available = brand.stock_count, "Not enough stock to add to cart.");
    return Err(AppError::InsufficientStock {
      brand_id: brand.id,
      requested,
      available: brand.stock_count,
    });
  }
  event!(Level::DEBUG, brand_id = brand.id, requested, "Stock available.");
  Ok(StepControl::Continue)
}

async fn upsert_cart_line(ctx_data: ContextData<AddToCartCtxData>) -> AppResult<StepControl> {
  let (user_id, quantity, brand, repos) = {
    let guard = ctx_data.read();
    (guard.user_id, guard.quantity, guard.brand.clone(), guard.app_state.repos.clone())
  };
  let brand = brand.ok_or_else(|| AppError::Internal("Brand not loaded before cart update".to_string()))?;

  let line = repos.carts.add_or_increment(user_id, &brand, quantity).await?;
  info!(cart_id = line.id, brand_id = brand.id, quantity = line.quantity, "Cart line saved.");
  ctx_data.write().response = Some(CartItemResponse::new(&line, &brand.name));
  Ok(StepControl::Continue)
}
