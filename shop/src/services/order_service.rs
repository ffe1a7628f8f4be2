// src/services/order_service.rs

use crate::dto::ItemOrderedResponse;
use crate::errors::{AppError, Result};
use crate::pipelines::contexts::CheckoutCtxData;
use crate::state::AppState;
use ecart_flow::{ContextData, WorkflowOutcome};
use tracing::{info, instrument, warn};

/// Converts one cart line into an order. Stock, order rows and the cart line
/// change together or not at all.
#[instrument(name = "order_service::place_order", skip(state))]
pub async fn place_order(state: &AppState, user_id: i64, cart_id: i64) -> Result<ItemOrderedResponse> {
  let ctx_data = ContextData::new(CheckoutCtxData::new(state.clone(), user_id, cart_id));

  match state.flows.run(ctx_data.clone()).await {
    Ok(WorkflowOutcome::Completed) => {}
    Ok(WorkflowOutcome::Stopped) => {
      return Err(AppError::Internal("Checkout stopped before completing".to_string()));
    }
    Err(err) => {
      let failed_step = ctx_data.read().failed_step.clone();
      warn!(error = %err, failed_step = ?failed_step, "Checkout failed.");
      return Err(err);
    }
  }

  let receipt = ctx_data.read().receipt.clone();
  let receipt = receipt.ok_or_else(|| AppError::Internal("Checkout finished without a receipt".to_string()))?;
  info!(order_id = receipt.order_id, total_cents = receipt.total_price_cents, "Order placed.");
  Ok(receipt)
}

pub async fn customer_order_history(state: &AppState, user_id: i64) -> Result<Vec<ItemOrderedResponse>> {
  let rows = state.repos.orders.history_for_user(user_id).await?;
  Ok(ItemOrderedResponse::group_rows(rows))
}

pub async fn all_order_history(state: &AppState) -> Result<Vec<ItemOrderedResponse>> {
  let rows = state.repos.orders.all_history().await?;
  Ok(ItemOrderedResponse::group_rows(rows))
}
