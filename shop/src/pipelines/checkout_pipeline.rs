// src/pipelines/checkout_pipeline.rs

//! Order placement.
//!
//! Steps from `load_cart_lines` through `commit_checkout` share a single store
//! transaction kept in `CheckoutCtxData::tx`. Any failure runs the rollback
//! hook, so a failed checkout leaves no order, no stock change and no
//! consumed cart line behind.

use crate::dto::{BuyerDetails, ItemOrderedResponse, OrderedItem};
use crate::errors::{AppError, Result as AppResult};
use crate::models::{CartLineView, NewOrderItem, Order};
use crate::pipelines::contexts::{CheckoutCtxData, CheckoutStage};
use crate::services::account_service;
use crate::store::{CheckoutTx, StockDecrement};
use ecart_flow::{ContextData, FlowRegistry, StepControl, Workflow};
use std::collections::BTreeMap;
use tracing::{error, event, info, warn, Level};

pub fn register_checkout_pipeline(flows: &FlowRegistry<AppError>) {
  let mut checkout = Workflow::<CheckoutCtxData, AppError>::new(&[
    ("verify_account", false, None),
    ("load_cart_lines", false, None),
    ("compute_total", false, None),
    ("check_stock", false, None),
    ("persist_order", false, None),
    ("decrement_stock", false, None),
    ("mark_cart_consumed", false, None),
    ("commit_checkout", false, None),
    ("build_receipt", false, None),
  ]);

  checkout.on("verify_account", verify_account);
  checkout.on("load_cart_lines", load_cart_lines);
  checkout.on("compute_total", compute_total);
  checkout.on("check_stock", check_stock);
  checkout.on("persist_order", persist_order);
  checkout.on("decrement_stock", decrement_stock);
  checkout.on("mark_cart_consumed", mark_cart_consumed);
  checkout.on("commit_checkout", commit_checkout);
  checkout.on("build_receipt", build_receipt);

  checkout.on_failure(roll_back_checkout);

  flows.register(checkout);
}

fn take_tx(ctx_data: &ContextData<CheckoutCtxData>) -> AppResult<Box<dyn CheckoutTx>> {
  let tx = ctx_data.read().tx.take();
  tx.ok_or_else(|| AppError::Internal("Checkout transaction is not open".to_string()))
}

fn put_tx(ctx_data: &ContextData<CheckoutCtxData>, tx: Box<dyn CheckoutTx>) {
  ctx_data.read().tx.put(tx);
}

/// Brand id to total quantity across the locked lines.
fn quantities_by_brand(lines: &[CartLineView]) -> BTreeMap<i64, i64> {
  let mut totals = BTreeMap::new();
  for view in lines {
    *totals.entry(view.line.brand_id).or_insert(0) += view.line.quantity;
  }
  totals
}

async fn verify_account(ctx_data: ContextData<CheckoutCtxData>) -> AppResult<StepControl> {
  let (user_id, repos) = {
    let guard = ctx_data.read();
    (guard.user_id, guard.app_state.repos.clone())
  };
  let buyer = account_service::require_active_user(&repos, user_id).await?;
  ctx_data.write().buyer = Some(buyer);
  Ok(StepControl::Continue)
}

async fn load_cart_lines(ctx_data: ContextData<CheckoutCtxData>) -> AppResult<StepControl> {
  let (user_id, cart_id, repos) = {
    let guard = ctx_data.read();
    (guard.user_id, guard.cart_id, guard.app_state.repos.clone())
  };

  let mut tx = repos
    .orders
    .begin_checkout()
    .await
    .map_err(AppError::into_transaction_failure)?;
  let loaded = tx.lock_cart_lines(user_id, cart_id).await;
  put_tx(&ctx_data, tx);

  let lines = loaded.map_err(AppError::into_transaction_failure)?;
  if lines.is_empty() {
    warn!(user_id, cart_id, "No active cart line to check out.");
    return Err(AppError::CartEmpty);
  }
  event!(Level::DEBUG, lines = lines.len(), "Cart lines locked.");
  ctx_data.write().lines = lines;
  Ok(StepControl::Continue)
}

async fn compute_total(ctx_data: ContextData<CheckoutCtxData>) -> AppResult<StepControl> {
  let mut guard = ctx_data.write();
  let mut total: i64 = 0;
  for view in &guard.lines {
    total = view
      .line
      .price_cents
      .checked_mul(view.line.quantity)
      .and_then(|line_total| total.checked_add(line_total))
      .ok_or_else(|| AppError::Validation("Order total is out of range.".to_string()))?;
  }
  guard.total_cents = total;
  Ok(StepControl::Continue)
}

async fn lock_and_compare(tx: &mut dyn CheckoutTx, lines: &[CartLineView]) -> AppResult<()> {
  for (brand_id, requested) in quantities_by_brand(lines) {
    let available = tx
      .lock_brand_stock(brand_id)
      .await
      .map_err(AppError::into_transaction_failure)?
      .ok_or_else(|| AppError::NotFound(format!("Brand {} not found", brand_id)))?;
    if available < requested {
      warn!(brand_id, requested, available, "Insufficient stock at checkout.");
      return Err(AppError::InsufficientStock {
        brand_id,
        requested,
        available,
      });
    }
  }
  Ok(())
}

async fn check_stock(ctx_data: ContextData<CheckoutCtxData>) -> AppResult<StepControl> {
  let lines = ctx_data.read().lines.clone();
  let mut tx = take_tx(&ctx_data)?;
  let checked = lock_and_compare(tx.as_mut(), &lines).await;
  put_tx(&ctx_data, tx);
  checked?;

  ctx_data.write().stage = CheckoutStage::StockChecked;
  Ok(StepControl::Continue)
}

async fn write_order(
  tx: &mut dyn CheckoutTx,
  user_id: i64,
  total_cents: i64,
  lines: &[CartLineView],
) -> AppResult<Order> {
  let order = tx.insert_order(user_id, total_cents).await?;
  for view in lines {
    let item = NewOrderItem {
      brand_id: view.line.brand_id,
      quantity: view.line.quantity,
      price_cents: view.line.price_cents,
    };
    tx.insert_order_item(order.id, &item).await?;
  }
  Ok(order)
}

async fn persist_order(ctx_data: ContextData<CheckoutCtxData>) -> AppResult<StepControl> {
  let (user_id, total_cents, lines) = {
    let guard = ctx_data.read();
    (guard.user_id, guard.total_cents, guard.lines.clone())
  };
  let mut tx = take_tx(&ctx_data)?;
  let written = write_order(tx.as_mut(), user_id, total_cents, &lines).await;
  put_tx(&ctx_data, tx);
  let order = written.map_err(AppError::into_transaction_failure)?;

  event!(Level::DEBUG, order_id = order.id, "Order rows written.");
  let mut guard = ctx_data.write();
  guard.order = Some(order);
  guard.stage = CheckoutStage::OrderPersisted;
  Ok(StepControl::Continue)
}

async fn apply_decrements(tx: &mut dyn CheckoutTx, lines: &[CartLineView]) -> AppResult<()> {
  for (brand_id, quantity) in quantities_by_brand(lines) {
    match tx
      .decrement_stock(brand_id, quantity)
      .await
      .map_err(AppError::into_transaction_failure)?
    {
      StockDecrement::Applied { remaining } => {
        event!(Level::DEBUG, brand_id, remaining, "Stock decremented.");
      }
      StockDecrement::Insufficient { available } => {
        return Err(AppError::InsufficientStock {
          brand_id,
          requested: quantity,
          available,
        });
      }
      StockDecrement::Missing => {
        return Err(AppError::NotFound(format!("Brand {} not found", brand_id)));
      }
    }
  }
  Ok(())
}

async fn decrement_stock(ctx_data: ContextData<CheckoutCtxData>) -> AppResult<StepControl> {
  let lines = ctx_data.read().lines.clone();
  let mut tx = take_tx(&ctx_data)?;
  let applied = apply_decrements(tx.as_mut(), &lines).await;
  put_tx(&ctx_data, tx);
  applied?;

  ctx_data.write().stage = CheckoutStage::StockDecremented;
  Ok(StepControl::Continue)
}

async fn mark_cart_consumed(ctx_data: ContextData<CheckoutCtxData>) -> AppResult<StepControl> {
  let (user_id, cart_id, order_id) = {
    let guard = ctx_data.read();
    (guard.user_id, guard.cart_id, guard.order.as_ref().map(|order| order.id))
  };
  let order_id = order_id.ok_or_else(|| AppError::Internal("Order not written before marking cart".to_string()))?;

  let mut tx = take_tx(&ctx_data)?;
  let marked = tx.mark_consumed(user_id, order_id, cart_id).await;
  put_tx(&ctx_data, tx);

  let rows = marked.map_err(AppError::into_transaction_failure)?;
  if rows == 0 {
    return Err(AppError::TransactionFailure(format!(
      "Cart line {} was already consumed",
      cart_id
    )));
  }
  ctx_data.write().stage = CheckoutStage::CartMarked;
  Ok(StepControl::Continue)
}

async fn commit_checkout(ctx_data: ContextData<CheckoutCtxData>) -> AppResult<StepControl> {
  let tx = take_tx(&ctx_data)?;
  tx.commit().await.map_err(AppError::into_transaction_failure)?;
  event!(Level::DEBUG, "Checkout transaction committed.");
  Ok(StepControl::Continue)
}

async fn build_receipt(ctx_data: ContextData<CheckoutCtxData>) -> AppResult<StepControl> {
  let mut guard = ctx_data.write();
  let (order, buyer) = match (&guard.order, &guard.buyer) {
    (Some(order), Some(buyer)) => (order.clone(), BuyerDetails::from(buyer)),
    _ => return Err(AppError::Internal("Receipt requested before order completion".to_string())),
  };

  let items = guard
    .lines
    .iter()
    .map(|view| OrderedItem {
      product_id: view.line.brand_id,
      brand_name: view.brand_name.clone(),
      category_id: view.category_id,
      quantity: view.line.quantity,
      price_cents: view.line.price_cents,
    })
    .collect();

  info!(order_id = order.id, user_id = order.user_id, "Checkout complete.");
  guard.receipt = Some(ItemOrderedResponse {
    order_id: order.id,
    total_price_cents: order.total_cents,
    ordered_at: order.created_at,
    user_details: buyer,
    items,
  });
  guard.stage = CheckoutStage::Complete;
  Ok(StepControl::Continue)
}

async fn roll_back_checkout(ctx_data: ContextData<CheckoutCtxData>, failed_step: String) {
  let tx = ctx_data.read().tx.take();
  if let Some(tx) = tx {
    match tx.rollback().await {
      Ok(()) => event!(Level::DEBUG, %failed_step, "Checkout transaction rolled back."),
      Err(err) => error!(error = %err, %failed_step, "Checkout rollback failed."),
    }
  }

  let mut guard = ctx_data.write();
  warn!(%failed_step, stage = ?guard.stage, "Checkout failed.");
  guard.stage = CheckoutStage::Failed;
  guard.order = None;
  guard.failed_step = Some(failed_step);
}
