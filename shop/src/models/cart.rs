// src/models/cart.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// A cart row. `order_status` is true while the line sits in the cart and
/// flips to false, with `order_ref` set, once an order consumes it.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
  pub id: i64,
  pub user_id: i64,
  pub brand_id: i64,
  pub quantity: i64,
  pub price_cents: i64,
  pub total_cents: i64,
  pub order_status: bool,
  pub order_ref: Option<i64>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// A cart line joined with the brand it refers to.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CartLineView {
  #[sqlx(flatten)]
  #[serde(flatten)]
  pub line: CartLine,
  pub brand_name: String,
  pub category_id: i64,
}
