// src/models/order.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
  pub id: i64,
  pub user_id: i64,
  pub total_cents: i64,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
  pub id: i64,
  pub order_id: i64,
  pub brand_id: i64,
  pub quantity: i64,
  pub price_cents: i64,
}

#[derive(Debug, Clone, Copy)]
pub struct NewOrderItem {
  pub brand_id: i64,
  pub quantity: i64,
  pub price_cents: i64,
}

/// One order item flattened with its order, buyer and brand.
#[derive(Debug, Clone, FromRow)]
pub struct OrderHistoryRow {
  pub order_id: i64,
  pub user_id: i64,
  pub total_cents: i64,
  pub ordered_at: DateTime<Utc>,
  pub username: String,
  pub mail: String,
  pub address: String,
  pub pincode: i64,
  pub phone_number: i64,
  pub brand_id: i64,
  pub brand_name: String,
  pub category_id: i64,
  pub quantity: i64,
  pub price_cents: i64,
}
