// src/models/favorite.rs

use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
  pub id: i64,
  pub user_id: i64,
  pub brand_id: i64,
  pub favorite: bool,
}
