// src/models/catalog.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Category {
  pub id: i64,
  pub name: String,
  pub description: String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// A purchasable product variant. `stock_count` never goes below zero.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Brand {
  pub id: i64,
  pub category_id: i64,
  pub name: String,
  pub model: String,
  pub price_cents: i64,
  pub stock_count: i64,
  pub image_link: String,
  #[sqlx(json)]
  pub gallery_links: Vec<String>,
  pub description: String,
  pub release_date: Option<NaiveDate>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Name comparison that agrees with `LOWER()` on the database side.
pub fn same_name(a: &str, b: &str) -> bool {
  a.to_lowercase() == b.to_lowercase()
}

impl Brand {
  /// Case-insensitive identity within a category.
  pub fn matches(&self, category_id: i64, name: &str, model: &str) -> bool {
    self.category_id == category_id && same_name(&self.name, name) && same_name(&self.model, model)
  }
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BrandWithCategory {
  #[sqlx(flatten)]
  #[serde(flatten)]
  pub brand: Brand,
  pub category_name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryWithBrands {
  #[serde(flatten)]
  pub category: Category,
  pub brands: Vec<Brand>,
}

/// One brand inside a category upsert. Existing brands get `stock_count`
/// added to their stock and their price overwritten.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandInput {
  pub name: String,
  #[serde(default)]
  pub model: String,
  pub price_cents: i64,
  pub stock_count: i64,
  pub image_link: Option<String>,
  pub description: Option<String>,
  pub gallery_links: Option<Vec<String>>,
  pub release_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryUpsert {
  pub category_id: Option<i64>,
  pub name: String,
  pub description: Option<String>,
  #[serde(default)]
  pub brands: Vec<BrandInput>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPatch {
  pub name: Option<String>,
  pub description: Option<String>,
}

impl CategoryPatch {
  pub fn is_empty(&self) -> bool {
    self.name.is_none() && self.description.is_none()
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandPatch {
  pub name: Option<String>,
  pub price_cents: Option<i64>,
}

impl BrandPatch {
  pub fn is_empty(&self) -> bool {
    self.name.is_none() && self.price_cents.is_none()
  }
}
