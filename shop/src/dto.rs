// src/dto.rs

//! Request and response bodies of the HTTP surface.

use crate::models::{Brand, BrandWithCategory, CartLine, Category, CategoryWithBrands, OrderHistoryRow, User};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// --- Requests ---

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
  pub username: String,
  pub password: String,
  pub address: String,
  pub pincode: i64,
  pub phone_number: i64,
  pub mail: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
  pub username: String,
  pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
  pub current_password: String,
  pub new_password: String,
  pub confirm_password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCartItemRequest {
  pub brand_id: i64,
  pub category_id: i64,
  pub quantity: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
  pub cart_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteRequest {
  pub brand_id: i64,
  pub favorite: bool,
}

// --- Responses ---

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveUserResponse {
  pub user_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
  pub token: String,
  pub expires_at: DateTime<Utc>,
  pub user_id: i64,
  pub is_admin: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetailsResponse {
  pub user_id: i64,
  pub username: String,
  pub mail: String,
  pub address: String,
  pub pincode: i64,
  pub phone_number: i64,
  pub active: bool,
}

impl From<&User> for UserDetailsResponse {
  fn from(user: &User) -> Self {
    Self {
      user_id: user.id,
      username: user.username.clone(),
      mail: user.mail.clone(),
      address: user.address.clone(),
      pincode: user.pincode,
      phone_number: user.phone_number,
      active: user.active,
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemResponse {
  pub cart_id: i64,
  pub user_id: i64,
  pub product_id: i64,
  pub quantity: i64,
  pub price_cents: i64,
  pub brand_name: String,
  pub total_price_cents: i64,
}

impl CartItemResponse {
  pub fn new(line: &CartLine, brand_name: &str) -> Self {
    Self {
      cart_id: line.id,
      user_id: line.user_id,
      product_id: line.brand_id,
      quantity: line.quantity,
      price_cents: line.price_cents,
      brand_name: brand_name.to_string(),
      total_price_cents: line.total_cents,
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartViewResponse {
  pub items: Vec<CartItemResponse>,
  pub total_price_cents: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BuyerDetails {
  pub user_id: i64,
  pub username: String,
  pub mail: String,
  pub address: String,
  pub pincode: i64,
  pub phone_number: i64,
}

impl From<&User> for BuyerDetails {
  fn from(user: &User) -> Self {
    Self {
      user_id: user.id,
      username: user.username.clone(),
      mail: user.mail.clone(),
      address: user.address.clone(),
      pincode: user.pincode,
      phone_number: user.phone_number,
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OrderedItem {
  pub product_id: i64,
  pub brand_name: String,
  pub category_id: i64,
  pub quantity: i64,
  pub price_cents: i64,
}

/// Receipt of a placed order, also used for order history entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemOrderedResponse {
  pub order_id: i64,
  pub total_price_cents: i64,
  pub ordered_at: DateTime<Utc>,
  pub user_details: BuyerDetails,
  pub items: Vec<OrderedItem>,
}

impl ItemOrderedResponse {
  /// Groups flattened history rows into one entry per order, keeping the
  /// row order of the first item of each order.
  pub fn group_rows(rows: Vec<OrderHistoryRow>) -> Vec<ItemOrderedResponse> {
    let mut grouped: Vec<ItemOrderedResponse> = Vec::new();
    for row in rows {
      let item = OrderedItem {
        product_id: row.brand_id,
        brand_name: row.brand_name,
        category_id: row.category_id,
        quantity: row.quantity,
        price_cents: row.price_cents,
      };
      match grouped.iter_mut().find(|entry| entry.order_id == row.order_id) {
        Some(entry) => entry.items.push(item),
        None => grouped.push(ItemOrderedResponse {
          order_id: row.order_id,
          total_price_cents: row.total_cents,
          ordered_at: row.ordered_at,
          user_details: BuyerDetails {
            user_id: row.user_id,
            username: row.username,
            mail: row.mail,
            address: row.address,
            pincode: row.pincode,
            phone_number: row.phone_number,
          },
          items: vec![item],
        }),
      }
    }
    grouped
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
  pub category_id: i64,
  pub category_name: String,
  pub description: String,
}

impl From<&Category> for CategorySummary {
  fn from(category: &Category) -> Self {
    Self {
      category_id: category.id,
      category_name: category.name.clone(),
      description: category.description.clone(),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandSummary {
  pub brand_id: i64,
  pub brand_name: String,
  pub model: String,
  pub price_cents: i64,
  pub stock_count: i64,
  pub image_link: String,
}

impl From<&Brand> for BrandSummary {
  fn from(brand: &Brand) -> Self {
    Self {
      brand_id: brand.id,
      brand_name: brand.name.clone(),
      model: brand.model.clone(),
      price_cents: brand.price_cents,
      stock_count: brand.stock_count,
      image_link: brand.image_link.clone(),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDetailResponse {
  pub category_id: i64,
  pub category_name: String,
  pub description: String,
  pub brands: Vec<BrandSummary>,
}

impl From<&CategoryWithBrands> for CategoryDetailResponse {
  fn from(value: &CategoryWithBrands) -> Self {
    Self {
      category_id: value.category.id,
      category_name: value.category.name.clone(),
      description: value.category.description.clone(),
      brands: value.brands.iter().map(BrandSummary::from).collect(),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandDetailResponse {
  pub brand_id: i64,
  pub brand_name: String,
  pub model: String,
  pub price_cents: i64,
  pub stock_count: i64,
  pub image_link: String,
  pub gallery_links: Vec<String>,
  pub description: String,
  pub category_id: i64,
  pub category_name: String,
}

impl From<&BrandWithCategory> for BrandDetailResponse {
  fn from(value: &BrandWithCategory) -> Self {
    let brand = &value.brand;
    Self {
      brand_id: brand.id,
      brand_name: brand.name.clone(),
      model: brand.model.clone(),
      price_cents: brand.price_cents,
      stock_count: brand.stock_count,
      image_link: brand.image_link.clone(),
      gallery_links: brand.gallery_links.clone(),
      description: brand.description.clone(),
      category_id: brand.category_id,
      category_name: value.category_name.clone(),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
  pub message: String,
}

impl MessageResponse {
  pub fn new(message: impl Into<String>) -> Self {
    Self {
      message: message.into(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  fn row(order_id: i64, brand_id: i64, minute: u32) -> OrderHistoryRow {
    OrderHistoryRow {
      order_id,
      user_id: 7,
      total_cents: 1_000,
      ordered_at: Utc.with_ymd_and_hms(2024, 1, 1, 12, minute, 0).unwrap(),
      username: "alice".to_string(),
      mail: "alice@example.com".to_string(),
      address: "1 Main St".to_string(),
      pincode: 560001,
      phone_number: 5550100,
      brand_id,
      brand_name: format!("brand-{}", brand_id),
      category_id: 3,
      quantity: 1,
      price_cents: 500,
    }
  }

  #[test]
  fn group_rows_keeps_order_sequence_and_collects_items() {
    let grouped = ItemOrderedResponse::group_rows(vec![row(20, 1, 5), row(20, 2, 5), row(10, 1, 1)]);
    assert_eq!(grouped.len(), 2);
    assert_eq!(grouped[0].order_id, 20);
    assert_eq!(grouped[0].items.len(), 2);
    assert_eq!(grouped[1].order_id, 10);
    assert_eq!(grouped[1].user_details.username, "alice");
  }

  #[test]
  fn add_cart_item_request_uses_camel_case() {
    let parsed: AddCartItemRequest =
      serde_json::from_str(r#"{"brandId": 4, "categoryId": 2, "quantity": 3}"#).unwrap();
    assert_eq!((parsed.brand_id, parsed.category_id, parsed.quantity), (4, 2, 3));
  }
}
