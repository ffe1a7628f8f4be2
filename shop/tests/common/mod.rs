// tests/common/mod.rs
#![allow(dead_code)]

use ecart::config::AppConfig;
use ecart::dto::{AddCartItemRequest, CartItemResponse, CategoryDetailResponse, SignupRequest};
use ecart::errors::Result;
use ecart::models::{BrandInput, CategoryUpsert};
use ecart::services::{account_service, cart_service, catalog_service};
use ecart::state::AppState;
use ecart::store::{MemoryStore, Repositories};
use once_cell::sync::Lazy;
use std::sync::Arc;

pub const TEST_SECRET: &str = "integration-test-secret-0123456789";
pub const TEST_PASSWORD: &str = "s3cret-password";

static TRACING: Lazy<()> = Lazy::new(|| {
  let filter = tracing_subscriber::EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
  let _ = tracing_subscriber::fmt().with_env_filter(filter).with_test_writer().try_init();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING);
}

pub fn test_config() -> AppConfig {
  AppConfig::for_memory(TEST_SECRET)
}

pub fn memory_state() -> AppState {
  setup_tracing();
  AppState::in_memory(test_config())
}

/// Repositories over one shared memory store, for tests that swap a single
/// store for a wrapper.
pub fn memory_repos(store: &MemoryStore) -> Repositories {
  let shared = Arc::new(store.clone());
  Repositories {
    users: shared.clone(),
    catalog: shared.clone(),
    carts: shared.clone(),
    orders: shared.clone(),
    favorites: shared,
  }
}

pub fn signup_request(username: &str) -> SignupRequest {
  SignupRequest {
    username: username.to_string(),
    password: TEST_PASSWORD.to_string(),
    address: "12 Market Road".to_string(),
    pincode: 560001,
    phone_number: 9876543210,
    mail: format!("{}@example.com", username),
  }
}

pub async fn create_customer(state: &AppState, username: &str) -> i64 {
  account_service::signup(state, signup_request(username))
    .await
    .expect("signup should succeed")
    .user_id
}

pub fn brand_input(name: &str, price_cents: i64, stock_count: i64) -> BrandInput {
  BrandInput {
    name: name.to_string(),
    model: String::new(),
    price_cents,
    stock_count,
    image_link: None,
    description: None,
    gallery_links: None,
    release_date: None,
  }
}

pub fn category_input(name: &str, brands: Vec<BrandInput>) -> CategoryUpsert {
  CategoryUpsert {
    category_id: None,
    name: name.to_string(),
    description: Some(format!("All {}", name)),
    brands,
  }
}

pub async fn seed_category(state: &AppState, name: &str, brands: Vec<BrandInput>) -> CategoryDetailResponse {
  catalog_service::upsert_category(state, &category_input(name, brands))
    .await
    .expect("catalog upsert should succeed")
}

pub async fn add_item(
  state: &AppState,
  user_id: i64,
  brand_id: i64,
  category_id: i64,
  quantity: i64,
) -> Result<CartItemResponse> {
  cart_service::add_to_cart(
    state,
    user_id,
    AddCartItemRequest {
      brand_id,
      category_id,
      quantity,
    },
  )
  .await
}

pub async fn stock_of(state: &AppState, brand_id: i64) -> i64 {
  catalog_service::brand_by_id(state, brand_id)
    .await
    .expect("brand should exist")
    .stock_count
}
