// src/store/mod.rs

//! Persistence traits, one per aggregate, with a PostgreSQL and an
//! in-memory implementation.

use crate::errors::Result;
use crate::models::{
  Brand, BrandPatch, BrandWithCategory, CartLine, CartLineView, Category, CategoryPatch, CategoryUpsert,
  CategoryWithBrands, Favorite, NewOrderItem, NewUser, Order, OrderHistoryRow, OrderItem, ProfilePatch, User,
};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait UserStore: Send + Sync {
  /// Fails with `Conflict` when the username is taken.
  async fn create(&self, new_user: NewUser) -> Result<User>;
  async fn find_by_username(&self, username: &str) -> Result<Option<User>>;
  async fn find_by_id(&self, user_id: i64) -> Result<Option<User>>;
  /// `NotFound` for an unknown id, `Conflict` for a taken username.
  async fn update_profile(&self, user_id: i64, patch: &ProfilePatch) -> Result<User>;
  async fn update_password(&self, user_id: i64, password_hash: &str) -> Result<()>;
  /// `NotFound` when no row was updated.
  async fn set_active(&self, user_id: i64, active: bool) -> Result<()>;
  /// Non-admin users with the given status, ordered by id.
  async fn list_customers(&self, active: bool) -> Result<Vec<User>>;
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
  /// Creates or restocks a category and its brands in one transaction.
  async fn upsert_category(&self, input: &CategoryUpsert) -> Result<CategoryWithBrands>;
  async fn category_by_id(&self, category_id: i64) -> Result<Option<CategoryWithBrands>>;
  /// Case-insensitive lookup.
  async fn category_by_name(&self, name: &str) -> Result<Option<CategoryWithBrands>>;
  async fn list_categories(&self) -> Result<Vec<Category>>;
  async fn list_brands(&self) -> Result<Vec<BrandWithCategory>>;
  async fn brand_by_id(&self, brand_id: i64) -> Result<Option<BrandWithCategory>>;
  async fn brands_by_ids(&self, brand_ids: &[i64]) -> Result<Vec<BrandWithCategory>>;
  async fn update_category(&self, category_id: i64, patch: &CategoryPatch) -> Result<Category>;
  async fn update_brand(&self, brand_id: i64, patch: &BrandPatch) -> Result<Brand>;
}

#[async_trait]
pub trait CartStore: Send + Sync {
  /// Inserts a cart line or increments the active one for `(user, brand)`.
  /// The unit price is refreshed from `brand` either way.
  async fn add_or_increment(&self, user_id: i64, brand: &Brand, quantity: i64) -> Result<CartLine>;
  async fn active_lines(&self, user_id: i64) -> Result<Vec<CartLineView>>;
  /// Quantity of `brand_id` already sitting in the user's cart.
  async fn active_quantity(&self, user_id: i64, brand_id: i64) -> Result<i64>;
  /// Deletes the active lines. `CartEmpty` when there were none.
  async fn clear(&self, user_id: i64) -> Result<u64>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
  async fn begin_checkout(&self) -> Result<Box<dyn CheckoutTx>>;
  /// Newest first.
  async fn history_for_user(&self, user_id: i64) -> Result<Vec<OrderHistoryRow>>;
  async fn all_history(&self) -> Result<Vec<OrderHistoryRow>>;
}

#[async_trait]
pub trait FavoriteStore: Send + Sync {
  async fn set_favorite(&self, user_id: i64, brand_id: i64, favorite: bool) -> Result<Favorite>;
  async fn favorite_brand_ids(&self, user_id: i64) -> Result<Vec<i64>>;
}

/// Result of a conditional stock decrement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockDecrement {
  Applied { remaining: i64 },
  Insufficient { available: i64 },
  Missing,
}

/// The single transaction an order placement runs in.
///
/// Dropping a transaction without committing rolls it back.
#[async_trait]
pub trait CheckoutTx: Send {
  /// Active cart lines matching `cart_id` for `user_id`, locked for update.
  async fn lock_cart_lines(&mut self, user_id: i64, cart_id: i64) -> Result<Vec<CartLineView>>;
  /// Current stock of a brand, with the row locked. `None` if the brand is gone.
  async fn lock_brand_stock(&mut self, brand_id: i64) -> Result<Option<i64>>;
  async fn insert_order(&mut self, user_id: i64, total_cents: i64) -> Result<Order>;
  async fn insert_order_item(&mut self, order_id: i64, item: &NewOrderItem) -> Result<OrderItem>;
  async fn decrement_stock(&mut self, brand_id: i64, quantity: i64) -> Result<StockDecrement>;
  /// Flips matching active lines to consumed. Returns the number of rows changed.
  async fn mark_consumed(&mut self, user_id: i64, order_id: i64, cart_id: i64) -> Result<u64>;
  async fn commit(self: Box<Self>) -> Result<()>;
  async fn rollback(self: Box<Self>) -> Result<()>;
}

/// Every store the application uses, behind trait objects.
#[derive(Clone)]
pub struct Repositories {
  pub users: Arc<dyn UserStore>,
  pub catalog: Arc<dyn CatalogStore>,
  pub carts: Arc<dyn CartStore>,
  pub orders: Arc<dyn OrderStore>,
  pub favorites: Arc<dyn FavoriteStore>,
}

impl Repositories {
  pub fn postgres(pool: PgPool) -> Self {
    let store = Arc::new(PgStore::new(pool));
    Self::from_store(store)
  }

  pub fn in_memory() -> Self {
    Self::from_store(Arc::new(MemoryStore::new()))
  }

  fn from_store<S>(store: Arc<S>) -> Self
  where
    S: UserStore + CatalogStore + CartStore + OrderStore + FavoriteStore + 'static,
  {
    Self {
      users: store.clone(),
      catalog: store.clone(),
      carts: store.clone(),
      orders: store.clone(),
      favorites: store,
    }
  }
}
