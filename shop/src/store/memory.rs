// src/store/memory.rs

//! In-memory implementation of the store traits.
//!
//! All state sits behind one async mutex. A checkout transaction holds the
//! mutex for its whole lifetime and works on a staged copy that replaces the
//! shared state only on commit, which makes transactions serializable. While
//! a [`MemoryCheckoutTx`] is alive, only its own methods may touch the store.

use crate::errors::{AppError, Result};
use crate::models::{
  Brand, BrandPatch, BrandWithCategory, CartLine, CartLineView, Category, CategoryPatch, CategoryUpsert,
  CategoryWithBrands, Favorite, NewOrderItem, NewUser, Order, OrderHistoryRow, OrderItem, ProfilePatch, User,
};
use crate::models::catalog::same_name;
use crate::store::{CartStore, CatalogStore, CheckoutTx, FavoriteStore, OrderStore, StockDecrement, UserStore};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Debug, Clone, Default)]
struct MemoryState {
  last_id: i64,
  users: BTreeMap<i64, User>,
  categories: BTreeMap<i64, Category>,
  brands: BTreeMap<i64, Brand>,
  carts: BTreeMap<i64, CartLine>,
  orders: BTreeMap<i64, Order>,
  order_items: BTreeMap<i64, OrderItem>,
  favorites: BTreeMap<i64, Favorite>,
}

impl MemoryState {
  fn next_id(&mut self) -> i64 {
    self.last_id += 1;
    self.last_id
  }

  fn username_taken(&self, username: &str, except: Option<i64>) -> bool {
    self
      .users
      .values()
      .any(|u| u.username == username && Some(u.id) != except)
  }

  fn category_named(&self, name: &str) -> Option<&Category> {
    self.categories.values().find(|c| same_name(&c.name, name))
  }

  fn with_brands(&self, category: &Category) -> CategoryWithBrands {
    CategoryWithBrands {
      category: category.clone(),
      brands: self
        .brands
        .values()
        .filter(|b| b.category_id == category.id)
        .cloned()
        .collect(),
    }
  }

  fn brand_view(&self, brand: &Brand) -> BrandWithCategory {
    BrandWithCategory {
      brand: brand.clone(),
      category_name: self
        .categories
        .get(&brand.category_id)
        .map(|c| c.name.clone())
        .unwrap_or_default(),
    }
  }

  fn line_view(&self, line: &CartLine) -> CartLineView {
    let brand = self.brands.get(&line.brand_id);
    CartLineView {
      line: line.clone(),
      brand_name: brand.map(|b| b.name.clone()).unwrap_or_default(),
      category_id: brand.map(|b| b.category_id).unwrap_or_default(),
    }
  }

  fn history(&self, user_filter: Option<i64>) -> Vec<OrderHistoryRow> {
    let mut orders: Vec<&Order> = self
      .orders
      .values()
      .filter(|o| user_filter.map_or(true, |uid| o.user_id == uid))
      .collect();
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

    let mut rows = Vec::new();
    for order in orders {
      let Some(user) = self.users.get(&order.user_id) else {
        continue;
      };
      for item in self.order_items.values().filter(|i| i.order_id == order.id) {
        let brand = self.brands.get(&item.brand_id);
        rows.push(OrderHistoryRow {
          order_id: order.id,
          user_id: order.user_id,
          total_cents: order.total_cents,
          ordered_at: order.created_at,
          username: user.username.clone(),
          mail: user.mail.clone(),
          address: user.address.clone(),
          pincode: user.pincode,
          phone_number: user.phone_number,
          brand_id: item.brand_id,
          brand_name: brand.map(|b| b.name.clone()).unwrap_or_default(),
          category_id: brand.map(|b| b.category_id).unwrap_or_default(),
          quantity: item.quantity,
          price_cents: item.price_cents,
        });
      }
    }
    rows
  }
}

fn quantity_too_large() -> AppError {
  AppError::Validation("Quantity is too large.".to_string())
}

fn line_total(quantity: i64, price_cents: i64) -> Result<i64> {
  quantity.checked_mul(price_cents).ok_or_else(quantity_too_large)
}

#[derive(Clone, Default)]
pub struct MemoryStore {
  state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl UserStore for MemoryStore {
  async fn create(&self, new_user: NewUser) -> Result<User> {
    let mut state = self.state.lock().await;
    if state.username_taken(&new_user.username, None) {
      return Err(AppError::Conflict(format!(
        "Username '{}' is already taken",
        new_user.username
      )));
    }
    let now = Utc::now();
    let user = User {
      id: state.next_id(),
      username: new_user.username,
      password: new_user.password_hash,
      address: new_user.address,
      pincode: new_user.pincode,
      phone_number: new_user.phone_number,
      mail: new_user.mail,
      active: true,
      is_admin: new_user.is_admin,
      created_at: now,
      updated_at: now,
    };
    state.users.insert(user.id, user.clone());
    Ok(user)
  }

  async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
    let state = self.state.lock().await;
    Ok(state.users.values().find(|u| u.username == username).cloned())
  }

  async fn find_by_id(&self, user_id: i64) -> Result<Option<User>> {
    Ok(self.state.lock().await.users.get(&user_id).cloned())
  }

  async fn update_profile(&self, user_id: i64, patch: &ProfilePatch) -> Result<User> {
    let mut state = self.state.lock().await;
    if let Some(username) = &patch.username {
      if state.username_taken(username, Some(user_id)) {
        return Err(AppError::Conflict("Username is already taken".to_string()));
      }
    }
    let user = state
      .users
      .get_mut(&user_id)
      .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;
    patch.apply(user);
    user.updated_at = Utc::now();
    Ok(user.clone())
  }

  async fn update_password(&self, user_id: i64, password_hash: &str) -> Result<()> {
    let mut state = self.state.lock().await;
    let user = state
      .users
      .get_mut(&user_id)
      .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;
    user.password = password_hash.to_string();
    user.updated_at = Utc::now();
    Ok(())
  }

  async fn set_active(&self, user_id: i64, active: bool) -> Result<()> {
    let mut state = self.state.lock().await;
    let user = state
      .users
      .get_mut(&user_id)
      .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;
    user.active = active;
    user.updated_at = Utc::now();
    Ok(())
  }

  async fn list_customers(&self, active: bool) -> Result<Vec<User>> {
    let state = self.state.lock().await;
    Ok(
      state
        .users
        .values()
        .filter(|u| u.active == active && !u.is_admin)
        .cloned()
        .collect(),
    )
  }
}

#[async_trait]
impl CatalogStore for MemoryStore {
  async fn upsert_category(&self, input: &CategoryUpsert) -> Result<CategoryWithBrands> {
    let mut guard = self.state.lock().await;
    // Staged so a failing brand leaves nothing behind.
    let mut state = guard.clone();
    let now = Utc::now();

    let category_id = match state.category_named(&input.name).map(|c| c.id) {
      Some(existing_id) => {
        if let Some(requested_id) = input.category_id {
          if requested_id != existing_id {
            return Err(AppError::Conflict(format!(
              "Category '{}' already exists with id {}, not {}",
              input.name, existing_id, requested_id
            )));
          }
        }
        if let (Some(description), Some(category)) = (&input.description, state.categories.get_mut(&existing_id)) {
          category.description = description.clone();
          category.updated_at = now;
        }
        existing_id
      }
      None => {
        let id = state.next_id();
        state.categories.insert(
          id,
          Category {
            id,
            name: input.name.clone(),
            description: input.description.clone().unwrap_or_default(),
            created_at: now,
            updated_at: now,
          },
        );
        id
      }
    };

    for brand_input in &input.brands {
      let existing = state
        .brands
        .values_mut()
        .find(|b| b.matches(category_id, &brand_input.name, &brand_input.model));
      match existing {
        Some(brand) => {
          let restocked = brand
            .stock_count
            .checked_add(brand_input.stock_count)
            .filter(|stock| *stock >= 0)
            .ok_or_else(|| AppError::Validation(format!("Stock count for brand {} is out of range", brand.id)))?;
          brand.stock_count = restocked;
          brand.price_cents = brand_input.price_cents;
          if let Some(image_link) = &brand_input.image_link {
            brand.image_link = image_link.clone();
          }
          if let Some(description) = &brand_input.description {
            brand.description = description.clone();
          }
          if let Some(gallery_links) = &brand_input.gallery_links {
            brand.gallery_links = gallery_links.clone();
          }
          if brand_input.release_date.is_some() {
            brand.release_date = brand_input.release_date;
          }
          brand.updated_at = now;
        }
        None => {
          let id = state.next_id();
          state.brands.insert(
            id,
            Brand {
              id,
              category_id,
              name: brand_input.name.clone(),
              model: brand_input.model.clone(),
              price_cents: brand_input.price_cents,
              stock_count: brand_input.stock_count,
              image_link: brand_input.image_link.clone().unwrap_or_default(),
              gallery_links: brand_input.gallery_links.clone().unwrap_or_default(),
              description: brand_input.description.clone().unwrap_or_default(),
              release_date: brand_input.release_date,
              created_at: now,
              updated_at: now,
            },
          );
        }
      }
    }

    let result = state
      .categories
      .get(&category_id)
      .map(|c| state.with_brands(c))
      .ok_or_else(|| AppError::Internal(format!("Category {} vanished after upsert", category_id)))?;
    *guard = state;
    Ok(result)
  }

  async fn category_by_id(&self, category_id: i64) -> Result<Option<CategoryWithBrands>> {
    let state = self.state.lock().await;
    Ok(state.categories.get(&category_id).map(|c| state.with_brands(c)))
  }

  async fn category_by_name(&self, name: &str) -> Result<Option<CategoryWithBrands>> {
    let state = self.state.lock().await;
    Ok(state.category_named(name).map(|c| state.with_brands(c)))
  }

  async fn list_categories(&self) -> Result<Vec<Category>> {
    Ok(self.state.lock().await.categories.values().cloned().collect())
  }

  async fn list_brands(&self) -> Result<Vec<BrandWithCategory>> {
    let state = self.state.lock().await;
    Ok(state.brands.values().map(|b| state.brand_view(b)).collect())
  }

  async fn brand_by_id(&self, brand_id: i64) -> Result<Option<BrandWithCategory>> {
    let state = self.state.lock().await;
    Ok(state.brands.get(&brand_id).map(|b| state.brand_view(b)))
  }

  async fn brands_by_ids(&self, brand_ids: &[i64]) -> Result<Vec<BrandWithCategory>> {
    let state = self.state.lock().await;
    Ok(
      state
        .brands
        .values()
        .filter(|b| brand_ids.contains(&b.id))
        .map(|b| state.brand_view(b))
        .collect(),
    )
  }

  async fn update_category(&self, category_id: i64, patch: &CategoryPatch) -> Result<Category> {
    let mut state = self.state.lock().await;
    if let Some(name) = &patch.name {
      if state.category_named(name).is_some_and(|c| c.id != category_id) {
        return Err(AppError::Conflict("Category name is already taken".to_string()));
      }
    }
    let category = state
      .categories
      .get_mut(&category_id)
      .ok_or_else(|| AppError::NotFound(format!("Category {} not found", category_id)))?;
    if let Some(name) = &patch.name {
      category.name = name.clone();
    }
    if let Some(description) = &patch.description {
      category.description = description.clone();
    }
    category.updated_at = Utc::now();
    Ok(category.clone())
  }

  async fn update_brand(&self, brand_id: i64, patch: &BrandPatch) -> Result<Brand> {
    let mut state = self.state.lock().await;
    let current = state
      .brands
      .get(&brand_id)
      .cloned()
      .ok_or_else(|| AppError::NotFound(format!("Brand {} not found", brand_id)))?;
    if let Some(name) = &patch.name {
      let clash = state
        .brands
        .values()
        .any(|b| b.id != brand_id && b.matches(current.category_id, name, &current.model));
      if clash {
        return Err(AppError::Conflict(
          "A brand with this name and model already exists in the category".to_string(),
        ));
      }
    }
    let brand = state
      .brands
      .get_mut(&brand_id)
      .ok_or_else(|| AppError::NotFound(format!("Brand {} not found", brand_id)))?;
    if let Some(name) = &patch.name {
      brand.name = name.clone();
    }
    if let Some(price_cents) = patch.price_cents {
      brand.price_cents = price_cents;
    }
    brand.updated_at = Utc::now();
    Ok(brand.clone())
  }
}

#[async_trait]
impl CartStore for MemoryStore {
  async fn add_or_increment(&self, user_id: i64, brand: &Brand, quantity: i64) -> Result<CartLine> {
    let mut state = self.state.lock().await;
    let now = Utc::now();
    let existing = state
      .carts
      .values_mut()
      .find(|l| l.user_id == user_id && l.brand_id == brand.id && l.order_status);
    if let Some(line) = existing {
      let merged = line.quantity.checked_add(quantity).ok_or_else(quantity_too_large)?;
      line.total_cents = line_total(merged, brand.price_cents)?;
      line.quantity = merged;
      line.price_cents = brand.price_cents;
      line.updated_at = now;
      return Ok(line.clone());
    }
    let total_cents = line_total(quantity, brand.price_cents)?;
    let line = CartLine {
      id: state.next_id(),
      user_id,
      brand_id: brand.id,
      quantity,
      price_cents: brand.price_cents,
      total_cents,
      order_status: true,
      order_ref: None,
      created_at: now,
      updated_at: now,
    };
    state.carts.insert(line.id, line.clone());
    Ok(line)
  }

  async fn active_lines(&self, user_id: i64) -> Result<Vec<CartLineView>> {
    let state = self.state.lock().await;
    Ok(
      state
        .carts
        .values()
        .filter(|l| l.user_id == user_id && l.order_status)
        .map(|l| state.line_view(l))
        .collect(),
    )
  }

  async fn active_quantity(&self, user_id: i64, brand_id: i64) -> Result<i64> {
    let state = self.state.lock().await;
    Ok(
      state
        .carts
        .values()
        .filter(|l| l.user_id == user_id && l.brand_id == brand_id && l.order_status)
        .map(|l| l.quantity)
        .sum(),
    )
  }

  async fn clear(&self, user_id: i64) -> Result<u64> {
    let mut state = self.state.lock().await;
    let before = state.carts.len();
    state.carts.retain(|_, l| !(l.user_id == user_id && l.order_status));
    match (before - state.carts.len()) as u64 {
      0 => Err(AppError::CartEmpty),
      removed => Ok(removed),
    }
  }
}

#[async_trait]
impl OrderStore for MemoryStore {
  async fn begin_checkout(&self) -> Result<Box<dyn CheckoutTx>> {
    let guard = self.state.clone().lock_owned().await;
    let staged = guard.clone();
    Ok(Box::new(MemoryCheckoutTx { guard, staged }))
  }

  async fn history_for_user(&self, user_id: i64) -> Result<Vec<OrderHistoryRow>> {
    Ok(self.state.lock().await.history(Some(user_id)))
  }

  async fn all_history(&self) -> Result<Vec<OrderHistoryRow>> {
    Ok(self.state.lock().await.history(None))
  }
}

#[async_trait]
impl FavoriteStore for MemoryStore {
  async fn set_favorite(&self, user_id: i64, brand_id: i64, favorite: bool) -> Result<Favorite> {
    let mut state = self.state.lock().await;
    if let Some(row) = state
      .favorites
      .values_mut()
      .find(|f| f.user_id == user_id && f.brand_id == brand_id)
    {
      row.favorite = favorite;
      return Ok(row.clone());
    }
    let row = Favorite {
      id: state.next_id(),
      user_id,
      brand_id,
      favorite,
    };
    state.favorites.insert(row.id, row.clone());
    Ok(row)
  }

  async fn favorite_brand_ids(&self, user_id: i64) -> Result<Vec<i64>> {
    let state = self.state.lock().await;
    Ok(
      state
        .favorites
        .values()
        .filter(|f| f.user_id == user_id && f.favorite)
        .map(|f| f.brand_id)
        .collect(),
    )
  }
}

pub struct MemoryCheckoutTx {
  guard: OwnedMutexGuard<MemoryState>,
  staged: MemoryState,
}

#[async_trait]
impl CheckoutTx for MemoryCheckoutTx {
  async fn lock_cart_lines(&mut self, user_id: i64, cart_id: i64) -> Result<Vec<CartLineView>> {
    let state = &self.staged;
    Ok(
      state
        .carts
        .values()
        .filter(|l| l.id == cart_id && l.user_id == user_id && l.order_status)
        .map(|l| state.line_view(l))
        .collect(),
    )
  }

  async fn lock_brand_stock(&mut self, brand_id: i64) -> Result<Option<i64>> {
    Ok(self.staged.brands.get(&brand_id).map(|b| b.stock_count))
  }

  async fn insert_order(&mut self, user_id: i64, total_cents: i64) -> Result<Order> {
    let order = Order {
      id: self.staged.next_id(),
      user_id,
      total_cents,
      created_at: Utc::now(),
    };
    self.staged.orders.insert(order.id, order.clone());
    Ok(order)
  }

  async fn insert_order_item(&mut self, order_id: i64, item: &NewOrderItem) -> Result<OrderItem> {
    if !self.staged.orders.contains_key(&order_id) {
      return Err(AppError::Internal(format!("Order {} does not exist", order_id)));
    }
    let row = OrderItem {
      id: self.staged.next_id(),
      order_id,
      brand_id: item.brand_id,
      quantity: item.quantity,
      price_cents: item.price_cents,
    };
    self.staged.order_items.insert(row.id, row.clone());
    Ok(row)
  }

  async fn decrement_stock(&mut self, brand_id: i64, quantity: i64) -> Result<StockDecrement> {
    let Some(brand) = self.staged.brands.get_mut(&brand_id) else {
      return Ok(StockDecrement::Missing);
    };
    if brand.stock_count < quantity {
      return Ok(StockDecrement::Insufficient {
        available: brand.stock_count,
      });
    }
    brand.stock_count -= quantity;
    brand.updated_at = Utc::now();
    Ok(StockDecrement::Applied {
      remaining: brand.stock_count,
    })
  }

  async fn mark_consumed(&mut self, user_id: i64, order_id: i64, cart_id: i64) -> Result<u64> {
    let now = Utc::now();
    let mut changed = 0;
    for line in self
      .staged
      .carts
      .values_mut()
      .filter(|l| l.id == cart_id && l.user_id == user_id && l.order_status)
    {
      line.order_status = false;
      line.order_ref = Some(order_id);
      line.updated_at = now;
      changed += 1;
    }
    Ok(changed)
  }

  async fn commit(self: Box<Self>) -> Result<()> {
    let MemoryCheckoutTx { mut guard, staged } = *self;
    *guard = staged;
    Ok(())
  }

  async fn rollback(self: Box<Self>) -> Result<()> {
    Ok(())
  }
}
