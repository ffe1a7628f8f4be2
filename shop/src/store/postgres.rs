// src/store/postgres.rs

//! PostgreSQL implementation of the store traits.
//!
//! Brand rows are locked with `SELECT ... FOR UPDATE` both by restocking
//! upserts and by checkout, so a restock and an order on the same brand
//! serialize on the row.

use crate::errors::{map_out_of_range, map_unique_violation, AppError, Result};
use crate::models::{
  Brand, BrandPatch, BrandWithCategory, CartLine, CartLineView, Category, CategoryPatch, CategoryUpsert,
  CategoryWithBrands, Favorite, NewOrderItem, NewUser, Order, OrderHistoryRow, OrderItem, ProfilePatch, User,
};
use crate::store::{CartStore, CatalogStore, CheckoutTx, FavoriteStore, OrderStore, StockDecrement, UserStore};
use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, instrument};

macro_rules! user_columns {
  () => {
    "id, username, password, address, pincode, phone_number, mail, active, is_admin, created_at, updated_at"
  };
}

macro_rules! category_columns {
  () => {
    "id, name, description, created_at, updated_at"
  };
}

macro_rules! brand_columns {
  () => {
    "b.id, b.category_id, b.name, b.model, b.price_cents, b.stock_count, b.image_link, b.gallery_links, \
     b.description, b.release_date, b.created_at, b.updated_at"
  };
}

macro_rules! cart_line_view_select {
  () => {
    "SELECT c.id, c.user_id, c.brand_id, c.quantity, c.price_cents, c.total_cents, c.order_status, c.order_ref, \
     c.created_at, c.updated_at, b.name AS brand_name, b.category_id \
     FROM carts c JOIN brands b ON b.id = c.brand_id"
  };
}

macro_rules! order_history_select {
  () => {
    "SELECT o.id AS order_id, o.user_id, o.total_cents, o.created_at AS ordered_at, \
     u.username, u.mail, u.address, u.pincode, u.phone_number, \
     oi.brand_id, b.name AS brand_name, b.category_id, oi.quantity, oi.price_cents \
     FROM orders o \
     JOIN userdetails u ON u.id = o.user_id \
     JOIN order_items oi ON oi.order_id = o.id \
     JOIN brands b ON b.id = oi.brand_id"
  };
}

#[derive(Clone)]
pub struct PgStore {
  pool: PgPool,
}

impl PgStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  async fn brands_of_category(&self, category_id: i64) -> Result<Vec<Brand>> {
    let brands = sqlx::query_as::<_, Brand>(concat!(
      "SELECT ",
      brand_columns!(),
      " FROM brands b WHERE b.category_id = $1 ORDER BY b.id"
    ))
    .bind(category_id)
    .fetch_all(&self.pool)
    .await?;
    Ok(brands)
  }

  async fn with_brands(&self, category: Option<Category>) -> Result<Option<CategoryWithBrands>> {
    match category {
      Some(category) => {
        let brands = self.brands_of_category(category.id).await?;
        Ok(Some(CategoryWithBrands { category, brands }))
      }
      None => Ok(None),
    }
  }
}

#[async_trait]
impl UserStore for PgStore {
  #[instrument(name = "pg::user::create", skip(self, new_user), fields(username = %new_user.username), err(Display))]
  async fn create(&self, new_user: NewUser) -> Result<User> {
    sqlx::query_as::<_, User>(concat!(
      "INSERT INTO userdetails (username, password, address, pincode, phone_number, mail, is_admin) \
       VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING ",
      user_columns!()
    ))
    .bind(&new_user.username)
    .bind(&new_user.password_hash)
    .bind(&new_user.address)
    .bind(new_user.pincode)
    .bind(new_user.phone_number)
    .bind(&new_user.mail)
    .bind(new_user.is_admin)
    .fetch_one(&self.pool)
    .await
    .map_err(|e| map_unique_violation(e, format!("Username '{}' is already taken", new_user.username)))
  }

  async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(concat!("SELECT ", user_columns!(), " FROM userdetails WHERE username = $1"))
      .bind(username)
      .fetch_optional(&self.pool)
      .await?;
    Ok(user)
  }

  async fn find_by_id(&self, user_id: i64) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(concat!("SELECT ", user_columns!(), " FROM userdetails WHERE id = $1"))
      .bind(user_id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(user)
  }

  async fn update_profile(&self, user_id: i64, patch: &ProfilePatch) -> Result<User> {
    sqlx::query_as::<_, User>(concat!(
      "UPDATE userdetails SET \
         username = COALESCE($2, username), \
         address = COALESCE($3, address), \
         pincode = COALESCE($4, pincode), \
         phone_number = COALESCE($5, phone_number), \
         mail = COALESCE($6, mail), \
         updated_at = NOW() \
       WHERE id = $1 RETURNING ",
      user_columns!()
    ))
    .bind(user_id)
    .bind(patch.username.as_deref())
    .bind(patch.address.as_deref())
    .bind(patch.pincode)
    .bind(patch.phone_number)
    .bind(patch.mail.as_deref())
    .fetch_optional(&self.pool)
    .await
    .map_err(|e| map_unique_violation(e, "Username is already taken"))?
    .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))
  }

  async fn update_password(&self, user_id: i64, password_hash: &str) -> Result<()> {
    let result = sqlx::query("UPDATE userdetails SET password = $2, updated_at = NOW() WHERE id = $1")
      .bind(user_id)
      .bind(password_hash)
      .execute(&self.pool)
      .await?;
    if result.rows_affected() == 0 {
      return Err(AppError::NotFound(format!("User {} not found", user_id)));
    }
    Ok(())
  }

  async fn set_active(&self, user_id: i64, active: bool) -> Result<()> {
    let result = sqlx::query("UPDATE userdetails SET active = $2, updated_at = NOW() WHERE id = $1")
      .bind(user_id)
      .bind(active)
      .execute(&self.pool)
      .await?;
    if result.rows_affected() == 0 {
      return Err(AppError::NotFound(format!("User {} not found", user_id)));
    }
    Ok(())
  }

  async fn list_customers(&self, active: bool) -> Result<Vec<User>> {
    let users = sqlx::query_as::<_, User>(concat!(
      "SELECT ",
      user_columns!(),
      " FROM userdetails WHERE active = $1 AND NOT is_admin ORDER BY id"
    ))
    .bind(active)
    .fetch_all(&self.pool)
    .await?;
    Ok(users)
  }
}

#[async_trait]
impl CatalogStore for PgStore {
  #[instrument(name = "pg::catalog::upsert_category", skip(self, input), fields(category = %input.name, brands = input.brands.len()), err(Display))]
  async fn upsert_category(&self, input: &CategoryUpsert) -> Result<CategoryWithBrands> {
    let mut tx = self.pool.begin().await?;

    let existing = sqlx::query_as::<_, Category>(concat!(
      "SELECT ",
      category_columns!(),
      " FROM categories WHERE LOWER(name) = LOWER($1) FOR UPDATE"
    ))
    .bind(&input.name)
    .fetch_optional(&mut *tx)
    .await?;

    let category_id = match existing {
      Some(category) => {
        if let Some(requested_id) = input.category_id {
          if requested_id != category.id {
            return Err(AppError::Conflict(format!(
              "Category '{}' already exists with id {}, not {}",
              category.name, category.id, requested_id
            )));
          }
        }
        if let Some(description) = &input.description {
          sqlx::query("UPDATE categories SET description = $2, updated_at = NOW() WHERE id = $1")
            .bind(category.id)
            .bind(description)
            .execute(&mut *tx)
            .await?;
        }
        category.id
      }
      None => sqlx::query_scalar::<_, i64>("INSERT INTO categories (name, description) VALUES ($1, $2) RETURNING id")
        .bind(&input.name)
        .bind(input.description.as_deref().unwrap_or_default())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, format!("Category '{}' was created concurrently", input.name)))?,
    };

    // Brand rows are locked in name order.
    let mut brands: Vec<_> = input.brands.iter().collect();
    brands.sort_by_cached_key(|b| (b.name.to_lowercase(), b.model.to_lowercase()));

    for brand in brands {
      let existing_id = sqlx::query_scalar::<_, i64>(
        "SELECT id FROM brands \
         WHERE category_id = $1 AND LOWER(name) = LOWER($2) AND LOWER(model) = LOWER($3) FOR UPDATE",
      )
      .bind(category_id)
      .bind(&brand.name)
      .bind(&brand.model)
      .fetch_optional(&mut *tx)
      .await?;

      match existing_id {
        Some(brand_id) => {
          debug!(brand_id, added = brand.stock_count, "Restocking existing brand.");
          sqlx::query(
            "UPDATE brands SET \
               stock_count = stock_count + $2, \
               price_cents = $3, \
               image_link = COALESCE($4, image_link), \
               description = COALESCE($5, description), \
               gallery_links = COALESCE($6, gallery_links), \
               release_date = COALESCE($7, release_date), \
               updated_at = NOW() \
             WHERE id = $1",
          )
          .bind(brand_id)
          .bind(brand.stock_count)
          .bind(brand.price_cents)
          .bind(brand.image_link.as_deref())
          .bind(brand.description.as_deref())
          .bind(brand.gallery_links.as_ref().map(Json))
          .bind(brand.release_date)
          .execute(&mut *tx)
          .await
          .map_err(|e| map_out_of_range(e, format!("Stock count for brand {} is out of range", brand_id)))?;
        }
        None => {
          debug!(brand = %brand.name, model = %brand.model, "Inserting new brand.");
          sqlx::query(
            "INSERT INTO brands \
               (category_id, name, model, price_cents, stock_count, image_link, gallery_links, description, release_date) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
          )
          .bind(category_id)
          .bind(&brand.name)
          .bind(&brand.model)
          .bind(brand.price_cents)
          .bind(brand.stock_count)
          .bind(brand.image_link.as_deref().unwrap_or_default())
          .bind(Json(brand.gallery_links.clone().unwrap_or_default()))
          .bind(brand.description.as_deref().unwrap_or_default())
          .bind(brand.release_date)
          .execute(&mut *tx)
          .await?;
        }
      }
    }

    tx.commit().await?;

    self
      .category_by_id(category_id)
      .await?
      .ok_or_else(|| AppError::Internal(format!("Category {} vanished after upsert", category_id)))
  }

  async fn category_by_id(&self, category_id: i64) -> Result<Option<CategoryWithBrands>> {
    let category = sqlx::query_as::<_, Category>(concat!("SELECT ", category_columns!(), " FROM categories WHERE id = $1"))
      .bind(category_id)
      .fetch_optional(&self.pool)
      .await?;
    self.with_brands(category).await
  }

  async fn category_by_name(&self, name: &str) -> Result<Option<CategoryWithBrands>> {
    let category = sqlx::query_as::<_, Category>(concat!(
      "SELECT ",
      category_columns!(),
      " FROM categories WHERE LOWER(name) = LOWER($1)"
    ))
    .bind(name)
    .fetch_optional(&self.pool)
    .await?;
    self.with_brands(category).await
  }

  async fn list_categories(&self) -> Result<Vec<Category>> {
    let categories = sqlx::query_as::<_, Category>(concat!("SELECT ", category_columns!(), " FROM categories ORDER BY id"))
      .fetch_all(&self.pool)
      .await?;
    Ok(categories)
  }

  async fn list_brands(&self) -> Result<Vec<BrandWithCategory>> {
    let brands = sqlx::query_as::<_, BrandWithCategory>(concat!(
      "SELECT ",
      brand_columns!(),
      ", c.name AS category_name FROM brands b JOIN categories c ON c.id = b.category_id ORDER BY b.id"
    ))
    .fetch_all(&self.pool)
    .await?;
    Ok(brands)
  }

  async fn brand_by_id(&self, brand_id: i64) -> Result<Option<BrandWithCategory>> {
    let brand = sqlx::query_as::<_, BrandWithCategory>(concat!(
      "SELECT ",
      brand_columns!(),
      ", c.name AS category_name FROM brands b JOIN categories c ON c.id = b.category_id WHERE b.id = $1"
    ))
    .bind(brand_id)
    .fetch_optional(&self.pool)
    .await?;
    Ok(brand)
  }

  async fn brands_by_ids(&self, brand_ids: &[i64]) -> Result<Vec<BrandWithCategory>> {
    let brands = sqlx::query_as::<_, BrandWithCategory>(concat!(
      "SELECT ",
      brand_columns!(),
      ", c.name AS category_name FROM brands b JOIN categories c ON c.id = b.category_id \
       WHERE b.id = ANY($1) ORDER BY b.id"
    ))
    .bind(brand_ids)
    .fetch_all(&self.pool)
    .await?;
    Ok(brands)
  }

  async fn update_category(&self, category_id: i64, patch: &CategoryPatch) -> Result<Category> {
    sqlx::query_as::<_, Category>(concat!(
      "UPDATE categories SET name = COALESCE($2, name), description = COALESCE($3, description), updated_at = NOW() \
       WHERE id = $1 RETURNING ",
      category_columns!()
    ))
    .bind(category_id)
    .bind(patch.name.as_deref())
    .bind(patch.description.as_deref())
    .fetch_optional(&self.pool)
    .await
    .map_err(|e| map_unique_violation(e, "Category name is already taken"))?
    .ok_or_else(|| AppError::NotFound(format!("Category {} not found", category_id)))
  }

  async fn update_brand(&self, brand_id: i64, patch: &BrandPatch) -> Result<Brand> {
    sqlx::query_as::<_, Brand>(concat!(
      "UPDATE brands b SET name = COALESCE($2, b.name), price_cents = COALESCE($3, b.price_cents), updated_at = NOW() \
       WHERE b.id = $1 RETURNING ",
      brand_columns!()
    ))
    .bind(brand_id)
    .bind(patch.name.as_deref())
    .bind(patch.price_cents)
    .fetch_optional(&self.pool)
    .await
    .map_err(|e| map_unique_violation(e, "A brand with this name and model already exists in the category"))?
    .ok_or_else(|| AppError::NotFound(format!("Brand {} not found", brand_id)))
  }
}

#[async_trait]
impl CartStore for PgStore {
  #[instrument(name = "pg::cart::add_or_increment", skip(self, brand), fields(brand_id = brand.id), err(Display))]
  async fn add_or_increment(&self, user_id: i64, brand: &Brand, quantity: i64) -> Result<CartLine> {
    let line = sqlx::query_as::<_, CartLine>(
      "INSERT INTO carts (user_id, brand_id, quantity, price_cents, total_cents) \
       VALUES ($1, $2, $3, $4, $3 * $4) \
       ON CONFLICT (user_id, brand_id) WHERE order_status DO UPDATE SET \
         quantity = carts.quantity + EXCLUDED.quantity, \
         price_cents = EXCLUDED.price_cents, \
         total_cents = (carts.quantity + EXCLUDED.quantity) * EXCLUDED.price_cents, \
         updated_at = NOW() \
       RETURNING id, user_id, brand_id, quantity, price_cents, total_cents, order_status, order_ref, created_at, updated_at",
    )
    .bind(user_id)
    .bind(brand.id)
    .bind(quantity)
    .bind(brand.price_cents)
    .fetch_one(&self.pool)
    .await
    .map_err(|e| map_out_of_range(e, "Quantity is too large."))?;
    Ok(line)
  }

  async fn active_lines(&self, user_id: i64) -> Result<Vec<CartLineView>> {
    let lines = sqlx::query_as::<_, CartLineView>(concat!(
      cart_line_view_select!(),
      " WHERE c.user_id = $1 AND c.order_status ORDER BY c.id"
    ))
    .bind(user_id)
    .fetch_all(&self.pool)
    .await?;
    Ok(lines)
  }

  async fn active_quantity(&self, user_id: i64, brand_id: i64) -> Result<i64> {
    let quantity = sqlx::query_scalar::<_, i64>(
      "SELECT COALESCE(SUM(quantity), 0)::BIGINT FROM carts WHERE user_id = $1 AND brand_id = $2 AND order_status",
    )
    .bind(user_id)
    .bind(brand_id)
    .fetch_one(&self.pool)
    .await?;
    Ok(quantity)
  }

  async fn clear(&self, user_id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM carts WHERE user_id = $1 AND order_status")
      .bind(user_id)
      .execute(&self.pool)
      .await?;
    match result.rows_affected() {
      0 => Err(AppError::CartEmpty),
      n => Ok(n),
    }
  }
}

#[async_trait]
impl OrderStore for PgStore {
  async fn begin_checkout(&self) -> Result<Box<dyn CheckoutTx>> {
    let tx = self.pool.begin().await?;
    Ok(Box::new(PgCheckoutTx { tx }))
  }

  async fn history_for_user(&self, user_id: i64) -> Result<Vec<OrderHistoryRow>> {
    let rows = sqlx::query_as::<_, OrderHistoryRow>(concat!(
      order_history_select!(),
      " WHERE o.user_id = $1 ORDER BY o.created_at DESC, o.id DESC, oi.id"
    ))
    .bind(user_id)
    .fetch_all(&self.pool)
    .await?;
    Ok(rows)
  }

  async fn all_history(&self) -> Result<Vec<OrderHistoryRow>> {
    let rows = sqlx::query_as::<_, OrderHistoryRow>(concat!(
      order_history_select!(),
      " ORDER BY o.created_at DESC, o.id DESC, oi.id"
    ))
    .fetch_all(&self.pool)
    .await?;
    Ok(rows)
  }
}

#[async_trait]
impl FavoriteStore for PgStore {
  async fn set_favorite(&self, user_id: i64, brand_id: i64, favorite: bool) -> Result<Favorite> {
    let row = sqlx::query_as::<_, Favorite>(
      "INSERT INTO user_favorite_brands (user_id, brand_id, favorite) VALUES ($1, $2, $3) \
       ON CONFLICT (user_id, brand_id) DO UPDATE SET favorite = EXCLUDED.favorite, updated_at = NOW() \
       RETURNING id, user_id, brand_id, favorite",
    )
    .bind(user_id)
    .bind(brand_id)
    .bind(favorite)
    .fetch_one(&self.pool)
    .await?;
    Ok(row)
  }

  async fn favorite_brand_ids(&self, user_id: i64) -> Result<Vec<i64>> {
    let ids = sqlx::query_scalar::<_, i64>(
      "SELECT brand_id FROM user_favorite_brands WHERE user_id = $1 AND favorite ORDER BY id",
    )
    .bind(user_id)
    .fetch_all(&self.pool)
    .await?;
    Ok(ids)
  }
}

pub struct PgCheckoutTx {
  tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl CheckoutTx for PgCheckoutTx {
  async fn lock_cart_lines(&mut self, user_id: i64, cart_id: i64) -> Result<Vec<CartLineView>> {
    let lines = sqlx::query_as::<_, CartLineView>(concat!(
      cart_line_view_select!(),
      " WHERE c.user_id = $1 AND c.id = $2 AND c.order_status ORDER BY c.id FOR UPDATE OF c"
    ))
    .bind(user_id)
    .bind(cart_id)
    .fetch_all(&mut *self.tx)
    .await?;
    Ok(lines)
  }

  async fn lock_brand_stock(&mut self, brand_id: i64) -> Result<Option<i64>> {
    let stock = sqlx::query_scalar::<_, i64>("SELECT stock_count FROM brands WHERE id = $1 FOR UPDATE")
      .bind(brand_id)
      .fetch_optional(&mut *self.tx)
      .await?;
    Ok(stock)
  }

  async fn insert_order(&mut self, user_id: i64, total_cents: i64) -> Result<Order> {
    let order = sqlx::query_as::<_, Order>(
      "INSERT INTO orders (user_id, total_cents) VALUES ($1, $2) RETURNING id, user_id, total_cents, created_at",
    )
    .bind(user_id)
    .bind(total_cents)
    .fetch_one(&mut *self.tx)
    .await?;
    Ok(order)
  }

  async fn insert_order_item(&mut self, order_id: i64, item: &NewOrderItem) -> Result<OrderItem> {
    let row = sqlx::query_as::<_, OrderItem>(
      "INSERT INTO order_items (order_id, brand_id, quantity, price_cents) VALUES ($1, $2, $3, $4) \
       RETURNING id, order_id, brand_id, quantity, price_cents",
    )
    .bind(order_id)
    .bind(item.brand_id)
    .bind(item.quantity)
    .bind(item.price_cents)
    .fetch_one(&mut *self.tx)
    .await?;
    Ok(row)
  }

  async fn decrement_stock(&mut self, brand_id: i64, quantity: i64) -> Result<StockDecrement> {
    let remaining = sqlx::query_scalar::<_, i64>(
      "UPDATE brands SET stock_count = stock_count - $2, updated_at = NOW() \
       WHERE id = $1 AND stock_count >= $2 RETURNING stock_count",
    )
    .bind(brand_id)
    .bind(quantity)
    .fetch_optional(&mut *self.tx)
    .await?;
    if let Some(remaining) = remaining {
      return Ok(StockDecrement::Applied { remaining });
    }

    let available = sqlx::query_scalar::<_, i64>("SELECT stock_count FROM brands WHERE id = $1")
      .bind(brand_id)
      .fetch_optional(&mut *self.tx)
      .await?;
    Ok(match available {
      Some(available) => StockDecrement::Insufficient { available },
      None => StockDecrement::Missing,
    })
  }

  async fn mark_consumed(&mut self, user_id: i64, order_id: i64, cart_id: i64) -> Result<u64> {
    let result = sqlx::query(
      "UPDATE carts SET order_status = FALSE, order_ref = $3, updated_at = NOW() \
       WHERE user_id = $1 AND id = $2 AND order_status",
    )
    .bind(user_id)
    .bind(cart_id)
    .bind(order_id)
    .execute(&mut *self.tx)
    .await?;
    Ok(result.rows_affected())
  }

  async fn commit(self: Box<Self>) -> Result<()> {
    self.tx.commit().await?;
    Ok(())
  }

  async fn rollback(self: Box<Self>) -> Result<()> {
    self.tx.rollback().await?;
    Ok(())
  }
}
