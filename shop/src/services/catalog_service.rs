// src/services/catalog_service.rs

use crate::dto::{BrandDetailResponse, CategoryDetailResponse, CategorySummary};
use crate::errors::{AppError, Result};
use crate::models::{Brand, BrandInput, BrandPatch, Category, CategoryPatch, CategoryUpsert};
use crate::state::AppState;
use tracing::{info, instrument};

fn normalize_brand(input: &BrandInput) -> Result<BrandInput> {
  let name = input.name.trim();
  if name.is_empty() {
    return Err(AppError::Validation("Brand name is required.".to_string()));
  }
  if input.price_cents < 0 {
    return Err(AppError::Validation(format!("Price of '{}' cannot be negative.", name)));
  }
  if input.stock_count < 0 {
    return Err(AppError::Validation(format!("Stock of '{}' cannot be negative.", name)));
  }

  Ok(BrandInput {
    name: name.to_string(),
    model: input.model.trim().to_string(),
    gallery_links: input
      .gallery_links
      .as_ref()
      .map(|links| links.iter().map(|l| l.trim().to_string()).filter(|l| !l.is_empty()).collect()),
    ..input.clone()
  })
}

/// Validates an upsert request and trims its names.
pub fn normalize_upsert(input: &CategoryUpsert) -> Result<CategoryUpsert> {
  let name = input.name.trim();
  if name.is_empty() {
    return Err(AppError::Validation("Category name is required.".to_string()));
  }
  let brands = input.brands.iter().map(normalize_brand).collect::<Result<Vec<_>>>()?;

  Ok(CategoryUpsert {
    category_id: input.category_id,
    name: name.to_string(),
    description: input.description.as_deref().map(|d| d.trim().to_string()),
    brands,
  })
}

/// Creates or restocks a category. Existing brands get the supplied stock
/// added and their price overwritten.
#[instrument(name = "catalog_service::upsert_category", skip(state, input), fields(category = %input.name, brands = input.brands.len()))]
pub async fn upsert_category(state: &AppState, input: &CategoryUpsert) -> Result<CategoryDetailResponse> {
  let input = normalize_upsert(input)?;
  let category = state.repos.catalog.upsert_category(&input).await?;
  info!(category_id = category.category.id, "Category upserted.");
  Ok(CategoryDetailResponse::from(&category))
}

pub async fn list_categories(state: &AppState) -> Result<Vec<CategorySummary>> {
  let categories = state.repos.catalog.list_categories().await?;
  Ok(categories.iter().map(CategorySummary::from).collect())
}

pub async fn list_brands(state: &AppState) -> Result<Vec<BrandDetailResponse>> {
  let brands = state.repos.catalog.list_brands().await?;
  Ok(brands.iter().map(BrandDetailResponse::from).collect())
}

pub async fn brand_by_id(state: &AppState, brand_id: i64) -> Result<BrandDetailResponse> {
  state
    .repos
    .catalog
    .brand_by_id(brand_id)
    .await?
    .map(|brand| BrandDetailResponse::from(&brand))
    .ok_or_else(|| AppError::NotFound(format!("Brand {} not found", brand_id)))
}

pub async fn category_by_id(state: &AppState, category_id: i64) -> Result<CategoryDetailResponse> {
  state
    .repos
    .catalog
    .category_by_id(category_id)
    .await?
    .map(|category| CategoryDetailResponse::from(&category))
    .ok_or_else(|| AppError::NotFound(format!("Category {} not found", category_id)))
}

pub async fn category_by_name(state: &AppState, name: &str) -> Result<CategoryDetailResponse> {
  let name = name.trim();
  state
    .repos
    .catalog
    .category_by_name(name)
    .await?
    .map(|category| CategoryDetailResponse::from(&category))
    .ok_or_else(|| AppError::NotFound(format!("Category '{}' not found", name)))
}

#[instrument(name = "catalog_service::update_category", skip(state, patch))]
pub async fn update_category(state: &AppState, category_id: i64, patch: &CategoryPatch) -> Result<Category> {
  if patch.is_empty() {
    return Err(AppError::Validation("Nothing to update.".to_string()));
  }
  let name = patch.name.as_deref().map(str::trim);
  if name.is_some_and(str::is_empty) {
    return Err(AppError::Validation("Category name cannot be blank.".to_string()));
  }
  let patch = CategoryPatch {
    name: name.map(str::to_string),
    description: patch.description.as_deref().map(|d| d.trim().to_string()),
  };
  state.repos.catalog.update_category(category_id, &patch).await
}

#[instrument(name = "catalog_service::update_brand", skip(state, patch))]
pub async fn update_brand(state: &AppState, brand_id: i64, patch: &BrandPatch) -> Result<Brand> {
  if patch.is_empty() {
    return Err(AppError::Validation("Nothing to update.".to_string()));
  }
  let name = patch.name.as_deref().map(str::trim);
  if name.is_some_and(str::is_empty) {
    return Err(AppError::Validation("Brand name cannot be blank.".to_string()));
  }
  if patch.price_cents.is_some_and(|price| price < 0) {
    return Err(AppError::Validation("Price cannot be negative.".to_string()));
  }
  let patch = BrandPatch {
    name: name.map(str::to_string),
    price_cents: patch.price_cents,
  };
  state.repos.catalog.update_brand(brand_id, &patch).await
}
