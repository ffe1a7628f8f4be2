// src/services/favorite_service.rs

use crate::dto::{BrandDetailResponse, FavoriteRequest};
use crate::errors::{AppError, Result};
use crate::models::Favorite;
use crate::services::account_service::require_active_user;
use crate::state::AppState;
use tracing::instrument;

#[instrument(name = "favorite_service::set_favorite", skip(state, request), fields(brand_id = request.brand_id))]
pub async fn set_favorite(state: &AppState, user_id: i64, request: &FavoriteRequest) -> Result<Favorite> {
  require_active_user(&state.repos, user_id).await?;
  if state.repos.catalog.brand_by_id(request.brand_id).await?.is_none() {
    return Err(AppError::NotFound(format!("Brand {} not found", request.brand_id)));
  }
  state
    .repos
    .favorites
    .set_favorite(user_id, request.brand_id, request.favorite)
    .await
}

pub async fn list_favorites(state: &AppState, user_id: i64) -> Result<Vec<BrandDetailResponse>> {
  require_active_user(&state.repos, user_id).await?;
  let brand_ids = state.repos.favorites.favorite_brand_ids(user_id).await?;
  if brand_ids.is_empty() {
    return Ok(Vec::new());
  }
  let brands = state.repos.catalog.brands_by_ids(&brand_ids).await?;
  Ok(brands.iter().map(BrandDetailResponse::from).collect())
}
