// src/web/handlers/product_handlers.rs

use crate::errors::AppError;
use crate::models::{BrandPatch, CategoryPatch, CategoryUpsert};
use crate::services::catalog_service;
use crate::state::AppState;
use crate::web::extractors::{AdminUser, AuthenticatedUser};
use actix_web::{web, HttpResponse};
use tracing::instrument;

#[instrument(name = "handler::list_categories", skip_all)]
pub async fn list_categories_handler(
  app_state: web::Data<AppState>,
  _auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  Ok(HttpResponse::Ok().json(catalog_service::list_categories(app_state.get_ref()).await?))
}

#[instrument(name = "handler::list_brands", skip_all)]
pub async fn list_brands_handler(
  app_state: web::Data<AppState>,
  _auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  Ok(HttpResponse::Ok().json(catalog_service::list_brands(app_state.get_ref()).await?))
}

#[instrument(name = "handler::get_brand", skip(app_state, _auth_user))]
pub async fn get_brand_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
  _auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let brand = catalog_service::brand_by_id(app_state.get_ref(), path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(brand))
}

#[instrument(name = "handler::get_category_by_id", skip(app_state, _auth_user))]
pub async fn get_category_by_id_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
  _auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let category = catalog_service::category_by_id(app_state.get_ref(), path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(category))
}

#[instrument(name = "handler::get_category_by_name", skip(app_state, _auth_user))]
pub async fn get_category_by_name_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
  _auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let category = catalog_service::category_by_name(app_state.get_ref(), &path).await?;
  Ok(HttpResponse::Ok().json(category))
}

#[instrument(name = "handler::upsert_category", skip(app_state, admin, req_payload), fields(admin_id = admin.user_id))]
pub async fn upsert_category_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  req_payload: web::Json<CategoryUpsert>,
) -> Result<HttpResponse, AppError> {
  let category = catalog_service::upsert_category(app_state.get_ref(), &req_payload).await?;
  Ok(HttpResponse::Ok().json(category))
}

#[instrument(name = "handler::update_category", skip(app_state, admin, req_payload), fields(admin_id = admin.user_id))]
pub async fn update_category_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  path: web::Path<i64>,
  req_payload: web::Json<CategoryPatch>,
) -> Result<HttpResponse, AppError> {
  let category = catalog_service::update_category(app_state.get_ref(), path.into_inner(), &req_payload).await?;
  Ok(HttpResponse::Ok().json(category))
}

#[instrument(name = "handler::update_brand", skip(app_state, admin, req_payload), fields(admin_id = admin.user_id))]
pub async fn update_brand_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  path: web::Path<i64>,
  req_payload: web::Json<BrandPatch>,
) -> Result<HttpResponse, AppError> {
  let brand = catalog_service::update_brand(app_state.get_ref(), path.into_inner(), &req_payload).await?;
  Ok(HttpResponse::Ok().json(brand))
}
