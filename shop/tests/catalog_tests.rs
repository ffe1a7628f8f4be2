// tests/catalog_tests.rs
mod common;

use common::*;
use ecart::dto::FavoriteRequest;
use ecart::errors::AppError;
use ecart::models::{BrandPatch, CategoryPatch};
use ecart::services::{catalog_service, favorite_service};
use serial_test::serial;

#[tokio::test]
#[serial]
async fn test_restock_adds_stock_and_overwrites_price() {
  let state = memory_state();
  let first = seed_category(&state, "Phones", vec![brand_input("Acme", 1_000, 5)]).await;
  let second = seed_category(&state, "phones", vec![brand_input("ACME", 1_200, 3)]).await;

  assert_eq!(first.category_id, second.category_id);
  assert_eq!(second.category_name, "Phones");
  assert_eq!(second.brands.len(), 1);
  assert_eq!(second.brands[0].brand_id, first.brands[0].brand_id);
  assert_eq!(second.brands[0].stock_count, 8);
  assert_eq!(second.brands[0].price_cents, 1_200);
  assert_eq!(catalog_service::list_categories(&state).await.unwrap().len(), 1);
}

#[tokio::test]
#[serial]
async fn test_upsert_with_mismatched_id_conflicts() {
  let state = memory_state();
  let phones = seed_category(&state, "Phones", vec![brand_input("Acme", 1_000, 5)]).await;

  let mut input = category_input("Phones", vec![brand_input("Acme", 1_000, 5)]);
  input.category_id = Some(phones.category_id + 100);
  let err = catalog_service::upsert_category(&state, &input).await.unwrap_err();

  assert!(matches!(err, AppError::Conflict(_)));
  assert_eq!(stock_of(&state, phones.brands[0].brand_id).await, 5);
}

#[tokio::test]
#[serial]
async fn test_new_brand_with_distinct_model_is_inserted() {
  let state = memory_state();
  seed_category(&state, "Phones", vec![brand_input("Acme", 1_000, 5)]).await;
  let mut pro = brand_input("Acme", 2_000, 2);
  pro.model = "Pro".to_string();
  let category = seed_category(&state, "Phones", vec![pro]).await;

  assert_eq!(category.brands.len(), 2);
  let brands = catalog_service::list_brands(&state).await.unwrap();
  assert_eq!(brands.len(), 2);
  assert!(brands.iter().all(|b| b.category_name == "Phones"));
}

#[tokio::test]
#[serial]
async fn test_lookups_report_not_found() {
  let state = memory_state();
  let phones = seed_category(&state, "Phones", vec![brand_input("Acme", 1_000, 5)]).await;

  let by_name = catalog_service::category_by_name(&state, "PHONES").await.unwrap();
  assert_eq!(by_name.category_id, phones.category_id);
  let by_id = catalog_service::category_by_id(&state, phones.category_id).await.unwrap();
  assert_eq!(by_id.brands.len(), 1);

  assert!(matches!(
    catalog_service::category_by_name(&state, "Tablets").await,
    Err(AppError::NotFound(_))
  ));
  assert!(matches!(
    catalog_service::category_by_id(&state, 9_999).await,
    Err(AppError::NotFound(_))
  ));
  assert!(matches!(
    catalog_service::brand_by_id(&state, 9_999).await,
    Err(AppError::NotFound(_))
  ));
}

#[tokio::test]
#[serial]
async fn test_patches_update_fields_and_reject_empty() {
  let state = memory_state();
  let phones = seed_category(&state, "Phones", vec![brand_input("Acme", 1_000, 5)]).await;
  let brand_id = phones.brands[0].brand_id;

  let empty = catalog_service::update_brand(&state, brand_id, &BrandPatch::default()).await;
  assert!(matches!(empty, Err(AppError::Validation(_))));
  let negative = catalog_service::update_brand(
    &state,
    brand_id,
    &BrandPatch {
      name: None,
      price_cents: Some(-5),
    },
  )
  .await;
  assert!(matches!(negative, Err(AppError::Validation(_))));

  let brand = catalog_service::update_brand(
    &state,
    brand_id,
    &BrandPatch {
      name: Some("Acme One".to_string()),
      price_cents: Some(900),
    },
  )
  .await
  .unwrap();
  assert_eq!(brand.name, "Acme One");
  assert_eq!(brand.price_cents, 900);
  assert_eq!(brand.stock_count, 5);

  let category = catalog_service::update_category(
    &state,
    phones.category_id,
    &CategoryPatch {
      name: None,
      description: Some("Handsets".to_string()),
    },
  )
  .await
  .unwrap();
  assert_eq!(category.description, "Handsets");
  assert!(matches!(
    catalog_service::update_category(&state, 9_999, &CategoryPatch {
      name: Some("Ghost".to_string()),
      description: None,
    })
    .await,
    Err(AppError::NotFound(_))
  ));
}

#[tokio::test]
#[serial]
async fn test_favorites_toggle_and_list() {
  let state = memory_state();
  let phones = seed_category(
    &state,
    "Phones",
    vec![brand_input("Acme", 1_000, 5), brand_input("Zeta", 700, 5)],
  )
  .await;
  let user_id = create_customer(&state, "fiona").await;
  let acme = phones.brands[0].brand_id;
  let zeta = phones.brands[1].brand_id;

  for brand_id in [acme, zeta] {
    favorite_service::set_favorite(&state, user_id, &FavoriteRequest { brand_id, favorite: true })
      .await
      .unwrap();
  }
  favorite_service::set_favorite(&state, user_id, &FavoriteRequest { brand_id: zeta, favorite: false })
    .await
    .unwrap();

  let favorites = favorite_service::list_favorites(&state, user_id).await.unwrap();
  assert_eq!(favorites.len(), 1);
  assert_eq!(favorites[0].brand_id, acme);

  let unknown = favorite_service::set_favorite(&state, user_id, &FavoriteRequest {
    brand_id: 9_999,
    favorite: true,
  })
  .await;
  assert!(matches!(unknown, Err(AppError::NotFound(_))));
}

#[tokio::test]
#[serial]
async fn test_restock_overflow_is_rejected_and_keeps_stock() {
  let state = memory_state();
  let phones = seed_category(&state, "Phones", vec![brand_input("Acme", 1_000, i64::MAX)]).await;
  let brand_id = phones.brands[0].brand_id;

  let input = category_input("Phones", vec![brand_input("Acme", 1_000, 1)]);
  let err = catalog_service::upsert_category(&state, &input).await.unwrap_err();

  assert!(matches!(err, AppError::Validation(_)), "got {:?}", err);
  assert_eq!(stock_of(&state, brand_id).await, i64::MAX);
}

#[tokio::test]
#[serial]
async fn test_names_match_case_insensitively_beyond_ascii() {
  let state = memory_state();
  let first = seed_category(&state, "Écrans", vec![brand_input("Éclair", 1_000, 2)]).await;
  let second = seed_category(&state, "écrans", vec![brand_input("ÉCLAIR", 1_000, 3)]).await;

  assert_eq!(first.category_id, second.category_id);
  assert_eq!(second.brands.len(), 1);
  assert_eq!(second.brands[0].stock_count, 5);
  assert_eq!(catalog_service::list_categories(&state).await.unwrap().len(), 1);

  let found = catalog_service::category_by_name(&state, "ÉCRANS").await.unwrap();
  assert_eq!(found.category_id, first.category_id);
}
