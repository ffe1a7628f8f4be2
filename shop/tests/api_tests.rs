// tests/api_tests.rs
mod common;

use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App, Error};
use common::*;
use ecart::config::AdminSeed;
use ecart::services::account_service;
use ecart::state::AppState;
use ecart::web::configure_app_routes;
use serde_json::{json, Value};
use serial_test::serial;

async fn init_app(
  state: &AppState,
) -> impl Service<actix_http::Request, Response = ServiceResponse, Error = Error> {
  test::init_service(
    App::new()
      .app_data(web::Data::new(state.clone()))
      .configure(configure_app_routes),
  )
  .await
}

async fn login_token(
  app: &impl Service<actix_http::Request, Response = ServiceResponse, Error = Error>,
  username: &str,
  password: &str,
) -> String {
  let req = test::TestRequest::post()
    .uri("/api/v1/login")
    .set_json(json!({ "username": username, "password": password }))
    .to_request();
  let body: Value = test::call_and_read_body_json(app, req).await;
  body["token"].as_str().expect("login response carries a token").to_string()
}

fn bearer(token: &str) -> (header::HeaderName, String) {
  (header::AUTHORIZATION, format!("Bearer {}", token))
}

#[actix_web::test]
#[serial]
async fn test_health_is_public() {
  let state = memory_state();
  let app = init_app(&state).await;

  let req = test::TestRequest::get().uri("/api/v1/health").to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(body["status"], "ok");
}

#[actix_web::test]
#[serial]
async fn test_signup_login_and_profile() {
  let state = memory_state();
  let app = init_app(&state).await;

  let req = test::TestRequest::post()
    .uri("/api/v1/signup")
    .set_json(json!({
      "username": "alice",
      "password": TEST_PASSWORD,
      "address": "12 Market Road",
      "pincode": 560001,
      "phoneNumber": 9876543210i64,
      "mail": "alice@example.com"
    }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let created: Value = test::read_body_json(resp).await;
  let user_id = created["userId"].as_i64().unwrap();

  let token = login_token(&app, "alice", TEST_PASSWORD).await;
  let req = test::TestRequest::get()
    .uri("/api/v1/user/profile")
    .insert_header(bearer(&token))
    .to_request();
  let profile: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(profile["userId"].as_i64(), Some(user_id));
  assert_eq!(profile["mail"], "alice@example.com");
  assert!(profile.get("password").is_none());
}

#[actix_web::test]
#[serial]
async fn test_missing_or_bad_token_is_unauthorized() {
  let state = memory_state();
  let app = init_app(&state).await;

  let req = test::TestRequest::get().uri("/api/v1/user/cart/view").to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["code"], "UNAUTHORIZED");

  let req = test::TestRequest::get()
    .uri("/api/v1/user/cart/view")
    .insert_header(bearer("not.a.jwt"))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
#[serial]
async fn test_customer_token_is_forbidden_on_admin_routes() {
  let state = memory_state();
  create_customer(&state, "bob").await;
  let app = init_app(&state).await;
  let token = login_token(&app, "bob", TEST_PASSWORD).await;

  let req = test::TestRequest::get()
    .uri("/api/v1/admin/userdetails")
    .insert_header(bearer(&token))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::FORBIDDEN);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["code"], "FORBIDDEN");
}

#[actix_web::test]
#[serial]
async fn test_catalog_cart_and_order_over_http() {
  let state = memory_state();
  let seed = AdminSeed {
    username: "root".to_string(),
    password: "root-password-1".to_string(),
    mail: "root@example.com".to_string(),
  };
  account_service::ensure_admin(&state.repos, &seed).await.unwrap();
  create_customer(&state, "carol").await;
  let app = init_app(&state).await;
  let admin_token = login_token(&app, "root", "root-password-1").await;
  let token = login_token(&app, "carol", TEST_PASSWORD).await;

  let req = test::TestRequest::post()
    .uri("/api/v1/product/create")
    .insert_header(bearer(&admin_token))
    .set_json(json!({
      "name": "Phones",
      "description": "Handsets",
      "brands": [{ "name": "Acme", "priceCents": 1000, "stockCount": 3 }]
    }))
    .to_request();
  let category: Value = test::call_and_read_body_json(&app, req).await;
  let category_id = category["categoryId"].as_i64().unwrap();
  let brand_id = category["brands"][0]["brandId"].as_i64().unwrap();

  let req = test::TestRequest::post()
    .uri("/api/v1/user/cart/additem")
    .insert_header(bearer(&token))
    .set_json(json!({ "brandId": brand_id, "categoryId": category_id, "quantity": 5 }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::CONFLICT);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["code"], "INSUFFICIENT_STOCK");
  assert_eq!(body["detail"]["available"], 3);

  let req = test::TestRequest::post()
    .uri("/api/v1/user/cart/additem")
    .insert_header(bearer(&token))
    .set_json(json!({ "brandId": brand_id, "categoryId": category_id, "quantity": 2 }))
    .to_request();
  let line: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(line["totalPriceCents"], 2000);
  let cart_id = line["cartId"].as_i64().unwrap();

  let req = test::TestRequest::post()
    .uri("/api/v1/user/cart/placeorder")
    .insert_header(bearer(&token))
    .set_json(json!({ "cartId": cart_id }))
    .to_request();
  let receipt: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(receipt["totalPriceCents"], 2000);
  assert_eq!(receipt["items"][0]["productId"].as_i64(), Some(brand_id));

  let req = test::TestRequest::post()
    .uri("/api/v1/user/cart/placeorder")
    .insert_header(bearer(&token))
    .set_json(json!({ "cartId": cart_id }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

  let req = test::TestRequest::get()
    .uri(&format!("/api/v1/product/brand/{}", brand_id))
    .insert_header(bearer(&token))
    .to_request();
  let brand: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(brand["stockCount"], 1);

  let req = test::TestRequest::get()
    .uri("/api/v1/admin/order/history")
    .insert_header(bearer(&admin_token))
    .to_request();
  let history: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(history.as_array().map(Vec::len), Some(1));
}
