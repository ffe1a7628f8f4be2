// src/web/routes.rs

use crate::web::handlers::{
  admin_handlers, auth_handlers, cart_handlers, checkout_handlers, product_handlers, user_handlers,
};
use actix_web::web;

async fn health_check_handler() -> actix_web::HttpResponse {
  actix_web::HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/api/v1")
      .route("/health", web::get().to(health_check_handler))
      .route("/signup", web::post().to(auth_handlers::signup_handler))
      .route("/login", web::post().to(auth_handlers::login_handler))
      .service(
        web::scope("/user")
          .route("/profile", web::get().to(user_handlers::get_profile_handler))
          .route("/update", web::put().to(user_handlers::update_profile_handler))
          .route("/change/pwd", web::post().to(user_handlers::change_password_handler))
          .route("/cart/additem", web::post().to(cart_handlers::add_to_cart_handler))
          .route("/cart/view", web::get().to(cart_handlers::view_cart_handler))
          .route("/cart/clear", web::delete().to(cart_handlers::clear_cart_handler))
          .route("/cart/placeorder", web::post().to(checkout_handlers::place_order_handler))
          .route("/order/history", web::get().to(user_handlers::order_history_handler))
          .route("/favourite", web::post().to(user_handlers::set_favorite_handler))
          .route("/favourite", web::get().to(user_handlers::list_favorites_handler)),
      )
      .service(
        web::scope("/product")
          .route("/list/category", web::get().to(product_handlers::list_categories_handler))
          .route("/list/brand", web::get().to(product_handlers::list_brands_handler))
          .route("/brand/{id}", web::get().to(product_handlers::get_brand_handler))
          .route("/brand/{id}", web::put().to(product_handlers::update_brand_handler))
          .route("/category/id/{id}", web::get().to(product_handlers::get_category_by_id_handler))
          .route("/category/name/{name}", web::get().to(product_handlers::get_category_by_name_handler))
          .route("/category/{id}", web::put().to(product_handlers::update_category_handler))
          .route("/create", web::post().to(product_handlers::upsert_category_handler)),
      )
      .service(
        web::scope("/admin")
          .route("/block/userdetails", web::get().to(admin_handlers::list_blocked_users_handler))
          .route("/block/{user_id}", web::put().to(admin_handlers::block_user_handler))
          .route("/unblock/{user_id}", web::put().to(admin_handlers::unblock_user_handler))
          .route("/userdetails", web::get().to(admin_handlers::list_active_users_handler))
          .route("/order/history", web::get().to(admin_handlers::all_order_history_handler))
          .route("/order/history/{user_id}", web::get().to(admin_handlers::customer_order_history_handler)),
      ),
  );
}
