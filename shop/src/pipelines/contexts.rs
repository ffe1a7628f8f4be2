// src/pipelines/contexts.rs

//! Root data types for the application workflows. Handlers receive them
//! wrapped in `ecart_flow::ContextData`.

use crate::dto::{AddCartItemRequest, CartItemResponse, ItemOrderedResponse, LoginRequest, SignupRequest};
use crate::models::{Brand, CartLineView, Order, User};
use crate::services::token_service::IssuedToken;
use crate::state::AppState;
use crate::store::CheckoutTx;
use parking_lot::Mutex;

pub struct SignupCtxData {
  pub app_state: AppState,
  pub request: SignupRequest,
  pub created_user_id: Option<i64>,
}

impl SignupCtxData {
  pub fn new(app_state: AppState, request: SignupRequest) -> Self {
    Self {
      app_state,
      request,
      created_user_id: None,
    }
  }
}

pub struct SigninCtxData {
  pub app_state: AppState,
  pub username: String,
  pub password: String,
  pub user: Option<User>,
  pub token: Option<IssuedToken>,
}

impl SigninCtxData {
  pub fn new(app_state: AppState, request: LoginRequest) -> Self {
    Self {
      app_state,
      username: request.username,
      password: request.password,
      user: None,
      token: None,
    }
  }
}

pub struct AddToCartCtxData {
  pub app_state: AppState,
  pub user_id: i64,
  pub brand_id: i64,
  pub category_id: i64,
  pub quantity: i64,
  pub brand: Option<Brand>,
  pub response: Option<CartItemResponse>,
}

impl AddToCartCtxData {
  pub fn new(app_state: AppState, user_id: i64, request: AddCartItemRequest) -> Self {
    Self {
      app_state,
      user_id,
      brand_id: request.brand_id,
      category_id: request.category_id,
      quantity: request.quantity,
      brand: None,
      response: None,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutStage {
  Validating,
  StockChecked,
  OrderPersisted,
  StockDecremented,
  CartMarked,
  Complete,
  Failed,
}

/// Holds the open checkout transaction between steps.
///
/// Steps take the transaction out, use it across `.await`, and put it back.
/// The mutex is only held for the swap.
#[derive(Default)]
pub struct TxSlot(Mutex<Option<Box<dyn CheckoutTx>>>);

impl TxSlot {
  pub fn put(&self, tx: Box<dyn CheckoutTx>) {
    *self.0.lock() = Some(tx);
  }

  pub fn take(&self) -> Option<Box<dyn CheckoutTx>> {
    self.0.lock().take()
  }

  pub fn is_open(&self) -> bool {
    self.0.lock().is_some()
  }
}

pub struct CheckoutCtxData {
  pub app_state: AppState,
  pub user_id: i64,
  pub cart_id: i64,
  pub stage: CheckoutStage,
  pub buyer: Option<User>,
  pub tx: TxSlot,
  pub lines: Vec<CartLineView>,
  pub total_cents: i64,
  pub order: Option<Order>,
  pub receipt: Option<ItemOrderedResponse>,
  pub failed_step: Option<String>,
}

impl CheckoutCtxData {
  pub fn new(app_state: AppState, user_id: i64, cart_id: i64) -> Self {
    Self {
      app_state,
      user_id,
      cart_id,
      stage: CheckoutStage::Validating,
      buyer: None,
      tx: TxSlot::default(),
      lines: Vec::new(),
      total_cents: 0,
      order: None,
      receipt: None,
      failed_step: None,
    }
  }
}
