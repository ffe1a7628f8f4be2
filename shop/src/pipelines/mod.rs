// src/pipelines/mod.rs

//! Workflows for the multi-step business processes: signup, signin,
//! add-to-cart and checkout.

use crate::errors::AppError;
use ecart_flow::FlowRegistry;

pub mod contexts;

pub mod cart_pipeline;
pub mod checkout_pipeline;
pub mod signin_pipeline;
pub mod signup_pipeline;

/// Registers every application workflow. Called once while building
/// `AppState`.
pub fn register_all_pipelines(flows: &FlowRegistry<AppError>) {
  tracing::info!("Registering workflows...");

  signup_pipeline::register_signup_pipeline(flows);
  signin_pipeline::register_signin_pipeline(flows);
  cart_pipeline::register_add_to_cart_pipeline(flows);
  checkout_pipeline::register_checkout_pipeline(flows);

  tracing::info!("All application workflows registered.");
}
