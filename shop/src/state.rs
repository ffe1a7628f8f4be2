// src/state.rs

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::pipelines;
use crate::store::Repositories;
use ecart_flow::FlowRegistry;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
  pub repos: Repositories,
  pub flows: Arc<FlowRegistry<AppError>>,
  pub config: Arc<AppConfig>,
}

impl AppState {
  /// Builds the state and registers every workflow.
  pub fn new(repos: Repositories, config: AppConfig) -> Self {
    let flows = Arc::new(FlowRegistry::<AppError>::new());
    pipelines::register_all_pipelines(&flows);
    Self {
      repos,
      flows,
      config: Arc::new(config),
    }
  }

  /// State over a fresh in-memory store.
  pub fn in_memory(config: AppConfig) -> Self {
    Self::new(Repositories::in_memory(), config)
  }
}
