// src/error.rs
use thiserror::Error;

/// Errors raised by the engine itself, as opposed to errors returned by
/// application handlers.
#[derive(Debug, Error)]
pub enum FlowError {
  #[error("Step not found: {step_name}")]
  StepNotFound { step_name: String },

  #[error("Handler missing for non-optional step: {step_name}")]
  HandlerMissing { step_name: String },

  #[error("Type mismatch during context downcast (expected {expected_type})")]
  TypeMismatch { expected_type: String },

  #[error("No workflow registered for context type {type_name}")]
  NotRegistered { type_name: String },
}

pub type FlowResult<T, E = FlowError> = std::result::Result<T, E>;
