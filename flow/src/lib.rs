// src/lib.rs

//! ecart-flow: asynchronous named-step workflows.
//!
//! A workflow is an ordered list of named steps. Each step can carry
//! `before`, `on` and `after` handlers, all of which receive a clone of the
//! shared [`ContextData`]. Handlers decide whether the run continues or
//! stops, and any handler error halts the run after the workflow's failure
//! hooks have had a chance to clean up.
//!
//! The [`FlowRegistry`] keys workflows by their context data type so an
//! application can register each business process once at startup and run it
//! from anywhere that holds the registry.

pub mod core;
pub mod error;
pub mod registry;
pub mod workflow;

pub use crate::core::context::{FailureHook, Handler};
pub use crate::core::context_data::ContextData;
pub use crate::core::control::{StepControl, WorkflowOutcome};
pub use crate::core::step::{SkipCondition, StepDef};

pub use crate::workflow::definition::Workflow;

pub use crate::error::{FlowError, FlowResult};

pub use crate::registry::FlowRegistry;
