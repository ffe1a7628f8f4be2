pub mod context;
pub mod context_data;
pub mod control;
pub mod step;

pub use context::{FailureHook, Handler};
pub use context_data::ContextData;
pub use control::{StepControl, WorkflowOutcome};
pub use step::StepDef;
