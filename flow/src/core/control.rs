// src/core/control.rs

/// Returned by a handler to say whether the run goes on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepControl {
  Continue,
  /// Halt the run. No further handlers of this or later steps execute.
  Stop,
}

/// Outcome of a run that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowOutcome {
  /// Every step ran or was skipped.
  Completed,
  /// A handler returned `StepControl::Stop`.
  Stopped,
}
