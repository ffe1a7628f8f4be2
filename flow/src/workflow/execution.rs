// src/workflow/execution.rs

//! `Workflow::run()`.

use crate::core::context::Handler;
use crate::core::context_data::ContextData;
use crate::core::control::{StepControl, WorkflowOutcome};
use crate::error::FlowError;
use crate::workflow::definition::Workflow;
use tracing::{event, info_span, instrument, Instrument, Level};

enum PhaseOutcome<Err> {
  Continue,
  Stop,
  Failed(Err),
}

impl<TData, Err> Workflow<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  async fn run_phase(
    &self,
    phase: &'static str,
    handlers: Option<&Vec<Handler<TData, Err>>>,
    ctx_data: &ContextData<TData>,
  ) -> PhaseOutcome<Err> {
    let Some(handlers) = handlers else {
      return PhaseOutcome::Continue;
    };
    for (handler_idx, handler_fn) in handlers.iter().enumerate() {
      match handler_fn(ctx_data.clone()).await {
        Ok(StepControl::Continue) => {}
        Ok(StepControl::Stop) => {
          event!(Level::INFO, phase, handler_index = handler_idx, "Workflow stopped by handler.");
          return PhaseOutcome::Stop;
        }
        Err(e) => {
          event!(Level::WARN, phase, handler_index = handler_idx, error = %e, "Handler failed.");
          return PhaseOutcome::Failed(e);
        }
      }
    }
    PhaseOutcome::Continue
  }

  async fn fail(&self, ctx_data: &ContextData<TData>, step_name: &str, err: Err) -> Result<WorkflowOutcome, Err> {
    for hook in &self.failure_hooks {
      hook(ctx_data.clone(), step_name.to_string()).await;
    }
    Err(err)
  }

  /// Runs every step in order against `ctx_data`.
  ///
  /// A step is skipped when its `skip_if` predicate holds, or when it is
  /// optional and has no handlers. A non-optional step with no handlers is a
  /// [`FlowError::HandlerMissing`] error. Failure hooks run before any error
  /// is returned.
  #[instrument(
    name = "Workflow::run",
    skip_all,
    fields(
      context_type = %std::any::type_name::<TData>(),
      num_steps = self.steps.len(),
    ),
    err(Display)
  )]
  pub async fn run(&self, ctx_data: ContextData<TData>) -> Result<WorkflowOutcome, Err> {
    event!(Level::DEBUG, "Workflow starting.");

    for (step_idx, step_def) in self.steps.iter().enumerate() {
      let step_name = step_def.name.as_str();

      if let Some(skip_if) = &step_def.skip_if {
        if skip_if(ctx_data.clone()) {
          event!(Level::DEBUG, step_name, "Step skipped by condition.");
          continue;
        }
      }

      let before = self.before.get(step_name).filter(|v| !v.is_empty());
      let on = self.on.get(step_name).filter(|v| !v.is_empty());
      let after = self.after.get(step_name).filter(|v| !v.is_empty());

      if before.is_none() && on.is_none() && after.is_none() {
        if step_def.optional {
          event!(Level::DEBUG, step_name, "Optional step has no handlers, skipping.");
          continue;
        }
        event!(Level::ERROR, step_name, "Non-optional step has no handlers.");
        let err = Err::from(FlowError::HandlerMissing {
          step_name: step_name.to_string(),
        });
        return self.fail(&ctx_data, step_name, err).await;
      }

      let step_span = info_span!("workflow_step", step_name, step_index = step_idx);
      for (phase, handlers) in [("before", before), ("on", on), ("after", after)] {
        match self.run_phase(phase, handlers, &ctx_data).instrument(step_span.clone()).await {
          PhaseOutcome::Continue => {}
          PhaseOutcome::Stop => return Ok(WorkflowOutcome::Stopped),
          PhaseOutcome::Failed(err) => return self.fail(&ctx_data, step_name, err).await,
        }
      }
    }

    event!(Level::DEBUG, "Workflow completed.");
    Ok(WorkflowOutcome::Completed)
  }
}
