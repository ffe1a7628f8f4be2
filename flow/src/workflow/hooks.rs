// src/workflow/hooks.rs

//! Handler registration for workflow steps.

use crate::core::context::{FailureHook, Handler};
use crate::core::context_data::ContextData;
use crate::core::control::StepControl;
use crate::error::FlowError;
use crate::workflow::definition::Workflow;
use std::collections::HashMap;
use std::future::Future;

fn boxed<TData, Err, F, E>(
  handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
) -> Handler<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: 'static,
  F: Future<Output = Result<StepControl, E>> + Send + 'static,
  E: Into<Err> + Send + Sync + 'static,
{
  Box::new(move |ctx_data| {
    let fut = handler_fn(ctx_data);
    Box::pin(async move { fut.await.map_err(Into::into) })
  })
}

fn push<TData: Send + Sync + 'static, Err>(map: &mut HashMap<String, Vec<Handler<TData, Err>>>, step_name: &str, handler: Handler<TData, Err>) {
  map.entry(step_name.to_string()).or_default().push(handler);
}

impl<TData, Err> Workflow<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Registers a handler that runs before the step's `on` handlers.
  ///
  /// The handler's own error type only needs to convert into `Err`.
  pub fn before<F, E>(&mut self, step_name: &str, handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static)
  where
    F: Future<Output = Result<StepControl, E>> + Send + 'static,
    E: Into<Err> + Send + Sync + 'static,
  {
    self.ensure_step_exists(step_name);
    push(&mut self.before, step_name, boxed(handler_fn));
  }

  pub fn on<F, E>(&mut self, step_name: &str, handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static)
  where
    F: Future<Output = Result<StepControl, E>> + Send + 'static,
    E: Into<Err> + Send + Sync + 'static,
  {
    self.ensure_step_exists(step_name);
    push(&mut self.on, step_name, boxed(handler_fn));
  }

  pub fn after<F, E>(&mut self, step_name: &str, handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static)
  where
    F: Future<Output = Result<StepControl, E>> + Send + 'static,
    E: Into<Err> + Send + Sync + 'static,
  {
    self.ensure_step_exists(step_name);
    push(&mut self.after, step_name, boxed(handler_fn));
  }

  /// Registers a hook that runs when any handler fails, before the error is
  /// handed back to the caller. Hooks run in registration order and receive
  /// the name of the failing step.
  pub fn on_failure<F>(&mut self, hook_fn: impl Fn(ContextData<TData>, String) -> F + Send + Sync + 'static)
  where
    F: Future<Output = ()> + Send + 'static,
  {
    let hook: FailureHook<TData> = Box::new(move |ctx_data, step_name| Box::pin(hook_fn(ctx_data, step_name)));
    self.failure_hooks.push(hook);
  }
}
