// src/registry.rs

//! `FlowRegistry<E>`: workflows keyed by their context data type.
//!
//! A workflow whose handlers fail with `WorkflowErr` can be registered in a
//! registry whose callers expect `AppErr`, provided `AppErr: From<WorkflowErr>`.

use crate::core::context_data::ContextData;
use crate::core::control::WorkflowOutcome;
use crate::error::FlowError;
use crate::workflow::definition::Workflow;

use async_trait::async_trait;
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{event, instrument, Level};

#[async_trait]
trait ErasedRunner<AppErr>: Send + Sync
where
  AppErr: std::error::Error + Send + Sync + 'static,
{
  /// `ctx_obj` must box a `ContextData<TData>` for the runner's `TData`.
  async fn run_erased(&self, ctx_obj: Box<dyn Any + Send>) -> Result<WorkflowOutcome, AppErr>;
}

struct WorkflowRunner<TData, WorkflowErr, AppErr>
where
  TData: 'static + Send + Sync,
  WorkflowErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  workflow: Arc<Workflow<TData, WorkflowErr>>,
  _app_err: PhantomData<fn() -> AppErr>,
}

#[async_trait]
impl<TData, WorkflowErr, AppErr> ErasedRunner<AppErr> for WorkflowRunner<TData, WorkflowErr, AppErr>
where
  TData: 'static + Send + Sync,
  WorkflowErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
  AppErr: std::error::Error + From<WorkflowErr> + From<FlowError> + Send + Sync + 'static,
{
  async fn run_erased(&self, ctx_obj: Box<dyn Any + Send>) -> Result<WorkflowOutcome, AppErr> {
    let ctx_data = match ctx_obj.downcast::<ContextData<TData>>() {
      Ok(boxed) => *boxed,
      Err(_) => {
        let expected_type = std::any::type_name::<ContextData<TData>>().to_string();
        event!(Level::ERROR, %expected_type, "Context object type mismatch.");
        return Err(AppErr::from(FlowError::TypeMismatch { expected_type }));
      }
    };
    self.workflow.run(ctx_data).await.map_err(AppErr::from)
  }
}

pub struct FlowRegistry<AppErr = FlowError>
where
  AppErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  runners: RwLock<HashMap<TypeId, Arc<dyn ErasedRunner<AppErr>>>>,
}

impl<AppErr> Default for FlowRegistry<AppErr>
where
  AppErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  fn default() -> Self {
    Self::new()
  }
}

impl<AppErr> FlowRegistry<AppErr>
where
  AppErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pub fn new() -> Self {
    Self {
      runners: RwLock::new(HashMap::new()),
    }
  }

  /// Registers `workflow` for its context type. A later registration for the
  /// same type replaces the earlier one.
  pub fn register<TData, WorkflowErr>(&self, workflow: Workflow<TData, WorkflowErr>)
  where
    TData: 'static + Send + Sync,
    WorkflowErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
    AppErr: From<WorkflowErr>,
  {
    event!(Level::DEBUG, context_type = %std::any::type_name::<TData>(), "Registering workflow.");
    let runner = WorkflowRunner::<TData, WorkflowErr, AppErr> {
      workflow: Arc::new(workflow),
      _app_err: PhantomData,
    };
    self.runners.write().insert(TypeId::of::<TData>(), Arc::new(runner));
  }

  pub fn is_registered<TData: 'static + Send + Sync>(&self) -> bool {
    self.runners.read().contains_key(&TypeId::of::<TData>())
  }

  /// Runs the workflow registered for `TData`.
  #[instrument(name = "FlowRegistry::run", skip_all, fields(context_type = %std::any::type_name::<TData>()))]
  pub async fn run<TData>(&self, ctx_data: ContextData<TData>) -> Result<WorkflowOutcome, AppErr>
  where
    TData: 'static + Send + Sync,
  {
    let runner = self.runners.read().get(&TypeId::of::<TData>()).cloned();
    let Some(runner) = runner else {
      let type_name = std::any::type_name::<TData>().to_string();
      event!(Level::ERROR, %type_name, "No workflow registered.");
      return Err(AppErr::from(FlowError::NotRegistered { type_name }));
    };
    runner.run_erased(Box::new(ctx_data)).await
  }
}
