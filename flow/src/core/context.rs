// src/core/context.rs

//! Handler signatures used by workflow steps.

use crate::core::context_data::ContextData;
use crate::core::control::StepControl;
use std::future::Future;
use std::pin::Pin;

/// A step handler.
///
/// Handlers receive their own clone of the shared `ContextData<TData>` and
/// resolve to `Result<StepControl, Err>`. Lock guards taken on the context
/// must be dropped before the handler awaits anything.
pub type Handler<TData, Err> = Box<
  dyn Fn(ContextData<TData>) -> Pin<Box<dyn Future<Output = Result<StepControl, Err>> + Send>>
    + Send
    + Sync,
>;

/// A failure hook, run once when a handler returns an error. The second
/// argument is the name of the step that failed.
pub type FailureHook<TData> =
  Box<dyn Fn(ContextData<TData>, String) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;
