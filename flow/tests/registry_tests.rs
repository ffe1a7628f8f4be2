// tests/registry_tests.rs
mod common;

use common::*;
use ecart_flow::{ContextData, FlowError, FlowRegistry, StepControl, Workflow, WorkflowOutcome};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct AlphaContext {
  val: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct BetaContext {
  num: i32,
}

#[derive(Debug, thiserror::Error)]
enum AppError {
  #[error("workflow: {0}")]
  Test(#[from] TestError),
  #[error("engine: {0}")]
  Flow(#[from] FlowError),
}

#[tokio::test]
async fn test_registry_runs_workflow_for_context_type() {
  setup_tracing();
  let registry = FlowRegistry::<TestError>::new();

  let mut alpha = Workflow::<AlphaContext, TestError>::new(&[("alpha_task", false, None)]);
  alpha.on("alpha_task", |ctx: ContextData<AlphaContext>| async move {
    ctx.write().val = "alpha_processed".to_string();
    Ok::<_, TestError>(StepControl::Continue)
  });
  registry.register(alpha);

  let mut beta = Workflow::<BetaContext, TestError>::new(&[("beta_task", false, None)]);
  beta.on("beta_task", |ctx: ContextData<BetaContext>| async move {
    ctx.write().num = 100;
    Ok::<_, TestError>(StepControl::Continue)
  });
  registry.register(beta);

  assert!(registry.is_registered::<AlphaContext>());

  let ctx_alpha = ContextData::new(AlphaContext::default());
  assert_eq!(registry.run(ctx_alpha.clone()).await.unwrap(), WorkflowOutcome::Completed);
  assert_eq!(ctx_alpha.read().val, "alpha_processed");

  let ctx_beta = ContextData::new(BetaContext::default());
  assert_eq!(registry.run(ctx_beta.clone()).await.unwrap(), WorkflowOutcome::Completed);
  assert_eq!(ctx_beta.read().num, 100);
}

#[tokio::test]
async fn test_registry_reports_unregistered_context() {
  setup_tracing();
  let registry = FlowRegistry::<FlowError>::new();
  assert!(!registry.is_registered::<AlphaContext>());

  let result = registry.run(ContextData::new(AlphaContext::default())).await;
  match result {
    Err(FlowError::NotRegistered { type_name }) => assert!(type_name.contains("AlphaContext")),
    other => panic!("Expected NotRegistered, got {:?}", other),
  }
}

#[tokio::test]
async fn test_registry_converts_workflow_errors_into_app_error() {
  setup_tracing();
  let registry = FlowRegistry::<AppError>::new();

  let mut failing = Workflow::<BetaContext, TestError>::new(&[("fails", false, None)]);
  failing.on("fails", create_failing_handler_for_beta());
  registry.register(failing);

  let result = registry.run(ContextData::new(BetaContext::default())).await;
  assert!(matches!(result, Err(AppError::Test(TestError::Handler(msg))) if msg == "beta failed"));
}

#[tokio::test]
async fn test_later_registration_replaces_earlier_one() {
  setup_tracing();
  let registry = FlowRegistry::<TestError>::new();

  for value in ["first", "second"] {
    let mut workflow = Workflow::<AlphaContext, TestError>::new(&[("write", false, None)]);
    workflow.on("write", move |ctx: ContextData<AlphaContext>| async move {
      ctx.write().val = value.to_string();
      Ok::<_, TestError>(StepControl::Continue)
    });
    registry.register(workflow);
  }

  let ctx = ContextData::new(AlphaContext::default());
  registry.run(ctx.clone()).await.unwrap();
  assert_eq!(ctx.read().val, "second");
}

fn create_failing_handler_for_beta() -> ecart_flow::Handler<BetaContext, TestError> {
  Box::new(|_ctx: ContextData<BetaContext>| {
    Box::pin(async { Err::<StepControl, _>(TestError::Handler("beta failed".to_string())) })
  })
}
