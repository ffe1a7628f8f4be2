// tests/context_data_tests.rs
mod common;

use common::*;
use ecart_flow::{ContextData, StepControl, Workflow};
use serial_test::serial;

#[tokio::test]
#[serial]
async fn test_context_data_is_shared_between_steps() {
  setup_tracing();
  let mut workflow = Workflow::<TestContext, TestError>::new(&[("write", false, None), ("read_modify", false, None)]);

  workflow.on("write", |ctx: ContextData<TestContext>| async move {
    let mut guard = ctx.write();
    guard.counter = 10;
    guard.message = "SetByWrite".to_string();
    Ok::<_, TestError>(StepControl::Continue)
  });

  workflow.on("read_modify", |ctx: ContextData<TestContext>| async move {
    let mut guard = ctx.write();
    assert_eq!(guard.counter, 10);
    guard.counter += 5;
    guard.message.push_str("_ThenModified");
    Ok::<_, TestError>(StepControl::Continue)
  });

  let ctx = ContextData::new(TestContext::default());
  workflow.run(ctx.clone()).await.unwrap();

  let guard = ctx.read();
  assert_eq!(guard.counter, 15);
  assert_eq!(guard.message, "SetByWrite_ThenModified");
}

#[tokio::test]
#[serial]
async fn test_handler_can_await_between_lock_scopes() {
  setup_tracing();
  let mut workflow = Workflow::<TestContext, TestError>::new(&[("io", false, None)]);
  workflow.on("io", |ctx: ContextData<TestContext>| async move {
    let start = ctx.read().counter;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    ctx.write().counter = start + 1;
    Ok::<_, TestError>(StepControl::Continue)
  });

  let ctx = ContextData::new(TestContext::default());
  workflow.run(ctx.clone()).await.unwrap();
  assert_eq!(ctx.read().counter, 1);
}

#[test]
fn test_map_and_try_lock_helpers() {
  let ctx = ContextData::new(TestContext::default());
  {
    let mut msg = ctx.map_write(|c| &mut c.message);
    msg.push_str("mapped");
  }
  assert_eq!(&*ctx.map_read(|c| &c.message), "mapped");

  let held = ctx.write();
  assert!(ctx.try_read().is_none());
  drop(held);
  assert!(ctx.try_write().is_some());
  assert_eq!(ctx.snapshot().message, "mapped");
}
