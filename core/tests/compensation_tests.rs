// tests/compensation_tests.rs
mod common;

use common::*;
use harvest_flow::{ContextData, HandlerFuture, Pipeline, PipelineControl, PipelineResult};
use serial_test::serial;

fn release(
  units: i64,
  label: &'static str,
) -> impl Fn(ContextData<TestContext>) -> HandlerFuture<Result<(), TestError>> + Send + Sync + 'static {
  move |ctx: ContextData<TestContext>| {
    let fut: HandlerFuture<Result<(), TestError>> = Box::pin(async move {
      let mut guard = ctx.write();
      guard.reserved -= units;
      guard.compensations_run.push(label.to_string());
      Ok(())
    });
    fut
  }
}

#[tokio::test]
#[serial]
async fn test_compensators_run_in_reverse_on_failure() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::new(&[
    ("reserve_a", false, None),
    ("reserve_b", false, None),
    ("persist", false, None),
  ]);
  pipeline.on_root("reserve_a", create_reserving_handler("reserve_a", 3));
  pipeline.compensate_root("reserve_a", release(3, "release_a"));
  pipeline.on_root("reserve_b", create_reserving_handler("reserve_b", 2));
  pipeline.compensate_root("reserve_b", release(2, "release_b"));
  pipeline.on_root("persist", create_failing_handler("persist", "disk full"));

  let ctx = ContextData::new(TestContext::default());
  let result = pipeline.run(ctx.clone()).await;

  assert_eq!(result, Err(TestError::Handler("disk full".to_string())));
  let guard = ctx.read();
  assert_eq!(guard.reserved, 0);
  assert_eq!(guard.compensations_run, vec!["release_b", "release_a"]);
}

#[tokio::test]
#[serial]
async fn test_failing_step_own_compensator_runs() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::new(&[("reserve_many", false, None)]);
  // Reserves one unit, then fails partway through the step.
  pipeline.on_root("reserve_many", create_reserving_handler("reserve_many", 1));
  pipeline.on_root("reserve_many", create_failing_handler("reserve_many", "second item short"));
  pipeline.compensate_root("reserve_many", |ctx: ContextData<TestContext>| {
    Box::pin(async move {
      let mut guard = ctx.write();
      let held = guard.reserved;
      guard.reserved -= held;
      guard.compensations_run.push("release_all".to_string());
      Ok::<_, TestError>(())
    })
  });

  let ctx = ContextData::new(TestContext::default());
  assert!(pipeline.run(ctx.clone()).await.is_err());
  assert_eq!(ctx.read().reserved, 0);
  assert_eq!(ctx.read().compensations_run, vec!["release_all"]);
}

#[tokio::test]
#[serial]
async fn test_no_compensation_on_success_or_stop() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::new(&[("reserve", false, None), ("maybe_stop", false, None)]);
  pipeline.on_root("reserve", create_reserving_handler("reserve", 5));
  pipeline.compensate_root("reserve", release(5, "release"));
  pipeline.on_root("maybe_stop", create_simple_handler("maybe_stop", "x"));

  let ctx = ContextData::new(TestContext::default());
  assert_eq!(pipeline.run(ctx.clone()).await.unwrap(), PipelineResult::Completed);
  assert_eq!(ctx.read().reserved, 5);
  assert!(ctx.read().compensations_run.is_empty());

  let stopped = ContextData::new(TestContext {
    should_stop_at: Some("maybe_stop".to_string()),
    ..Default::default()
  });
  assert_eq!(pipeline.run(stopped.clone()).await.unwrap(), PipelineResult::Stopped);
  assert_eq!(stopped.read().reserved, 5);
  assert!(stopped.read().compensations_run.is_empty());
}

#[tokio::test]
#[serial]
async fn test_steps_not_started_are_not_compensated() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::new(&[
    ("validate", false, None),
    ("reserve", false, None),
  ]);
  pipeline.on_root("validate", create_failing_handler("validate", "bad input"));
  pipeline.on_root("reserve", create_reserving_handler("reserve", 5));
  pipeline.compensate_root("reserve", release(5, "release"));

  let ctx = ContextData::new(TestContext::default());
  assert!(pipeline.run(ctx.clone()).await.is_err());
  assert_eq!(ctx.read().reserved, 0);
  assert!(ctx.read().compensations_run.is_empty());
}

#[tokio::test]
#[serial]
async fn test_failed_compensation_keeps_original_error() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::new(&[
    ("reserve_a", false, None),
    ("reserve_b", false, None),
    ("persist", false, None),
  ]);
  pipeline.on_root("reserve_a", create_reserving_handler("reserve_a", 1));
  pipeline.compensate_root("reserve_a", release(1, "release_a"));
  pipeline.on_root("reserve_b", |ctx: ContextData<TestContext>| {
    Box::pin(async move {
      ctx.write().reserved += 1;
      Ok::<_, TestError>(PipelineControl::Continue)
    })
  });
  pipeline.compensate_root("reserve_b", |_ctx: ContextData<TestContext>| {
    Box::pin(async move { Err::<(), _>(TestError::Compensation("store offline".to_string())) })
  });
  pipeline.on_root("persist", create_failing_handler("persist", "write rejected"));

  let ctx = ContextData::new(TestContext::default());
  let result = pipeline.run(ctx.clone()).await;

  assert_eq!(result, Err(TestError::Handler("write rejected".to_string())));
  // reserve_b could not be released; reserve_a still was.
  assert_eq!(ctx.read().reserved, 1);
  assert_eq!(ctx.read().compensations_run, vec!["release_a"]);
  assert!(pipeline.has_compensation("reserve_b"));
  assert!(!pipeline.has_compensation("persist"));
}
