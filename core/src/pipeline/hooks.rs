// harvest_flow/src/pipeline/hooks.rs

//! Registration of step handlers and compensators.

use crate::core::context_data::ContextData;
use crate::core::control::PipelineControl;
use crate::core::handler::{Compensator, Handler};
use crate::error::FlowError;
use crate::pipeline::definition::Pipeline;
use std::future::Future;
use tracing::{event, Level};

fn boxed_handler<TData, Err, F, UserErr>(
  handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
) -> Handler<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: 'static,
  F: Future<Output = Result<PipelineControl, UserErr>> + Send + 'static,
  UserErr: Into<Err> + Send + Sync + 'static,
{
  Box::new(move |ctx_data| {
    let user_fut = handler_fn(ctx_data);
    Box::pin(async move { user_fut.await.map_err(Into::into) })
  })
}

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Runs before the `on` handlers of `step_name`.
  ///
  /// The handler may return any error type convertible into the pipeline's `Err`.
  pub fn before_root<F, UserErr>(
    &mut self,
    step_name: &str,
    handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
  ) where
    F: Future<Output = Result<PipelineControl, UserErr>> + Send + 'static,
    UserErr: Into<Err> + Send + Sync + 'static,
  {
    self.ensure_step_exists(step_name);
    self.before.entry(step_name.to_string()).or_default().push(boxed_handler(handler_fn));
  }

  /// The main work of `step_name`. Several `on` handlers run in registration order.
  pub fn on_root<F, UserErr>(
    &mut self,
    step_name: &str,
    handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
  ) where
    F: Future<Output = Result<PipelineControl, UserErr>> + Send + 'static,
    UserErr: Into<Err> + Send + Sync + 'static,
  {
    self.ensure_step_exists(step_name);
    self.on.entry(step_name.to_string()).or_default().push(boxed_handler(handler_fn));
  }

  pub fn after_root<F, UserErr>(
    &mut self,
    step_name: &str,
    handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
  ) where
    F: Future<Output = Result<PipelineControl, UserErr>> + Send + 'static,
    UserErr: Into<Err> + Send + Sync + 'static,
  {
    self.ensure_step_exists(step_name);
    self.after.entry(step_name.to_string()).or_default().push(boxed_handler(handler_fn));
  }

  /// Registers an undo action for `step_name`.
  ///
  /// When a later handler (or a handler of this very step) fails, the
  /// compensators of every step that had started run in reverse step order
  /// before `run` returns the error. Compensators of the same step run in
  /// reverse registration order.
  pub fn compensate_root<F, UserErr>(
    &mut self,
    step_name: &str,
    compensator_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
  ) where
    F: Future<Output = Result<(), UserErr>> + Send + 'static,
    UserErr: Into<Err> + Send + Sync + 'static,
  {
    self.ensure_step_exists(step_name);
    let compensator: Compensator<TData, Err> = Box::new(move |ctx_data| {
      let user_fut = compensator_fn(ctx_data);
      Box::pin(async move { user_fut.await.map_err(Into::into) })
    });
    self.compensators.entry(step_name.to_string()).or_default().push(compensator);
    event!(Level::DEBUG, %step_name, "Compensator registered.");
  }

  pub fn has_compensation(&self, step_name: &str) -> bool {
    self.compensators.get(step_name).is_some_and(|c| !c.is_empty())
  }
}
