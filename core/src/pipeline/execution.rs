// harvest_flow/src/pipeline/execution.rs

//! `Pipeline::run`: step execution and failure unwinding.

use crate::core::context_data::ContextData;
use crate::core::control::{PipelineControl, PipelineResult};
use crate::core::handler::Handler;
use crate::error::FlowError;
use crate::pipeline::definition::Pipeline;
use tracing::{event, info_span, instrument, Instrument, Level};

enum PhaseOutcome<Err> {
  Continue,
  Stop,
  Failed(Err),
}

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Executes every step against `ctx_data`.
  ///
  /// On failure, compensators of the steps that began executing run in reverse
  /// order, then the original error is returned. `Stop` is not a failure and
  /// does not trigger compensation.
  #[instrument(
    name = "Pipeline::run",
    skip_all,
    fields(
      context_type = %std::any::type_name::<TData>(),
      num_steps = self.steps.len(),
    ),
    err(Display)
  )]
  pub async fn run(&self, ctx_data: ContextData<TData>) -> Result<PipelineResult, Err> {
    let mut started: Vec<&str> = Vec::with_capacity(self.steps.len());

    for (step_idx, step_def) in self.steps.iter().enumerate() {
      let step_name = step_def.name.as_str();

      if let Some(skip_cond) = &step_def.skip_if {
        if skip_cond(ctx_data.clone()) {
          event!(Level::DEBUG, step_name, "Step skipped by its skip condition.");
          continue;
        }
      }

      let before = self.before.get(step_name).filter(|h| !h.is_empty());
      let on = self.on.get(step_name).filter(|h| !h.is_empty());
      let after = self.after.get(step_name).filter(|h| !h.is_empty());

      if before.is_none() && on.is_none() && after.is_none() {
        if step_def.optional {
          event!(Level::DEBUG, step_name, "Optional step has no handlers, skipping.");
          continue;
        }
        event!(Level::ERROR, step_name, "Non-optional step has no handlers.");
        self.unwind(&started, &ctx_data).await;
        return Err(Err::from(FlowError::HandlerMissing {
          step_name: step_def.name.clone(),
        }));
      }

      started.push(step_name);
      let step_span = info_span!("pipeline_step", step_name, step_index = step_idx, optional = step_def.optional);

      for (phase, handlers) in [("before", before), ("on", on), ("after", after)] {
        let Some(handlers) = handlers else { continue };
        match run_phase(phase, handlers, &ctx_data).instrument(step_span.clone()).await {
          PhaseOutcome::Continue => {}
          PhaseOutcome::Stop => {
            event!(Level::INFO, step_name, phase, "Pipeline stopped by a handler.");
            return Ok(PipelineResult::Stopped);
          }
          PhaseOutcome::Failed(err) => {
            event!(Level::WARN, step_name, phase, error = %err, "Step failed, unwinding.");
            self.unwind(&started, &ctx_data).await;
            return Err(err);
          }
        }
      }
    }

    event!(Level::DEBUG, "Pipeline completed.");
    Ok(PipelineResult::Completed)
  }

  /// Runs compensators for `started` steps, newest first. Failures are logged
  /// and do not stop the remaining compensators.
  async fn unwind(&self, started: &[&str], ctx_data: &ContextData<TData>) {
    for step_name in started.iter().rev() {
      let Some(compensators) = self.compensators.get(*step_name) else { continue };
      for compensator in compensators.iter().rev() {
        let span = info_span!("pipeline_compensation", step_name = *step_name);
        if let Err(err) = compensator(ctx_data.clone()).instrument(span).await {
          let flow_err = FlowError::Compensation {
            step_name: step_name.to_string(),
            message: err.to_string(),
          };
          event!(Level::ERROR, error = %flow_err, "Compensation failed.");
        }
      }
    }
  }
}

async fn run_phase<TData, Err>(
  phase: &'static str,
  handlers: &[Handler<TData, Err>],
  ctx_data: &ContextData<TData>,
) -> PhaseOutcome<Err>
where
  TData: 'static + Send + Sync,
{
  for (handler_idx, handler_fn) in handlers.iter().enumerate() {
    event!(Level::TRACE, phase, handler_idx, "Running handler.");
    match handler_fn(ctx_data.clone()).await {
      Ok(PipelineControl::Continue) => {}
      Ok(PipelineControl::Stop) => return PhaseOutcome::Stop,
      Err(e) => return PhaseOutcome::Failed(e),
    }
  }
  PhaseOutcome::Continue
}
