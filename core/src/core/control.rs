// harvest_flow/src/core/control.rs

//! Flow-control signals returned by handlers and the outcome of a run.

/// Returned by every handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineControl {
  Continue,
  /// Halt the run right here. Nothing after this handler executes and no
  /// compensation runs: stopping is a successful outcome, not a failure.
  Stop,
}

/// Outcome of a run that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineResult {
  Completed,
  Stopped,
}
