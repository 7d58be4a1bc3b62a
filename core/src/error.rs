// harvest_flow/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FlowError {
  #[error("Step not found: {step_name}")]
  StepNotFound { step_name: String },

  #[error("Handler missing for non-optional step: {step_name}")]
  HandlerMissing { step_name: String },

  #[error("Type mismatch while dispatching a pipeline (expected {expected_type})")]
  TypeMismatch { expected_type: String },

  #[error("Handler failed. Source: {source}")]
  HandlerError {
    #[source]
    source: AnyhowError,
  },

  /// A compensation handler failed while unwinding `step_name`.
  /// Never returned from `Pipeline::run`; only logged.
  #[error("Compensation for step '{step_name}' failed: {message}")]
  Compensation { step_name: String, message: String },

  #[error("Configuration error for '{step_name}': {message}")]
  ConfigurationError { step_name: String, message: String },

  #[error("Internal flow error: {0}")]
  Internal(String),
}

impl From<AnyhowError> for FlowError {
  fn from(err: AnyhowError) -> Self {
    // Avoid HandlerError(HandlerError(..)) chains when an anyhow error already wraps a FlowError.
    match err.downcast::<FlowError>() {
      Ok(flow_err) => flow_err,
      Err(other) => FlowError::HandlerError { source: other },
    }
  }
}

pub type FlowResult<T, E = FlowError> = std::result::Result<T, E>;
