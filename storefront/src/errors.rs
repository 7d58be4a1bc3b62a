// harvest_store/src/errors.rs

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use harvest_flow::FlowError;
use serde_json::json;
use thiserror::Error;

/// Why a request could not be tied to a user. The `Display` text is what the
/// client sees in the `{message}` body.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
  #[error("Not authorized, no token")]
  MissingToken,

  #[error("Not authorized, token failed")]
  InvalidOrExpiredToken,

  #[error("Not authorized as an admin")]
  NotAdmin,

  #[error("Invalid email or password")]
  InvalidCredentials,
}

#[derive(Debug, Error)]
pub enum AppError {
  #[error("{0}")]
  Validation(String),

  #[error("{0}")]
  Unauthorized(AuthError),

  #[error("{0}")]
  Forbidden(String),

  #[error("{0}")]
  NotFound(String),

  #[error("Insufficient stock for {product}: requested {requested}, available {available}")]
  InsufficientStock {
    product: String,
    requested: i64,
    available: i64,
  },

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Workflow Error: {0}")]
  Workflow(FlowError),

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl From<AuthError> for AppError {
  fn from(err: AuthError) -> Self {
    match err {
      AuthError::NotAdmin => AppError::Forbidden(err.to_string()),
      other => AppError::Unauthorized(other),
    }
  }
}

// Pipeline handlers return AppError directly; the engine only wraps it when it
// travels through an anyhow conversion. Unwrap so the original status survives.
impl From<FlowError> for AppError {
  fn from(err: FlowError) -> Self {
    match err {
      FlowError::HandlerError { source } => match source.downcast::<AppError>() {
        Ok(app_err) => app_err,
        Err(source) => AppError::Workflow(FlowError::HandlerError { source }),
      },
      other => AppError::Workflow(other),
    }
  }
}

impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    let err = match err.downcast::<AppError>() {
      Ok(app_err) => return app_err,
      Err(err) => err,
    };
    let err = match err.downcast::<sqlx::Error>() {
      Ok(sqlx_err) => return AppError::Sqlx(sqlx_err),
      Err(err) => err,
    };
    match err.downcast::<FlowError>() {
      Ok(flow_err) => AppError::from(flow_err),
      Err(err) => AppError::Internal(format!("{:#}", err)),
    }
  }
}

impl AppError {
  /// The text placed in the `{message}` body. Server-side failures get a
  /// generic message; the details go to the log only.
  pub fn public_message(&self) -> String {
    match self {
      AppError::Config(_) | AppError::Sqlx(_) | AppError::Workflow(_) | AppError::Internal(_) => {
        "Internal server error".to_string()
      }
      other => other.to_string(),
    }
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) => StatusCode::BAD_REQUEST,
      AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
      AppError::Forbidden(_) => StatusCode::FORBIDDEN,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::InsufficientStock { .. } => StatusCode::CONFLICT,
      AppError::Config(_) | AppError::Sqlx(_) | AppError::Workflow(_) | AppError::Internal(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    if status.is_server_error() {
      tracing::error!(application_error = %self, "Responding with error");
    } else {
      tracing::debug!(application_error = %self, status = status.as_u16(), "Responding with error");
    }
    HttpResponse::build(status).json(json!({ "message": self.public_message() }))
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn auth_errors_map_to_401_and_403() {
    assert_eq!(
      AppError::from(AuthError::MissingToken).status_code(),
      StatusCode::UNAUTHORIZED
    );
    assert_eq!(
      AppError::from(AuthError::InvalidOrExpiredToken).status_code(),
      StatusCode::UNAUTHORIZED
    );
    assert_eq!(AppError::from(AuthError::NotAdmin).status_code(), StatusCode::FORBIDDEN);
  }

  #[test]
  fn flow_handler_error_is_unwrapped() {
    let wrapped = FlowError::HandlerError {
      source: anyhow::Error::new(AppError::NotFound("Product not found".to_string())),
    };
    match AppError::from(wrapped) {
      AppError::NotFound(msg) => assert_eq!(msg, "Product not found"),
      other => panic!("expected NotFound, got {:?}", other),
    }
  }

  #[test]
  fn other_flow_errors_are_internal() {
    let err = AppError::from(FlowError::HandlerMissing {
      step_name: "persist_order".to_string(),
    });
    assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(err.public_message(), "Internal server error");
  }

  #[test]
  fn insufficient_stock_is_conflict_with_readable_message() {
    let err = AppError::InsufficientStock {
      product: "Turmeric Powder".to_string(),
      requested: 3,
      available: 2,
    };
    assert_eq!(err.status_code(), StatusCode::CONFLICT);
    assert_eq!(
      err.public_message(),
      "Insufficient stock for Turmeric Powder: requested 3, available 2"
    );
  }
}
