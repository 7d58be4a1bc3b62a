// harvest_store/src/web/extractors.rs

//! Request extractors that resolve the caller from the bearer token.
//!
//! Handlers declare what they need by argument type: `AuthenticatedUser` for
//! any signed-in user, `AdminUser` for admin-marked routes, and `MaybeUser`
//! where a guest is allowed.

use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;
use tracing::{debug, warn};

use crate::errors::{AppError, AuthError};
use crate::services::{CredentialVerifier, Identity};
use crate::state::AppState;

#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Identity);

#[derive(Debug, Clone)]
pub struct AdminUser(pub Identity);

/// `None` when the request carries no `Authorization` header at all.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<Identity>);

fn app_state(req: &HttpRequest) -> Result<web::Data<AppState>, AppError> {
  req.app_data::<web::Data<AppState>>().cloned().ok_or_else(|| {
    warn!("AppState missing from app data.");
    AppError::Internal("Application state is not configured.".to_string())
  })
}

fn authorization_header(req: &HttpRequest) -> Option<String> {
  req
    .headers()
    .get(header::AUTHORIZATION)
    .map(|value| value.to_str().map(str::to_string).unwrap_or_default())
}

async fn resolve_identity(app_state: web::Data<AppState>, header_value: Option<String>) -> Result<Identity, AppError> {
  let token = CredentialVerifier::bearer_token(header_value.as_deref())?;
  app_state.verifier.resolve(token, app_state.stores.users.as_ref()).await
}

impl FromRequest for AuthenticatedUser {
  type Error = AppError;
  type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let state = app_state(req);
    let header_value = authorization_header(req);
    Box::pin(async move {
      let identity = resolve_identity(state?, header_value).await?;
      debug!(user_id = %identity.user_id, "Request authenticated.");
      Ok(AuthenticatedUser(identity))
    })
  }
}

impl FromRequest for AdminUser {
  type Error = AppError;
  type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let state = app_state(req);
    let header_value = authorization_header(req);
    Box::pin(async move {
      // Token first: an invalid token is 401 whatever the role would have been.
      let identity = resolve_identity(state?, header_value).await?;
      if let Err(auth_err) = CredentialVerifier::require_admin(&identity) {
        warn!(user_id = %identity.user_id, "Non-admin user rejected from admin route.");
        return Err(AppError::from(auth_err));
      }
      Ok(AdminUser(identity))
    })
  }
}

impl FromRequest for MaybeUser {
  type Error = AppError;
  type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let state = app_state(req);
    let header_value = authorization_header(req);
    Box::pin(async move {
      if header_value.is_none() {
        return Ok(MaybeUser(None));
      }
      match resolve_identity(state?, header_value).await {
        Ok(identity) => Ok(MaybeUser(Some(identity))),
        // A header that is present but not a bearer token is still a bad credential.
        Err(AppError::Unauthorized(AuthError::MissingToken)) => {
          Err(AppError::Unauthorized(AuthError::InvalidOrExpiredToken))
        }
        Err(e) => Err(e),
      }
    })
  }
}
