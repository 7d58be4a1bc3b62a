// harvest_store/src/pipelines/signin_pipeline.rs

use crate::errors::{AppError, AuthError};
use crate::models::user::normalize_email;
use crate::pipelines::contexts::SigninCtxData;
use crate::services::auth_service;
use crate::state::AppState;
use harvest_flow::{ContextData, FlowRegistry, Pipeline, PipelineControl};
use std::sync::Arc;
use tracing::{event, info, warn, Level};

pub fn register_signin_pipeline(registry: &Arc<FlowRegistry<AppError>>, _app_state: &AppState) {
  let mut signin_p = Pipeline::<SigninCtxData, AppError>::new(&[
    ("validate_signin_input", false, None),
    ("fetch_user_by_email", false, None),
    ("verify_password", false, None),
    ("issue_token", false, None),
  ]);

  signin_p.on_root("validate_signin_input", |ctx_data: ContextData<SigninCtxData>| {
    Box::pin(async move {
      let (email_val, password_empty) = {
        let guard = ctx_data.read();
        (normalize_email(&guard.email), guard.password.is_empty())
      };
      if email_val.is_empty() || password_empty {
        return Err(AppError::Validation("Email and password are required.".to_string()));
      }
      ctx_data.write().email = email_val;
      Ok(PipelineControl::Continue)
    })
  });

  // An unknown email and a wrong password produce the same error.
  signin_p.on_root("fetch_user_by_email", |ctx_data: ContextData<SigninCtxData>| {
    Box::pin(async move {
      let (email_val, users) = {
        let guard = ctx_data.read();
        (guard.email.clone(), guard.app_state.stores.users.clone())
      };

      let Some(user) = users.find_by_email(&email_val).await? else {
        event!(Level::DEBUG, email = %email_val, "Signin for unknown email.");
        return Err(AppError::Unauthorized(AuthError::InvalidCredentials));
      };

      {
        let mut guard = ctx_data.write();
        guard.user_id = Some(user.id);
        guard.user_name = Some(user.name.clone());
        guard.user_role = Some(user.role());
        guard.temp_password_hash = Some(user.password_hash);
      }
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  signin_p.on_root("verify_password", |ctx_data: ContextData<SigninCtxData>| {
    Box::pin(async move {
      let (hash, password) = {
        let mut guard = ctx_data.write();
        (guard.temp_password_hash.take(), guard.password.clone())
      };
      let hash = hash.ok_or_else(|| AppError::Internal("Password hash missing from signin context.".to_string()))?;

      if !auth_service::verify_password(&hash, &password)? {
        warn!("Signin failed: password mismatch.");
        return Err(AppError::Unauthorized(AuthError::InvalidCredentials));
      }
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  signin_p.on_root("issue_token", |ctx_data: ContextData<SigninCtxData>| {
    Box::pin(async move {
      let (user_id, role, verifier) = {
        let guard = ctx_data.read();
        (guard.user_id, guard.user_role, guard.app_state.verifier.clone())
      };
      let (Some(user_id), Some(role)) = (user_id, role) else {
        return Err(AppError::Internal("Signin reached token issue without a user.".to_string()));
      };

      let token = verifier.tokens().issue(user_id, role)?;
      ctx_data.write().session_token = Some(token);
      info!(%user_id, "Signin successful, token issued.");
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  registry.register_pipeline(signin_p);
  tracing::info!("Sign-in pipeline registered.");
}
