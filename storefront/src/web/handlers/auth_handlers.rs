// harvest_store/src/web/handlers/auth_handlers.rs

use actix_web::{web, HttpResponse};
use harvest_flow::{ContextData, PipelineResult};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::models::{Role, UserSummary};
use crate::pipelines::contexts::{SigninCtxData, SignupCtxData};
use crate::state::AppState;

// --- Request DTOs ---
#[derive(Deserialize, Debug)]
pub struct SignupRequestPayload {
  #[serde(default)]
  pub name: String,
  pub email: String,
  pub password: String,
}

#[derive(Deserialize, Debug)]
pub struct SigninRequestPayload {
  pub email: String,
  pub password: String,
}

// --- Handler Implementations ---

#[instrument(
    name = "handler::signup",
    skip(app_state, req_payload),
    fields(req_email = %req_payload.email)
)]
pub async fn signup_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<SignupRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.into_inner();
  let signup_ctx_initial = SignupCtxData {
    app_state: app_state.get_ref().clone(),
    name: payload.name,
    email: payload.email,
    password: payload.password,
    created_user_id: None,
  };
  let ctx_data = ContextData::new(signup_ctx_initial);

  match app_state.flow_registry.run(ctx_data.clone()).await {
    Ok(PipelineResult::Completed) => {
      let (user_id, name, email) = {
        let guard = ctx_data.read();
        (guard.created_user_id, guard.name.clone(), guard.email.clone())
      };
      let user_id = user_id.ok_or_else(|| {
        warn!("Signup pipeline completed but user_id was not set in context.");
        AppError::Internal("Signup completed without creating a user ID.".to_string())
      })?;

      info!("Signup successful. User ID: {}", user_id);
      Ok(HttpResponse::Created().json(json!({
          "message": "User created successfully.",
          "user": UserSummary { id: user_id, name, email, is_admin: false },
      })))
    }
    Ok(PipelineResult::Stopped) => {
      warn!("Signup pipeline was stopped by a handler.");
      Err(AppError::Internal("Signup process was halted by an internal step.".to_string()))
    }
    Err(app_err) => {
      warn!("Signup pipeline failed: {}", app_err);
      Err(app_err)
    }
  }
}

#[instrument(
    name = "handler::login",
    skip(app_state, req_payload),
    fields(req_email = %req_payload.email)
)]
pub async fn login_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<SigninRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.into_inner();
  let signin_ctx_initial = SigninCtxData {
    app_state: app_state.get_ref().clone(),
    email: payload.email,
    password: payload.password,
    temp_password_hash: None,
    user_id: None,
    user_name: None,
    user_role: None,
    session_token: None,
  };
  let ctx_data = ContextData::new(signin_ctx_initial);

  match app_state.flow_registry.run(ctx_data.clone()).await {
    Ok(PipelineResult::Completed) => {
      let guard = ctx_data.read();
      let (Some(user_id), Some(token)) = (guard.user_id, guard.session_token.clone()) else {
        warn!("Signin pipeline completed without a user or token.");
        return Err(AppError::Internal("Signin completed without issuing a token.".to_string()));
      };
      let user = UserSummary {
        id: user_id,
        name: guard.user_name.clone().unwrap_or_default(),
        email: guard.email.clone(),
        is_admin: guard.user_role == Some(Role::Admin),
      };

      info!("Signin successful. User ID: {}", user_id);
      Ok(HttpResponse::Ok().json(json!({
          "token": token,
          "user": user,
      })))
    }
    Ok(PipelineResult::Stopped) => {
      warn!("Signin pipeline was stopped by a handler.");
      Err(AppError::Internal("Authentication process was unexpectedly halted.".to_string()))
    }
    Err(app_err) => {
      warn!("Signin pipeline failed: {}", app_err);
      Err(app_err)
    }
  }
}
