// harvest_store/src/pipelines/signup_pipeline.rs

use crate::errors::AppError;
use crate::models::user::{normalize_email, NewUser};
use crate::pipelines::contexts::SignupCtxData;
use crate::services::auth_service::{self, MIN_PASSWORD_LEN};
use crate::state::AppState;
use harvest_flow::{ContextData, FlowRegistry, Pipeline, PipelineControl};
use std::sync::Arc;
use tracing::{event, info, warn, Level};

/// Registers the user sign-up pipeline.
pub fn register_signup_pipeline(registry: &Arc<FlowRegistry<AppError>>, _app_state: &AppState) {
  let mut signup_p = Pipeline::<SignupCtxData, AppError>::new(&[
    ("validate_signup_input", false, None),
    ("check_existing_user_signup", false, None),
    ("create_user", false, None),
  ]);

  // Step 1: Validate input
  signup_p.on_root("validate_signup_input", |ctx_data: ContextData<SignupCtxData>| {
    Box::pin(async move {
      let (name_val, email_val, password_len_val) = {
        let guard = ctx_data.read();
        (guard.name.trim().to_string(), normalize_email(&guard.email), guard.password.len())
      };

      event!(Level::DEBUG, email = %email_val, "Validating signup input.");
      if name_val.is_empty() {
        return Err(AppError::Validation("Name is required.".to_string()));
      }
      if email_val.is_empty() || !email_val.contains('@') {
        warn!("Invalid email format provided for signup.");
        return Err(AppError::Validation("Valid email is required.".to_string()));
      }
      if password_len_val < MIN_PASSWORD_LEN {
        warn!("Password too short for signup ({} chars).", password_len_val);
        return Err(AppError::Validation(format!(
          "Password must be at least {} characters long.",
          MIN_PASSWORD_LEN
        )));
      }

      {
        let mut guard = ctx_data.write();
        guard.name = name_val;
        guard.email = email_val;
      }
      Ok(PipelineControl::Continue)
    })
  });

  // Step 2: Reject an email that is already registered
  signup_p.on_root("check_existing_user_signup", |ctx_data: ContextData<SignupCtxData>| {
    Box::pin(async move {
      let (email_val, users) = {
        let guard = ctx_data.read();
        (guard.email.clone(), guard.app_state.stores.users.clone())
      };

      match users.find_by_email(&email_val).await? {
        Some(_) => {
          warn!("Attempt to signup with existing email: {}", email_val);
          Err(AppError::Validation("An account with this email already exists.".to_string()))
        }
        None => {
          event!(Level::DEBUG, email = %email_val, "Email is available for signup.");
          Ok::<_, AppError>(PipelineControl::Continue)
        }
      }
    })
  });

  // Step 3: Hash the password and store the user. The store still rejects a
  // duplicate email that slipped in after step 2.
  signup_p.on_root("create_user", |ctx_data: ContextData<SignupCtxData>| {
    Box::pin(async move {
      let (name_val, email_val, password_val, users) = {
        let guard = ctx_data.read();
        (
          guard.name.clone(),
          guard.email.clone(),
          guard.password.clone(),
          guard.app_state.stores.users.clone(),
        )
      };

      let password_hash = auth_service::hash_password(&password_val)?;
      let new_user = users
        .create(NewUser {
          name: name_val,
          email: email_val,
          password_hash,
          is_admin: false,
        })
        .await?;

      ctx_data.write().created_user_id = Some(new_user.id);
      info!("User created successfully: ID={}, Email={}", new_user.id, new_user.email);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  registry.register_pipeline(signup_p);
  tracing::info!("Sign-up pipeline registered.");
}
