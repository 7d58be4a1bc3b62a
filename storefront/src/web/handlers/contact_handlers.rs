// harvest_store/src/web/handlers/contact_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{ContactStatus, NewContactMessage};
use crate::state::AppState;
use crate::web::extractors::AdminUser;

#[derive(Deserialize, Debug)]
pub struct ContactPayload {
  pub name: Option<String>,
  pub email: Option<String>,
  pub mobile: Option<String>,
  pub comments: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct UpdateContactStatusPayload {
  pub status: Option<ContactStatus>,
}

impl ContactPayload {
  fn into_new_message(self) -> Option<NewContactMessage> {
    let field = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
    Some(NewContactMessage {
      name: field(self.name)?,
      email: field(self.email)?,
      mobile: field(self.mobile)?,
      comments: field(self.comments)?,
    })
  }
}

#[instrument(name = "handler::create_contact_message", skip(app_state, req_payload))]
pub async fn create_contact_message_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<ContactPayload>,
) -> Result<HttpResponse, AppError> {
  let new_message = req_payload
    .into_inner()
    .into_new_message()
    .ok_or_else(|| AppError::Validation("Please fill in all fields.".to_string()))?;
  let saved = app_state.stores.contact.create(new_message).await?;
  info!(message_id = %saved.id, "Contact message stored.");
  Ok(HttpResponse::Created().json(json!({
    "message": "Message sent successfully!",
    "data": saved,
  })))
}

#[instrument(name = "handler::list_contact_messages", skip(app_state, admin), fields(admin_id = %admin.0.user_id))]
pub async fn list_contact_messages_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
) -> Result<HttpResponse, AppError> {
  let messages = app_state.stores.contact.list_all().await?;
  Ok(HttpResponse::Ok().json(messages))
}

#[instrument(
  name = "handler::update_contact_status",
  skip(app_state, admin, path, req_payload),
  fields(admin_id = %admin.0.user_id, message_id = %path.as_ref())
)]
pub async fn update_contact_status_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  path: web::Path<Uuid>,
  req_payload: web::Json<UpdateContactStatusPayload>,
) -> Result<HttpResponse, AppError> {
  let status = req_payload
    .status
    .ok_or_else(|| AppError::Validation("status is required.".to_string()))?;
  let message = app_state.stores.contact.update_status(path.into_inner(), status).await?;
  Ok(HttpResponse::Ok().json(message))
}
