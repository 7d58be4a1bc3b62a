// harvest_store/src/models/contact.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type as SqlxType};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "contact_status")]
pub enum ContactStatus {
  #[default]
  #[serde(rename = "In Progress")]
  #[sqlx(rename = "In Progress")]
  InProgress,
  Done,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
  #[serde(rename = "_id")]
  pub id: Uuid,
  pub name: String,
  pub email: String,
  pub mobile: String,
  pub comments: String,
  pub status: ContactStatus,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewContactMessage {
  pub name: String,
  pub email: String,
  pub mobile: String,
  pub comments: String,
}

impl NewContactMessage {
  pub fn into_message(self, id: Uuid, now: DateTime<Utc>) -> ContactMessage {
    ContactMessage {
      id,
      name: self.name,
      email: self.email,
      mobile: self.mobile,
      comments: self.comments,
      status: ContactStatus::InProgress,
      created_at: now,
    }
  }
}
