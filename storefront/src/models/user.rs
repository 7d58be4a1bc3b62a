// harvest_store/src/models/user.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Customer,
  Admin,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
  pub id: Uuid,
  pub name: String,
  pub email: String,
  #[serde(skip_serializing)] // Never send password hash to client
  pub password_hash: String,
  pub is_admin: bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl User {
  pub fn role(&self) -> Role {
    if self.is_admin {
      Role::Admin
    } else {
      Role::Customer
    }
  }
}

#[derive(Debug, Clone)]
pub struct NewUser {
  pub name: String,
  /// Already normalised (trimmed, lowercase).
  pub email: String,
  pub password_hash: String,
  pub is_admin: bool,
}

impl NewUser {
  pub fn into_user(self, id: Uuid, now: DateTime<Utc>) -> User {
    User {
      id,
      name: self.name,
      email: self.email,
      password_hash: self.password_hash,
      is_admin: self.is_admin,
      created_at: now,
      updated_at: now,
    }
  }
}

/// What the login response and the admin views expose about a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
  pub id: Uuid,
  pub name: String,
  pub email: String,
  pub is_admin: bool,
}

impl From<&User> for UserSummary {
  fn from(user: &User) -> Self {
    Self {
      id: user.id,
      name: user.name.clone(),
      email: user.email.clone(),
      is_admin: user.is_admin,
    }
  }
}

pub fn normalize_email(raw: &str) -> String {
  raw.trim().to_lowercase()
}
