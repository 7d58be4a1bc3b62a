// harvest_store/src/services/credential_verifier.rs

//! Turns an `Authorization` header into an [`Identity`].
//!
//! Token validity is always settled before role: an invalid token never
//! reaches the user lookup, and the admin check only ever sees a resolved
//! identity.

use super::token_service::{Claims, TokenService};
use crate::errors::{AppError, AuthError};
use crate::models::{Role, User};
use crate::store::UserStore;
use tracing::{debug, error, instrument};
use uuid::Uuid;

/// The caller of a request, with the role as currently stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
  pub user_id: Uuid,
  pub name: String,
  pub email: String,
  pub role: Role,
}

impl Identity {
  pub fn is_admin(&self) -> bool {
    self.role == Role::Admin
  }
}

impl From<&User> for Identity {
  fn from(user: &User) -> Self {
    Self {
      user_id: user.id,
      name: user.name.clone(),
      email: user.email.clone(),
      role: user.role(),
    }
  }
}

pub struct CredentialVerifier {
  tokens: TokenService,
}

impl CredentialVerifier {
  pub fn new(tokens: TokenService) -> Self {
    Self { tokens }
  }

  pub fn tokens(&self) -> &TokenService {
    &self.tokens
  }

  /// Extracts the token from an `Authorization` header value.
  pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let token = header
      .and_then(|value| value.strip_prefix("Bearer "))
      .ok_or(AuthError::MissingToken)?
      .trim();
    if token.is_empty() {
      return Err(AuthError::InvalidOrExpiredToken);
    }
    Ok(token)
  }

  pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
    self.tokens.decode(token)
  }

  /// Verifies the token, then loads the user so a role change since issue
  /// takes effect immediately.
  #[instrument(name = "credential_verifier::resolve", skip(self, token, users), err(Display))]
  pub async fn resolve(&self, token: &str, users: &dyn UserStore) -> Result<Identity, AppError> {
    let claims = self.verify(token)?;
    let user = users.find_by_id(claims.sub).await.map_err(|e| {
      // Fail closed: a broken store must not let the request through.
      error!(error = %e, user_id = %claims.sub, "User lookup failed during token resolution.");
      AppError::Internal("Failed to resolve credentials".to_string())
    })?;

    match user {
      Some(user) => {
        let identity = Identity::from(&user);
        if identity.role != claims.role {
          debug!(user_id = %identity.user_id, "Stored role differs from token role; using stored role.");
        }
        Ok(identity)
      }
      None => {
        debug!(user_id = %claims.sub, "Token refers to a user that no longer exists.");
        Err(AuthError::InvalidOrExpiredToken.into())
      }
    }
  }

  pub fn require_admin(identity: &Identity) -> Result<(), AuthError> {
    if identity.is_admin() {
      Ok(())
    } else {
      Err(AuthError::NotAdmin)
    }
  }
}
