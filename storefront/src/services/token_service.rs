// harvest_store/src/services/token_service.rs

//! HS256 bearer tokens in compact JWT form (`header.payload.signature`, each
//! part base64url without padding).

use crate::errors::{AppError, AuthError};
use crate::models::Role;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::{debug, instrument};
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
  pub sub: Uuid,
  pub role: Role,
  pub iat: i64,
  pub exp: i64,
}

#[derive(Serialize, Deserialize)]
struct Header {
  alg: String,
  typ: String,
}

pub struct TokenService {
  secret: Vec<u8>,
  ttl: Duration,
}

impl TokenService {
  pub fn new(secret: &[u8], ttl_hours: i64) -> Self {
    Self {
      secret: secret.to_vec(),
      ttl: Duration::hours(ttl_hours),
    }
  }

  fn mac(&self) -> Result<HmacSha256, AppError> {
    HmacSha256::new_from_slice(&self.secret).map_err(|e| AppError::Config(format!("Invalid token secret: {}", e)))
  }

  #[instrument(name = "token_service::issue", skip(self), fields(user_id = %user_id))]
  pub fn issue(&self, user_id: Uuid, role: Role) -> Result<String, AppError> {
    let now = Utc::now();
    let claims = Claims {
      sub: user_id,
      role,
      iat: now.timestamp(),
      exp: (now + self.ttl).timestamp(),
    };
    let header = Header {
      alg: "HS256".to_string(),
      typ: "JWT".to_string(),
    };
    let header_json = serde_json::to_vec(&header).map_err(|e| AppError::Internal(e.to_string()))?;
    let claims_json = serde_json::to_vec(&claims).map_err(|e| AppError::Internal(e.to_string()))?;
    let signing_input = format!(
      "{}.{}",
      URL_SAFE_NO_PAD.encode(header_json),
      URL_SAFE_NO_PAD.encode(claims_json)
    );

    let mut mac = self.mac()?;
    mac.update(signing_input.as_bytes());
    let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
    debug!(exp = claims.exp, "Token issued.");
    Ok(format!("{}.{}", signing_input, signature))
  }

  /// Checks the signature, the algorithm and the expiry.
  pub fn decode(&self, token: &str) -> Result<Claims, AuthError> {
    let mut parts = token.split('.');
    let (Some(header_b64), Some(claims_b64), Some(signature_b64), None) =
      (parts.next(), parts.next(), parts.next(), parts.next())
    else {
      return Err(AuthError::InvalidOrExpiredToken);
    };

    let signature = URL_SAFE_NO_PAD
      .decode(signature_b64)
      .map_err(|_| AuthError::InvalidOrExpiredToken)?;
    let mut mac = self.mac().map_err(|_| AuthError::InvalidOrExpiredToken)?;
    mac.update(header_b64.as_bytes());
    mac.update(b".");
    mac.update(claims_b64.as_bytes());
    mac.verify_slice(&signature).map_err(|_| {
      debug!("Token signature mismatch.");
      AuthError::InvalidOrExpiredToken
    })?;

    let header: Header = decode_part(header_b64)?;
    if header.alg != "HS256" {
      return Err(AuthError::InvalidOrExpiredToken);
    }
    let claims: Claims = decode_part(claims_b64)?;
    if claims.exp <= Utc::now().timestamp() {
      debug!(exp = claims.exp, "Token expired.");
      return Err(AuthError::InvalidOrExpiredToken);
    }
    Ok(claims)
  }
}

fn decode_part<T: serde::de::DeserializeOwned>(part: &str) -> Result<T, AuthError> {
  let bytes = URL_SAFE_NO_PAD.decode(part).map_err(|_| AuthError::InvalidOrExpiredToken)?;
  serde_json::from_slice(&bytes).map_err(|_| AuthError::InvalidOrExpiredToken)
}

#[cfg(test)]
mod tests {
  use super::*;

  const SECRET: &[u8] = b"test-secret-0123456789";

  #[test]
  fn issued_token_decodes_to_same_claims() {
    let service = TokenService::new(SECRET, 1);
    let user_id = Uuid::new_v4();
    let token = service.issue(user_id, Role::Admin).unwrap();
    assert_eq!(token.split('.').count(), 3);

    let claims = service.decode(&token).unwrap();
    assert_eq!(claims.sub, user_id);
    assert_eq!(claims.role, Role::Admin);
    assert_eq!(claims.exp - claims.iat, 3600);
  }

  #[test]
  fn tampered_or_foreign_tokens_are_rejected() {
    let service = TokenService::new(SECRET, 1);
    let token = service.issue(Uuid::new_v4(), Role::Customer).unwrap();

    let other = TokenService::new(b"another-secret-0123456789", 1);
    assert_eq!(other.decode(&token), Err(AuthError::InvalidOrExpiredToken));

    // Swap in a payload that claims admin while keeping the old signature.
    let parts: Vec<&str> = token.split('.').collect();
    let forged_claims = Claims {
      sub: Uuid::new_v4(),
      role: Role::Admin,
      iat: 0,
      exp: i64::MAX,
    };
    let forged_payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&forged_claims).unwrap());
    let forged = format!("{}.{}.{}", parts[0], forged_payload, parts[2]);
    assert_eq!(service.decode(&forged), Err(AuthError::InvalidOrExpiredToken));

    assert_eq!(service.decode("garbage"), Err(AuthError::InvalidOrExpiredToken));
    assert_eq!(service.decode("a.b.c.d"), Err(AuthError::InvalidOrExpiredToken));
  }

  #[test]
  fn expired_token_is_rejected() {
    let service = TokenService::new(SECRET, -1);
    let token = service.issue(Uuid::new_v4(), Role::Customer).unwrap();
    assert_eq!(service.decode(&token), Err(AuthError::InvalidOrExpiredToken));
  }
}
