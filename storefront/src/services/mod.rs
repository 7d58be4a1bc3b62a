// harvest_store/src/services/mod.rs

pub mod auth_service;
pub mod credential_verifier;
pub mod token_service;

pub use credential_verifier::{CredentialVerifier, Identity};
pub use token_service::{Claims, TokenService};
