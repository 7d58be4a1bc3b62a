// harvest_store/src/state.rs

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::pipelines;
use crate::services::{CredentialVerifier, TokenService};
use crate::store::Stores;
use harvest_flow::FlowRegistry;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
  pub stores: Stores,
  pub flow_registry: Arc<FlowRegistry<AppError>>,
  pub config: Arc<AppConfig>, // Share loaded config
  pub verifier: Arc<CredentialVerifier>,
}

impl AppState {
  /// Builds the shared state and registers every pipeline against it.
  pub fn new(config: Arc<AppConfig>, stores: Stores) -> Self {
    let tokens = TokenService::new(config.jwt_secret.as_bytes(), config.token_ttl_hours);
    let flow_registry = Arc::new(FlowRegistry::<AppError>::new());
    let app_state = Self {
      stores,
      flow_registry: flow_registry.clone(),
      config,
      verifier: Arc::new(CredentialVerifier::new(tokens)),
    };
    pipelines::register_all_pipelines(&flow_registry, &app_state);
    app_state
  }
}
