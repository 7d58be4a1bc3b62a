// harvest_store/src/pipelines/mod.rs

//! Defines and registers the pipelines used by the storefront.

use crate::errors::AppError;
use crate::state::AppState;
use harvest_flow::FlowRegistry;
use std::sync::Arc;

pub mod contexts;

pub mod order_placement_pipeline;
pub mod signin_pipeline;
pub mod signup_pipeline;

/// Registers every pipeline with `registry`. Called once while building `AppState`.
pub fn register_all_pipelines(registry: &Arc<FlowRegistry<AppError>>, app_state: &AppState) {
  tracing::info!("Registering pipelines...");

  signup_pipeline::register_signup_pipeline(registry, app_state);
  signin_pipeline::register_signin_pipeline(registry, app_state);
  order_placement_pipeline::register_order_placement_pipeline(registry, app_state);

  tracing::info!("All application pipelines registered.");
}
