// harvest_store/src/pipelines/contexts.rs

//! Data carried through each pipeline. Handlers receive these wrapped in
//! `harvest_flow::ContextData`.

use crate::models::{LineItem, Money, Order, Role};
use crate::state::AppState;
use uuid::Uuid;

#[derive(Clone)]
pub struct SignupCtxData {
  pub app_state: AppState,
  pub name: String,
  pub email: String,
  pub password: String,
  pub created_user_id: Option<Uuid>,
}

#[derive(Clone)]
pub struct SigninCtxData {
  pub app_state: AppState,
  pub email: String,
  pub password: String,
  pub temp_password_hash: Option<String>,
  pub user_id: Option<Uuid>,
  pub user_name: Option<String>,
  pub user_role: Option<Role>,
  pub session_token: Option<String>,
}

/// One line of a submitted cart. Only `product_id` and `quantity` are
/// trusted; `client_price` is compared against the catalog price and never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestedItem {
  pub product_id: Uuid,
  pub quantity: i64,
  pub client_price: Option<Money>,
}

#[derive(Clone)]
pub struct PlaceOrderCtxData {
  pub app_state: AppState,
  // --- Input ---
  pub user_id: Option<Uuid>,
  pub customer_name: String,
  pub customer_address: String,
  pub requested_items: Vec<RequestedItem>,
  /// Display hint from the client, compared against the recomputed total.
  pub client_total: Option<Money>,
  // --- Filled by the pipeline ---
  /// Requested quantity per product, duplicate lines summed, first-seen order.
  pub quantities: Vec<(Uuid, i64)>,
  pub line_items: Vec<LineItem>,
  pub total_amount: Option<Money>,
  /// Stock taken so far; released again if a later step fails.
  pub reservations: Vec<(Uuid, i64)>,
  pub warnings: Vec<String>,
  pub created_order: Option<Order>,
}

impl PlaceOrderCtxData {
  pub fn new(
    app_state: AppState,
    user_id: Option<Uuid>,
    customer_name: String,
    customer_address: String,
    requested_items: Vec<RequestedItem>,
    client_total: Option<Money>,
  ) -> Self {
    Self {
      app_state,
      user_id,
      customer_name,
      customer_address,
      requested_items,
      client_total,
      quantities: Vec::new(),
      line_items: Vec::new(),
      total_amount: None,
      reservations: Vec::new(),
      warnings: Vec::new(),
      created_order: None,
    }
  }
}
