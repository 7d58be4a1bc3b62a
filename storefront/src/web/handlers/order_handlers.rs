// harvest_store/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use harvest_flow::{ContextData, PipelineResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::serde_util::lenient_i64;
use crate::models::{AdminOrderView, CustomerSummary, Money, Order, OrderStatus};
use crate::pipelines::contexts::{PlaceOrderCtxData, RequestedItem};
use crate::state::AppState;
use crate::web::extractors::{AdminUser, AuthenticatedUser, MaybeUser};

// --- Request DTOs ---

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemPayload {
  pub product_id: Uuid,
  #[serde(default, deserialize_with = "lenient_i64")]
  pub quantity: Option<i64>,
  pub price: Option<Money>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderPayload {
  /// Owner claimed by the client. Ownership comes from the bearer token instead.
  pub user: Option<Uuid>,
  #[serde(default)]
  pub customer_name: String,
  #[serde(default)]
  pub customer_address: String,
  #[serde(default)]
  pub items: Vec<OrderItemPayload>,
  pub total_amount: Option<Money>,
}

#[derive(Deserialize, Debug)]
pub struct UpdateOrderStatusPayload {
  pub status: Option<OrderStatus>,
}

/// The created order, plus any anomalies met while taking stock.
#[derive(Serialize, Debug)]
pub struct PlacedOrderResponse {
  #[serde(flatten)]
  pub order: Order,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub warnings: Vec<String>,
}

// --- Handler Implementations ---

#[instrument(
  name = "handler::place_order",
  skip(app_state, maybe_user, req_payload),
  fields(num_items = req_payload.items.len())
)]
pub async fn place_order_handler(
  app_state: web::Data<AppState>,
  maybe_user: MaybeUser,
  req_payload: web::Json<PlaceOrderPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.into_inner();
  let user_id = maybe_user.0.as_ref().map(|identity| identity.user_id);
  if payload.user.is_some() && payload.user != user_id {
    debug!(claimed_user = ?payload.user, ?user_id, "Ignoring client-supplied order owner.");
  }

  let requested_items = payload
    .items
    .into_iter()
    .map(|item| RequestedItem {
      product_id: item.product_id,
      quantity: item.quantity.unwrap_or(0),
      client_price: item.price,
    })
    .collect();
  let ctx_data = ContextData::new(PlaceOrderCtxData::new(
    app_state.get_ref().clone(),
    user_id,
    payload.customer_name,
    payload.customer_address,
    requested_items,
    payload.total_amount,
  ));

  match app_state.flow_registry.run(ctx_data.clone()).await {
    Ok(PipelineResult::Completed) => {
      let (order, warnings) = {
        let mut guard = ctx_data.write();
        (guard.created_order.take(), std::mem::take(&mut guard.warnings))
      };
      let order = order.ok_or_else(|| {
        warn!("Order placement completed but no order was recorded in context.");
        AppError::Internal("Order placement completed without an order.".to_string())
      })?;
      info!(order_id = %order.id, warnings = warnings.len(), "Order placed.");
      Ok(HttpResponse::Created().json(PlacedOrderResponse { order, warnings }))
    }
    Ok(PipelineResult::Stopped) => {
      warn!("Order placement pipeline was stopped by a handler.");
      Err(AppError::Internal("Order placement was halted by an internal step.".to_string()))
    }
    Err(app_err) => {
      warn!("Order placement failed: {}", app_err);
      Err(app_err)
    }
  }
}

/// A user may read their own orders; administrators may read anyone's.
#[instrument(
  name = "handler::list_user_orders",
  skip(app_state, auth_user, path),
  fields(caller_id = %auth_user.0.user_id, user_id = %path.as_ref())
)]
pub async fn list_user_orders_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let user_id = path.into_inner();
  if auth_user.0.user_id != user_id && !auth_user.0.is_admin() {
    warn!("User attempted to read another user's orders.");
    return Err(AppError::Forbidden("Not authorized to view these orders".to_string()));
  }
  let orders = app_state.stores.orders.list_by_user(user_id).await?;
  Ok(HttpResponse::Ok().json(orders))
}

#[instrument(name = "handler::list_all_orders", skip(app_state, admin), fields(admin_id = %admin.0.user_id))]
pub async fn list_all_orders_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
) -> Result<HttpResponse, AppError> {
  let orders = app_state.stores.orders.list_all().await?;

  let mut owner_ids: Vec<Uuid> = orders.iter().filter_map(|o| o.user_id).collect();
  owner_ids.sort_unstable();
  owner_ids.dedup();
  let customers: HashMap<Uuid, CustomerSummary> = app_state
    .stores
    .users
    .find_many(&owner_ids)
    .await?
    .into_iter()
    .map(|user| {
      (
        user.id,
        CustomerSummary {
          id: user.id,
          name: user.name,
          email: user.email,
        },
      )
    })
    .collect();

  let views: Vec<AdminOrderView> = orders
    .into_iter()
    .map(|order| {
      let owner = order.user_id.and_then(|id| customers.get(&id).cloned());
      AdminOrderView::new(order, owner)
    })
    .collect();
  info!("Fetched {} orders for admin view.", views.len());
  Ok(HttpResponse::Ok().json(views))
}

#[instrument(
  name = "handler::update_order_status",
  skip(app_state, admin, path, req_payload),
  fields(admin_id = %admin.0.user_id, order_id = %path.as_ref())
)]
pub async fn update_order_status_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  path: web::Path<Uuid>,
  req_payload: web::Json<UpdateOrderStatusPayload>,
) -> Result<HttpResponse, AppError> {
  let status = req_payload
    .status
    .ok_or_else(|| AppError::Validation("status is required.".to_string()))?;
  let order = app_state.stores.orders.update_status(path.into_inner(), status).await?;
  info!(?status, "Order status updated.");
  Ok(HttpResponse::Ok().json(order))
}
