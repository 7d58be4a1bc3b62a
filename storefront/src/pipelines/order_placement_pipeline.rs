// harvest_store/src/pipelines/order_placement_pipeline.rs

//! Turns a submitted cart into a persisted order.
//!
//! Everything that can reject the order runs before anything is written.
//! Stock is then taken with one atomic decrement per product, and the order
//! row is written last. A failure after a decrement releases every
//! reservation already made, so a failed placement leaves no order behind
//! and stock exactly as it was.

use crate::errors::AppError;
use crate::models::{LineItem, Money, NewOrder};
use crate::pipelines::contexts::PlaceOrderCtxData;
use crate::state::AppState;
use harvest_flow::{ContextData, FlowRegistry, Pipeline, PipelineControl};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

pub const STEPS: [&str; 4] = ["validate_order_input", "price_line_items", "reserve_stock", "persist_order"];

pub fn register_order_placement_pipeline(registry: &Arc<FlowRegistry<AppError>>, _app_state: &AppState) {
  let mut pipeline = Pipeline::<PlaceOrderCtxData, AppError>::new(&[
    (STEPS[0], false, None),
    (STEPS[1], false, None),
    (STEPS[2], false, None),
    (STEPS[3], false, None),
  ]);

  pipeline.on_root(STEPS[0], |ctx| Box::pin(validate_order_input(ctx)));
  pipeline.on_root(STEPS[1], |ctx| Box::pin(price_line_items(ctx)));
  pipeline.on_root(STEPS[2], |ctx| Box::pin(reserve_stock(ctx)));
  pipeline.compensate_root(STEPS[2], |ctx| Box::pin(release_reservations(ctx)));
  pipeline.on_root(STEPS[3], |ctx| Box::pin(persist_order(ctx)));

  registry.register_pipeline(pipeline);
  tracing::info!("Order placement pipeline registered.");
}

#[instrument(name = "order_placement::validate_order_input", skip_all)]
async fn validate_order_input(ctx_data: ContextData<PlaceOrderCtxData>) -> Result<PipelineControl, AppError> {
  let (customer_name, customer_address, requested_items, max_units) = {
    let guard = ctx_data.read();
    (
      guard.customer_name.trim().to_string(),
      guard.customer_address.trim().to_string(),
      guard.requested_items.clone(),
      guard.app_state.config.max_units_per_product,
    )
  };

  let mut problems = Vec::new();
  if customer_name.is_empty() {
    problems.push("customerName is required".to_string());
  }
  if customer_address.is_empty() {
    problems.push("customerAddress is required".to_string());
  }
  if requested_items.is_empty() {
    problems.push("items must not be empty".to_string());
  }

  let mut quantities: Vec<(Uuid, i64)> = Vec::new();
  let mut index_of: HashMap<Uuid, usize> = HashMap::new();
  for item in &requested_items {
    if item.quantity <= 0 {
      problems.push(format!("quantity for product {} must be positive", item.product_id));
      continue;
    }
    match index_of.get(&item.product_id) {
      Some(&idx) => quantities[idx].1 = quantities[idx].1.saturating_add(item.quantity),
      None => {
        index_of.insert(item.product_id, quantities.len());
        quantities.push((item.product_id, item.quantity));
      }
    }
  }
  for (product_id, quantity) in &quantities {
    if *quantity > max_units {
      problems.push(format!(
        "quantity for product {} exceeds the maximum of {} units per order",
        product_id, max_units
      ));
    }
  }

  if !problems.is_empty() {
    warn!(?problems, "Order input rejected.");
    return Err(AppError::Validation(format!("Invalid order: {}", problems.join("; "))));
  }

  {
    let mut guard = ctx_data.write();
    guard.customer_name = customer_name;
    guard.customer_address = customer_address;
    guard.quantities = quantities;
  }
  Ok(PipelineControl::Continue)
}

#[instrument(name = "order_placement::price_line_items", skip_all)]
async fn price_line_items(ctx_data: ContextData<PlaceOrderCtxData>) -> Result<PipelineControl, AppError> {
  let (catalog, quantities, client_prices, client_total) = {
    let guard = ctx_data.read();
    let client_prices: Vec<(Uuid, Money)> = guard
      .requested_items
      .iter()
      .filter_map(|item| item.client_price.map(|price| (item.product_id, price)))
      .collect();
    (
      guard.app_state.stores.catalog.clone(),
      guard.quantities.clone(),
      client_prices,
      guard.client_total,
    )
  };

  let mut line_items = Vec::with_capacity(quantities.len());
  let mut warnings = Vec::new();
  let mut total = Money::ZERO;
  for (product_id, quantity) in quantities {
    let product = match catalog.get_by_id(product_id).await {
      Ok(product) => product,
      Err(AppError::NotFound(_)) => {
        return Err(AppError::Validation(format!("Product {} not found", product_id)));
      }
      Err(e) => return Err(e),
    };
    if quantity > product.stock {
      warn!(%product_id, requested = quantity, available = product.stock, "Not enough stock to price order.");
      return Err(AppError::InsufficientStock {
        product: product.name,
        requested: quantity,
        available: product.stock,
      });
    }

    let stale_price = client_prices
      .iter()
      .find(|(id, price)| *id == product_id && *price != product.price)
      .map(|(_, price)| *price);
    if let Some(client_price) = stale_price {
      warn!(%product_id, %client_price, catalog_price = %product.price, "Submitted price differs from catalog.");
      warnings.push(format!(
        "Submitted price {} for {} differs from the current catalog price {}; the catalog price was used.",
        client_price, product.name, product.price
      ));
    }

    let item = LineItem {
      product_id,
      name: product.name,
      quantity,
      price: product.price,
    };
    total = item
      .subtotal()
      .and_then(|subtotal| total.checked_add(subtotal))
      .ok_or_else(|| AppError::Validation("Order total is too large".to_string()))?;
    line_items.push(item);
  }

  if let Some(client_total) = client_total {
    if client_total != total {
      warn!(%client_total, computed_total = %total, "Submitted total differs from catalog prices.");
      warnings.push(format!(
        "Submitted total {} differs from the current catalog total {}; the catalog total was used.",
        client_total, total
      ));
    }
  }

  {
    let mut guard = ctx_data.write();
    guard.line_items = line_items;
    guard.total_amount = Some(total);
    guard.warnings.extend(warnings);
  }
  Ok(PipelineControl::Continue)
}

#[instrument(name = "order_placement::reserve_stock", skip_all)]
async fn reserve_stock(ctx_data: ContextData<PlaceOrderCtxData>) -> Result<PipelineControl, AppError> {
  let (catalog, line_items) = {
    let guard = ctx_data.read();
    (guard.app_state.stores.catalog.clone(), guard.line_items.clone())
  };

  for item in line_items {
    match catalog.adjust_stock(item.product_id, -item.quantity).await {
      Ok(product) => {
        info!(product_id = %item.product_id, taken = item.quantity, remaining = product.stock, "Stock reserved.");
        ctx_data.write().reservations.push((item.product_id, item.quantity));
      }
      Err(AppError::NotFound(_)) => {
        warn!(product_id = %item.product_id, name = %item.name, "Product vanished before its stock could be taken.");
        ctx_data.write().warnings.push(format!(
          "Product {} ({}) no longer exists; its stock was not adjusted.",
          item.name, item.product_id
        ));
      }
      Err(e) => return Err(e),
    }
  }
  Ok(PipelineControl::Continue)
}

async fn release_reservations(ctx_data: ContextData<PlaceOrderCtxData>) -> Result<(), AppError> {
  let (catalog, reservations) = {
    let mut guard = ctx_data.write();
    (guard.app_state.stores.catalog.clone(), std::mem::take(&mut guard.reservations))
  };

  let mut failed = 0usize;
  for (product_id, quantity) in reservations.into_iter().rev() {
    match catalog.adjust_stock(product_id, quantity).await {
      Ok(_) => info!(%product_id, quantity, "Reserved stock released."),
      Err(e) => {
        error!(%product_id, quantity, error = %e, "Failed to release reserved stock.");
        failed += 1;
      }
    }
  }
  if failed > 0 {
    return Err(AppError::Internal(format!("{} stock reservations could not be released", failed)));
  }
  Ok(())
}

#[instrument(name = "order_placement::persist_order", skip_all)]
async fn persist_order(ctx_data: ContextData<PlaceOrderCtxData>) -> Result<PipelineControl, AppError> {
  let (orders, new_order) = {
    let guard = ctx_data.read();
    let total_amount = guard
      .total_amount
      .ok_or_else(|| AppError::Internal("Order total was not computed before persisting.".to_string()))?;
    (
      guard.app_state.stores.orders.clone(),
      NewOrder {
        user_id: guard.user_id,
        customer_name: guard.customer_name.clone(),
        customer_address: guard.customer_address.clone(),
        items: guard.line_items.clone(),
        total_amount,
      },
    )
  };

  let order = orders.create(new_order).await?;
  info!(order_id = %order.id, total = %order.total_amount, "Order persisted.");
  ctx_data.write().created_order = Some(order);
  Ok(PipelineControl::Continue)
}
