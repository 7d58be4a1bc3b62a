// harvest_store/src/models/order.rs

use super::money::Money;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type as SqlxType};
use uuid::Uuid;

/// Any status may follow any other; admins correct mistakes by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "order_status")]
pub enum OrderStatus {
  #[default]
  Pending,
  Processing,
  Shipped,
  Delivered,
  Cancelled,
}

/// Snapshot of one product taken when the order was placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
  pub product_id: Uuid,
  pub name: String,
  pub quantity: i64,
  pub price: Money,
}

impl LineItem {
  pub fn subtotal(&self) -> Option<Money> {
    self.price.checked_mul(self.quantity)
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
  #[serde(rename = "_id")]
  pub id: Uuid,
  /// Owning user; `None` for guest checkout.
  #[serde(rename = "user")]
  pub user_id: Option<Uuid>,
  pub customer_name: String,
  pub customer_address: String,
  #[sqlx(json)]
  pub items: Vec<LineItem>,
  #[sqlx(rename = "total_amount_cents")]
  pub total_amount: Money,
  pub status: OrderStatus,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Input for `OrderStore::create`. The status always starts at `Pending`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
  pub user_id: Option<Uuid>,
  pub customer_name: String,
  pub customer_address: String,
  pub items: Vec<LineItem>,
  pub total_amount: Money,
}

impl NewOrder {
  pub fn into_order(self, id: Uuid, now: DateTime<Utc>) -> Order {
    Order {
      id,
      user_id: self.user_id,
      customer_name: self.customer_name,
      customer_address: self.customer_address,
      items: self.items,
      total_amount: self.total_amount,
      status: OrderStatus::Pending,
      created_at: now,
      updated_at: now,
    }
  }
}

/// Owner details embedded in admin listings in place of the bare user id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerSummary {
  #[serde(rename = "_id")]
  pub id: Uuid,
  pub name: String,
  pub email: String,
}

/// Admin listing row. `user` carries the owner's details, or null for guest
/// orders and owners that no longer exist.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminOrderView {
  #[serde(rename = "_id")]
  pub id: Uuid,
  pub user: Option<CustomerSummary>,
  pub customer_name: String,
  pub customer_address: String,
  pub items: Vec<LineItem>,
  pub total_amount: Money,
  pub status: OrderStatus,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl AdminOrderView {
  pub fn new(order: Order, user: Option<CustomerSummary>) -> Self {
    Self {
      id: order.id,
      user,
      customer_name: order.customer_name,
      customer_address: order.customer_address,
      items: order.items,
      total_amount: order.total_amount,
      status: order.status,
      created_at: order.created_at,
      updated_at: order.updated_at,
    }
  }
}
