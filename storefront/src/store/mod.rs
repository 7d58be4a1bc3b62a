// harvest_store/src/store/mod.rs

//! Storage boundary. Handlers and pipelines only see these traits; `Stores`
//! bundles one implementation of each.

pub mod memory;
pub mod postgres;

use crate::errors::{AppError, Result};
use crate::models::{
  ContactMessage, ContactStatus, NewContactMessage, NewOrder, NewProduct, NewUser, Order, OrderStatus, Product,
  ProductPatch, User,
};
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

#[async_trait]
pub trait CatalogStore: Send + Sync {
  /// `AppError::NotFound` when absent.
  async fn get_by_id(&self, id: Uuid) -> Result<Product>;

  /// Insertion order.
  async fn list_all(&self) -> Result<Vec<Product>>;

  /// Exact, case-sensitive category match, insertion order.
  async fn list_by_category(&self, category: &str) -> Result<Vec<Product>>;

  async fn create(&self, new_product: NewProduct) -> Result<Product>;

  async fn update(&self, id: Uuid, patch: ProductPatch) -> Result<Product>;

  /// Adds `delta` to the stock in one atomic step.
  ///
  /// Fails with `AppError::InsufficientStock` (stock untouched) when the result
  /// would be negative, `AppError::Validation` when it would overflow, and
  /// `AppError::NotFound` when the product is gone.
  async fn adjust_stock(&self, id: Uuid, delta: i64) -> Result<Product>;

  async fn delete(&self, id: Uuid) -> Result<()>;

  async fn count(&self) -> Result<i64>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
  async fn create(&self, new_order: NewOrder) -> Result<Order>;

  async fn get_by_id(&self, id: Uuid) -> Result<Order>;

  /// Orders owned by `user_id`, newest first.
  async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Order>>;

  /// Every order, newest first.
  async fn list_all(&self) -> Result<Vec<Order>>;

  async fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<Order>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
  /// `AppError::Validation` when the email is taken.
  async fn create(&self, new_user: NewUser) -> Result<User>;

  async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

  async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;

  /// Users with the given ids; unknown ids are skipped.
  async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<User>>;
}

#[async_trait]
pub trait ContactStore: Send + Sync {
  async fn create(&self, new_message: NewContactMessage) -> Result<ContactMessage>;

  /// Newest first.
  async fn list_all(&self) -> Result<Vec<ContactMessage>>;

  async fn update_status(&self, id: Uuid, status: ContactStatus) -> Result<ContactMessage>;
}

#[derive(Clone)]
pub struct Stores {
  pub catalog: Arc<dyn CatalogStore>,
  pub orders: Arc<dyn OrderStore>,
  pub users: Arc<dyn UserStore>,
  pub contact: Arc<dyn ContactStore>,
}

impl Stores {
  pub fn in_memory() -> Self {
    let store = Arc::new(memory::MemoryStore::default());
    Self {
      catalog: store.clone(),
      orders: store.clone(),
      users: store.clone(),
      contact: store,
    }
  }

  pub fn postgres(pool: sqlx::PgPool) -> Self {
    let store = Arc::new(postgres::PgStore::new(pool));
    Self {
      catalog: store.clone(),
      orders: store.clone(),
      users: store.clone(),
      contact: store,
    }
  }
}

/// Why a stock adjustment that the store refused was rejected.
pub(crate) fn rejected_stock_adjustment(product: String, stock: i64, delta: i64) -> AppError {
  match stock.checked_add(delta) {
    None => AppError::Validation(format!("Stock adjustment of {} for {} is out of range", delta, product)),
    Some(_) => AppError::InsufficientStock {
      product,
      requested: delta.saturating_neg(),
      available: stock,
    },
  }
}
