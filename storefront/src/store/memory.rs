// harvest_store/src/store/memory.rs

//! Process-local stores. Every operation runs inside one `Mutex` critical
//! section, which is what makes `adjust_stock` a single atomic step here.

use super::{rejected_stock_adjustment, CatalogStore, ContactStore, OrderStore, UserStore};
use crate::errors::{AppError, Result};
use crate::models::{
  ContactMessage, ContactStatus, NewContactMessage, NewOrder, NewProduct, NewUser, Order, OrderStatus, Product,
  ProductPatch, User,
};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use tracing::{debug, instrument};
use uuid::Uuid;

#[derive(Default)]
struct MemoryData {
  // Vecs keep insertion order, which the listing operations rely on.
  products: Vec<Product>,
  orders: Vec<Order>,
  users: Vec<User>,
  contact_messages: Vec<ContactMessage>,
}

#[derive(Default)]
pub struct MemoryStore {
  data: Mutex<MemoryData>,
}

fn product_not_found(id: Uuid) -> AppError {
  debug!(product_id = %id, "Product not in memory store.");
  AppError::NotFound("Product not found".to_string())
}

/// Newest first; equal timestamps keep the later insertion first.
fn newest_first<T>(
  items: impl DoubleEndedIterator<Item = T>,
  created_at: impl Fn(&T) -> chrono::DateTime<Utc>,
) -> Vec<T> {
  let mut out: Vec<T> = items.rev().collect();
  out.sort_by_key(|item| std::cmp::Reverse(created_at(item)));
  out
}

#[async_trait]
impl CatalogStore for MemoryStore {
  async fn get_by_id(&self, id: Uuid) -> Result<Product> {
    let data = self.data.lock();
    data.products.iter().find(|p| p.id == id).cloned().ok_or_else(|| product_not_found(id))
  }

  async fn list_all(&self) -> Result<Vec<Product>> {
    Ok(self.data.lock().products.clone())
  }

  async fn list_by_category(&self, category: &str) -> Result<Vec<Product>> {
    let data = self.data.lock();
    Ok(data.products.iter().filter(|p| p.category == category).cloned().collect())
  }

  async fn create(&self, new_product: NewProduct) -> Result<Product> {
    let product = new_product.into_product(Uuid::new_v4(), Utc::now());
    self.data.lock().products.push(product.clone());
    debug!(product_id = %product.id, "Product stored in memory.");
    Ok(product)
  }

  async fn update(&self, id: Uuid, patch: ProductPatch) -> Result<Product> {
    let mut data = self.data.lock();
    let product = data.products.iter_mut().find(|p| p.id == id).ok_or_else(|| product_not_found(id))?;
    patch.apply_to(product, Utc::now());
    Ok(product.clone())
  }

  #[instrument(name = "memory::adjust_stock", skip(self, id), fields(product_id = %id))]
  async fn adjust_stock(&self, id: Uuid, delta: i64) -> Result<Product> {
    let mut data = self.data.lock();
    let product = data.products.iter_mut().find(|p| p.id == id).ok_or_else(|| product_not_found(id))?;
    match product.stock.checked_add(delta) {
      Some(new_stock) if new_stock >= 0 => {
        product.stock = new_stock;
        product.updated_at = Utc::now();
        Ok(product.clone())
      }
      _ => Err(rejected_stock_adjustment(product.name.clone(), product.stock, delta)),
    }
  }

  async fn delete(&self, id: Uuid) -> Result<()> {
    let mut data = self.data.lock();
    let before = data.products.len();
    data.products.retain(|p| p.id != id);
    if data.products.len() == before {
      return Err(product_not_found(id));
    }
    Ok(())
  }

  async fn count(&self) -> Result<i64> {
    Ok(self.data.lock().products.len() as i64)
  }
}

#[async_trait]
impl OrderStore for MemoryStore {
  async fn create(&self, new_order: NewOrder) -> Result<Order> {
    let order = new_order.into_order(Uuid::new_v4(), Utc::now());
    self.data.lock().orders.push(order.clone());
    Ok(order)
  }

  async fn get_by_id(&self, id: Uuid) -> Result<Order> {
    let data = self.data.lock();
    data
      .orders
      .iter()
      .find(|o| o.id == id)
      .cloned()
      .ok_or_else(|| AppError::NotFound("Order not found".to_string()))
  }

  async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Order>> {
    let data = self.data.lock();
    let owned = data.orders.iter().filter(|o| o.user_id == Some(user_id)).cloned();
    Ok(newest_first(owned, |o| o.created_at))
  }

  async fn list_all(&self) -> Result<Vec<Order>> {
    let data = self.data.lock();
    Ok(newest_first(data.orders.iter().cloned(), |o| o.created_at))
  }

  async fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<Order> {
    let mut data = self.data.lock();
    let order = data
      .orders
      .iter_mut()
      .find(|o| o.id == id)
      .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;
    order.status = status;
    order.updated_at = Utc::now();
    Ok(order.clone())
  }
}

#[async_trait]
impl UserStore for MemoryStore {
  async fn create(&self, new_user: NewUser) -> Result<User> {
    let mut data = self.data.lock();
    if data.users.iter().any(|u| u.email == new_user.email) {
      return Err(AppError::Validation("An account with this email already exists.".to_string()));
    }
    let user = new_user.into_user(Uuid::new_v4(), Utc::now());
    data.users.push(user.clone());
    Ok(user)
  }

  async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
    Ok(self.data.lock().users.iter().find(|u| u.email == email).cloned())
  }

  async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
    Ok(self.data.lock().users.iter().find(|u| u.id == id).cloned())
  }

  async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<User>> {
    let data = self.data.lock();
    Ok(data.users.iter().filter(|u| ids.contains(&u.id)).cloned().collect())
  }
}

#[async_trait]
impl ContactStore for MemoryStore {
  async fn create(&self, new_message: NewContactMessage) -> Result<ContactMessage> {
    let message = new_message.into_message(Uuid::new_v4(), Utc::now());
    self.data.lock().contact_messages.push(message.clone());
    Ok(message)
  }

  async fn list_all(&self) -> Result<Vec<ContactMessage>> {
    let data = self.data.lock();
    Ok(newest_first(data.contact_messages.iter().cloned(), |m| m.created_at))
  }

  async fn update_status(&self, id: Uuid, status: ContactStatus) -> Result<ContactMessage> {
    let mut data = self.data.lock();
    let message = data
      .contact_messages
      .iter_mut()
      .find(|m| m.id == id)
      .ok_or_else(|| AppError::NotFound("Message not found".to_string()))?;
    message.status = status;
    Ok(message.clone())
  }
}
