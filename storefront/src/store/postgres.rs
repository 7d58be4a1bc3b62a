// harvest_store/src/store/postgres.rs

//! PostgreSQL stores over a shared `PgPool`.

use super::{rejected_stock_adjustment, CatalogStore, ContactStore, OrderStore, UserStore};
use crate::errors::{AppError, Result};
use crate::models::{
  ContactMessage, ContactStatus, NewContactMessage, NewOrder, NewProduct, NewUser, Order, OrderStatus, Product,
  ProductPatch, User,
};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::{error, instrument, warn};
use uuid::Uuid;

const PRODUCT_COLUMNS: &str = "id, name, category, price_cents, stock, image, description, about, benefits, usage, \
   dosage, manufacturing_info, highlights, created_at, updated_at";
const ORDER_COLUMNS: &str =
  "id, user_id, customer_name, customer_address, items, total_amount_cents, status, created_at, updated_at";
const USER_COLUMNS: &str = "id, name, email, password_hash, is_admin, created_at, updated_at";
const CONTACT_COLUMNS: &str = "id, name, email, mobile, comments, status, created_at";

pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

pub struct PgStore {
  pool: PgPool,
}

impl PgStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

/// Applies pending schema migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
  MIGRATOR.run(pool).await.map_err(|e| {
    error!(error = %e, "Database migration failed.");
    AppError::Internal(format!("Database migration failed: {}", e))
  })
}

fn product_not_found() -> AppError {
  AppError::NotFound("Product not found".to_string())
}

#[async_trait]
impl CatalogStore for PgStore {
  async fn get_by_id(&self, id: Uuid) -> Result<Product> {
    sqlx::query_as::<_, Product>(&format!("SELECT {} FROM products WHERE id = $1", PRODUCT_COLUMNS))
      .bind(id)
      .fetch_optional(&self.pool)
      .await?
      .ok_or_else(product_not_found)
  }

  async fn list_all(&self) -> Result<Vec<Product>> {
    let products = sqlx::query_as::<_, Product>(&format!("SELECT {} FROM products ORDER BY seq ASC", PRODUCT_COLUMNS))
      .fetch_all(&self.pool)
      .await?;
    Ok(products)
  }

  async fn list_by_category(&self, category: &str) -> Result<Vec<Product>> {
    let products = sqlx::query_as::<_, Product>(&format!(
      "SELECT {} FROM products WHERE category = $1 ORDER BY seq ASC",
      PRODUCT_COLUMNS
    ))
    .bind(category)
    .fetch_all(&self.pool)
    .await?;
    Ok(products)
  }

  async fn create(&self, new_product: NewProduct) -> Result<Product> {
    let product = new_product.into_product(Uuid::new_v4(), Utc::now());
    let stored = sqlx::query_as::<_, Product>(&format!(
      "INSERT INTO products (id, name, category, price_cents, stock, image, description, about, benefits, usage, \
       dosage, manufacturing_info, highlights, created_at, updated_at) \
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15) RETURNING {}",
      PRODUCT_COLUMNS
    ))
    .bind(product.id)
    .bind(&product.name)
    .bind(&product.category)
    .bind(product.price)
    .bind(product.stock)
    .bind(&product.image)
    .bind(&product.description)
    .bind(&product.about)
    .bind(&product.benefits)
    .bind(&product.usage)
    .bind(&product.dosage)
    .bind(&product.manufacturing_info)
    .bind(&product.highlights)
    .bind(product.created_at)
    .bind(product.updated_at)
    .fetch_one(&self.pool)
    .await?;
    Ok(stored)
  }

  async fn update(&self, id: Uuid, patch: ProductPatch) -> Result<Product> {
    // Row lock so a concurrent stock adjustment is not overwritten by the merged row.
    let mut tx = self.pool.begin().await?;
    let mut product = sqlx::query_as::<_, Product>(&format!(
      "SELECT {} FROM products WHERE id = $1 FOR UPDATE",
      PRODUCT_COLUMNS
    ))
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(product_not_found)?;

    patch.apply_to(&mut product, Utc::now());

    let updated = sqlx::query_as::<_, Product>(&format!(
      "UPDATE products SET name = $2, category = $3, price_cents = $4, stock = $5, image = $6, description = $7, \
       about = $8, benefits = $9, usage = $10, dosage = $11, manufacturing_info = $12, highlights = $13, \
       updated_at = $14 WHERE id = $1 RETURNING {}",
      PRODUCT_COLUMNS
    ))
    .bind(product.id)
    .bind(&product.name)
    .bind(&product.category)
    .bind(product.price)
    .bind(product.stock)
    .bind(&product.image)
    .bind(&product.description)
    .bind(&product.about)
    .bind(&product.benefits)
    .bind(&product.usage)
    .bind(&product.dosage)
    .bind(&product.manufacturing_info)
    .bind(&product.highlights)
    .bind(product.updated_at)
    .fetch_one(&mut *tx)
    .await?;
    tx.commit().await?;
    Ok(updated)
  }

  #[instrument(name = "postgres::adjust_stock", skip(self, id), fields(product_id = %id))]
  async fn adjust_stock(&self, id: Uuid, delta: i64) -> Result<Product> {
    let adjusted = sqlx::query_as::<_, Product>(&format!(
      "UPDATE products SET stock = stock + $2, updated_at = NOW() \
       WHERE id = $1 AND stock::numeric + $2 BETWEEN 0 AND 9223372036854775807 RETURNING {}",
      PRODUCT_COLUMNS
    ))
    .bind(id)
    .bind(delta)
    .fetch_optional(&self.pool)
    .await?;

    if let Some(product) = adjusted {
      return Ok(product);
    }

    // No row updated: either the product is gone or the guard rejected the delta.
    let current: Option<(String, i64)> = sqlx::query_as("SELECT name, stock FROM products WHERE id = $1")
      .bind(id)
      .fetch_optional(&self.pool)
      .await?;
    match current {
      None => Err(product_not_found()),
      Some((name, stock)) => {
        warn!(available = stock, delta, "Stock adjustment rejected by the range guard.");
        Err(rejected_stock_adjustment(name, stock, delta))
      }
    }
  }

  async fn delete(&self, id: Uuid) -> Result<()> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
      .bind(id)
      .execute(&self.pool)
      .await?;
    if result.rows_affected() == 0 {
      return Err(product_not_found());
    }
    Ok(())
  }

  async fn count(&self) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
      .fetch_one(&self.pool)
      .await?;
    Ok(count)
  }
}

#[async_trait]
impl OrderStore for PgStore {
  async fn create(&self, new_order: NewOrder) -> Result<Order> {
    let order = new_order.into_order(Uuid::new_v4(), Utc::now());
    let stored = sqlx::query_as::<_, Order>(&format!(
      "INSERT INTO orders (id, user_id, customer_name, customer_address, items, total_amount_cents, status, \
       created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {}",
      ORDER_COLUMNS
    ))
    .bind(order.id)
    .bind(order.user_id)
    .bind(&order.customer_name)
    .bind(&order.customer_address)
    .bind(Json(&order.items))
    .bind(order.total_amount)
    .bind(order.status)
    .bind(order.created_at)
    .bind(order.updated_at)
    .fetch_one(&self.pool)
    .await?;
    Ok(stored)
  }

  async fn get_by_id(&self, id: Uuid) -> Result<Order> {
    sqlx::query_as::<_, Order>(&format!("SELECT {} FROM orders WHERE id = $1", ORDER_COLUMNS))
      .bind(id)
      .fetch_optional(&self.pool)
      .await?
      .ok_or_else(|| AppError::NotFound("Order not found".to_string()))
  }

  async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Order>> {
    let orders = sqlx::query_as::<_, Order>(&format!(
      "SELECT {} FROM orders WHERE user_id = $1 ORDER BY created_at DESC",
      ORDER_COLUMNS
    ))
    .bind(user_id)
    .fetch_all(&self.pool)
    .await?;
    Ok(orders)
  }

  async fn list_all(&self) -> Result<Vec<Order>> {
    let orders = sqlx::query_as::<_, Order>(&format!("SELECT {} FROM orders ORDER BY created_at DESC", ORDER_COLUMNS))
      .fetch_all(&self.pool)
      .await?;
    Ok(orders)
  }

  async fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<Order> {
    sqlx::query_as::<_, Order>(&format!(
      "UPDATE orders SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
      ORDER_COLUMNS
    ))
    .bind(id)
    .bind(status)
    .fetch_optional(&self.pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Order not found".to_string()))
  }
}

#[async_trait]
impl UserStore for PgStore {
  async fn create(&self, new_user: NewUser) -> Result<User> {
    let user = new_user.into_user(Uuid::new_v4(), Utc::now());
    let inserted = sqlx::query_as::<_, User>(&format!(
      "INSERT INTO users (id, name, email, password_hash, is_admin, created_at, updated_at) \
       VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {}",
      USER_COLUMNS
    ))
    .bind(user.id)
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(user.is_admin)
    .bind(user.created_at)
    .bind(user.updated_at)
    .fetch_one(&self.pool)
    .await;

    match inserted {
      Ok(stored) => Ok(stored),
      Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
        Err(AppError::Validation("An account with this email already exists.".to_string()))
      }
      Err(e) => Err(AppError::Sqlx(e)),
    }
  }

  async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS))
      .bind(email)
      .fetch_optional(&self.pool)
      .await?;
    Ok(user)
  }

  async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
      .bind(id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(user)
  }

  async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<User>> {
    if ids.is_empty() {
      return Ok(Vec::new());
    }
    let users = sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = ANY($1)", USER_COLUMNS))
      .bind(ids.to_vec())
      .fetch_all(&self.pool)
      .await?;
    Ok(users)
  }
}

#[async_trait]
impl ContactStore for PgStore {
  async fn create(&self, new_message: NewContactMessage) -> Result<ContactMessage> {
    let message = new_message.into_message(Uuid::new_v4(), Utc::now());
    let stored = sqlx::query_as::<_, ContactMessage>(&format!(
      "INSERT INTO contact_messages (id, name, email, mobile, comments, status, created_at) \
       VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {}",
      CONTACT_COLUMNS
    ))
    .bind(message.id)
    .bind(&message.name)
    .bind(&message.email)
    .bind(&message.mobile)
    .bind(&message.comments)
    .bind(message.status)
    .bind(message.created_at)
    .fetch_one(&self.pool)
    .await?;
    Ok(stored)
  }

  async fn list_all(&self) -> Result<Vec<ContactMessage>> {
    let messages = sqlx::query_as::<_, ContactMessage>(&format!(
      "SELECT {} FROM contact_messages ORDER BY created_at DESC",
      CONTACT_COLUMNS
    ))
    .fetch_all(&self.pool)
    .await?;
    Ok(messages)
  }

  async fn update_status(&self, id: Uuid, status: ContactStatus) -> Result<ContactMessage> {
    sqlx::query_as::<_, ContactMessage>(&format!(
      "UPDATE contact_messages SET status = $2 WHERE id = $1 RETURNING {}",
      CONTACT_COLUMNS
    ))
    .bind(id)
    .bind(status)
    .fetch_optional(&self.pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Message not found".to_string()))
  }
}
