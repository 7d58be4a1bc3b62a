// harvest_store/src/web/handlers/product_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::serde_util::{double_option, lenient_i64};
use crate::models::{MediaRef, Money, NewProduct, Product, ProductPatch, ProductView};
use crate::state::AppState;
use crate::web::extractors::AdminUser;

// --- Request DTOs ---

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductPayload {
  pub name: Option<String>,
  pub category: Option<String>,
  pub price: Option<Money>,
  #[serde(default, deserialize_with = "lenient_i64")]
  pub stock: Option<i64>,
  pub image: Option<String>,
  pub description: Option<String>,
  pub about: Option<String>,
  pub benefits: Option<String>,
  pub usage: Option<String>,
  pub dosage: Option<String>,
  pub manufacturing_info: Option<String>,
  pub highlights: Option<String>,
}

/// Only the keys present in the body are changed; `null` clears an optional field.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductPayload {
  pub name: Option<String>,
  pub category: Option<String>,
  pub price: Option<Money>,
  #[serde(default, deserialize_with = "lenient_i64")]
  pub stock: Option<i64>,
  #[serde(default, deserialize_with = "double_option")]
  pub image: Option<Option<String>>,
  pub description: Option<String>,
  #[serde(default, deserialize_with = "double_option")]
  pub about: Option<Option<String>>,
  #[serde(default, deserialize_with = "double_option")]
  pub benefits: Option<Option<String>>,
  #[serde(default, deserialize_with = "double_option")]
  pub usage: Option<Option<String>>,
  #[serde(default, deserialize_with = "double_option")]
  pub dosage: Option<Option<String>>,
  #[serde(default, deserialize_with = "double_option")]
  pub manufacturing_info: Option<Option<String>>,
  #[serde(default, deserialize_with = "double_option")]
  pub highlights: Option<Option<String>>,
}

#[derive(Deserialize, Debug)]
pub struct StockAdjustmentPayload {
  /// Added to the current stock; negative values remove units.
  #[serde(default, deserialize_with = "lenient_i64")]
  pub stock: Option<i64>,
}

fn non_blank(value: Option<String>) -> Option<String> {
  value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl CreateProductPayload {
  pub fn into_new_product(self) -> Result<NewProduct, AppError> {
    let name = non_blank(self.name);
    let category = non_blank(self.category);
    let description = non_blank(self.description);

    let mut missing = Vec::new();
    if name.is_none() {
      missing.push("name");
    }
    if description.is_none() {
      missing.push("description");
    }
    if category.is_none() {
      missing.push("category");
    }
    if self.price.is_none() {
      missing.push("price");
    }
    let (Some(name), Some(category), Some(description), Some(price)) = (name, category, description, self.price)
    else {
      return Err(AppError::Validation(format!("Missing required fields: {}", missing.join(", "))));
    };

    let stock = self.stock.unwrap_or(0);
    if stock < 0 {
      return Err(AppError::Validation("Stock cannot be negative.".to_string()));
    }

    Ok(NewProduct {
      name,
      category,
      price,
      stock,
      image: self.image.and_then(MediaRef::new),
      description,
      about: self.about,
      benefits: self.benefits,
      usage: self.usage,
      dosage: self.dosage,
      manufacturing_info: self.manufacturing_info,
      highlights: self.highlights,
    })
  }
}

impl UpdateProductPayload {
  pub fn into_patch(self) -> Result<ProductPatch, AppError> {
    let required_text = |field: &str, value: Option<String>| -> Result<Option<String>, AppError> {
      match value {
        Some(v) if v.trim().is_empty() => Err(AppError::Validation(format!("{} cannot be empty.", field))),
        Some(v) => Ok(Some(v.trim().to_string())),
        None => Ok(None),
      }
    };
    if matches!(self.stock, Some(stock) if stock < 0) {
      return Err(AppError::Validation("Stock cannot be negative.".to_string()));
    }

    let patch = ProductPatch {
      name: required_text("name", self.name)?,
      category: required_text("category", self.category)?,
      price: self.price,
      stock: self.stock,
      image: self.image.map(|image| image.and_then(MediaRef::new)),
      description: required_text("description", self.description)?,
      about: self.about,
      benefits: self.benefits,
      usage: self.usage,
      dosage: self.dosage,
      manufacturing_info: self.manufacturing_info,
      highlights: self.highlights,
    };
    if patch.is_empty() {
      return Err(AppError::Validation("No fields to update.".to_string()));
    }
    Ok(patch)
  }
}

fn views(products: Vec<Product>, public_base_url: &str) -> Vec<ProductView> {
  products.into_iter().map(|p| ProductView::new(p, public_base_url)).collect()
}

// --- Handler Implementations ---

#[instrument(name = "handler::list_products", skip(app_state))]
pub async fn list_products_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let products = app_state.stores.catalog.list_all().await?;
  info!("Successfully fetched {} products.", products.len());
  Ok(HttpResponse::Ok().json(views(products, &app_state.config.public_base_url)))
}

#[instrument(name = "handler::list_products_by_category", skip(app_state, path), fields(category = %path.as_str()))]
pub async fn list_products_by_category_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let category = path.into_inner();
  let products = app_state.stores.catalog.list_by_category(&category).await?;
  info!("Fetched {} products in category.", products.len());
  Ok(HttpResponse::Ok().json(views(products, &app_state.config.public_base_url)))
}

#[instrument(name = "handler::get_product", skip(app_state, path), fields(product_id = %path.as_ref()))]
pub async fn get_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let product = app_state.stores.catalog.get_by_id(path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(ProductView::new(product, &app_state.config.public_base_url)))
}

#[instrument(name = "handler::create_product", skip(app_state, admin, req_payload), fields(admin_id = %admin.0.user_id))]
pub async fn create_product_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  req_payload: web::Json<CreateProductPayload>,
) -> Result<HttpResponse, AppError> {
  let new_product = req_payload.into_inner().into_new_product()?;
  let product = app_state.stores.catalog.create(new_product).await?;
  info!(product_id = %product.id, "Product created.");
  Ok(HttpResponse::Created().json(ProductView::new(product, &app_state.config.public_base_url)))
}

#[instrument(
  name = "handler::update_product",
  skip(app_state, admin, path, req_payload),
  fields(admin_id = %admin.0.user_id, product_id = %path.as_ref())
)]
pub async fn update_product_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  path: web::Path<Uuid>,
  req_payload: web::Json<UpdateProductPayload>,
) -> Result<HttpResponse, AppError> {
  let patch = req_payload.into_inner().into_patch()?;
  let product = app_state.stores.catalog.update(path.into_inner(), patch).await?;
  info!("Product updated.");
  Ok(HttpResponse::Ok().json(ProductView::new(product, &app_state.config.public_base_url)))
}

#[instrument(
  name = "handler::adjust_product_stock",
  skip(app_state, admin, path, req_payload),
  fields(admin_id = %admin.0.user_id, product_id = %path.as_ref())
)]
pub async fn adjust_stock_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  path: web::Path<Uuid>,
  req_payload: web::Json<StockAdjustmentPayload>,
) -> Result<HttpResponse, AppError> {
  let delta = req_payload
    .stock
    .ok_or_else(|| AppError::Validation("stock is required.".to_string()))?;
  let product = app_state.stores.catalog.adjust_stock(path.into_inner(), delta).await?;
  info!(delta, stock = product.stock, "Stock adjusted.");
  Ok(HttpResponse::Ok().json(ProductView::new(product, &app_state.config.public_base_url)))
}

#[instrument(
  name = "handler::delete_product",
  skip(app_state, admin, path),
  fields(admin_id = %admin.0.user_id, product_id = %path.as_ref())
)]
pub async fn delete_product_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();
  app_state.stores.catalog.delete(product_id).await.map_err(|e| {
    warn!(error = %e, "Product delete failed.");
    e
  })?;
  Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "Product removed" })))
}
