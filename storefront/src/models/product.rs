// harvest_store/src/models/product.rs

use super::media::MediaRef;
use super::money::Money;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
  #[serde(rename = "_id")]
  pub id: Uuid,
  pub name: String,
  /// Free text, matched exactly. Observed values are "vegetables" and "powders".
  pub category: String,
  #[sqlx(rename = "price_cents")]
  pub price: Money,
  pub stock: i64,
  pub image: Option<MediaRef>,
  pub description: String,
  pub about: Option<String>,
  pub benefits: Option<String>,
  pub usage: Option<String>,
  pub dosage: Option<String>,
  pub manufacturing_info: Option<String>,
  pub highlights: Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Validated input for `CatalogStore::create`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
  pub name: String,
  pub category: String,
  pub price: Money,
  pub stock: i64,
  pub image: Option<MediaRef>,
  pub description: String,
  pub about: Option<String>,
  pub benefits: Option<String>,
  pub usage: Option<String>,
  pub dosage: Option<String>,
  pub manufacturing_info: Option<String>,
  pub highlights: Option<String>,
}

impl NewProduct {
  /// Minimal product with every optional field empty.
  pub fn basic(name: &str, category: &str, price: Money, stock: i64, description: &str) -> Self {
    Self {
      name: name.to_string(),
      category: category.to_string(),
      price,
      stock,
      image: None,
      description: description.to_string(),
      about: None,
      benefits: None,
      usage: None,
      dosage: None,
      manufacturing_info: None,
      highlights: None,
    }
  }

  pub fn into_product(self, id: Uuid, now: DateTime<Utc>) -> Product {
    Product {
      id,
      name: self.name,
      category: self.category,
      price: self.price,
      stock: self.stock,
      image: self.image,
      description: self.description,
      about: self.about,
      benefits: self.benefits,
      usage: self.usage,
      dosage: self.dosage,
      manufacturing_info: self.manufacturing_info,
      highlights: self.highlights,
      created_at: now,
      updated_at: now,
    }
  }
}

/// Partial update. `None` leaves a field untouched; for nullable fields
/// `Some(None)` clears the value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductPatch {
  pub name: Option<String>,
  pub category: Option<String>,
  pub price: Option<Money>,
  pub stock: Option<i64>,
  pub image: Option<Option<MediaRef>>,
  pub description: Option<String>,
  pub about: Option<Option<String>>,
  pub benefits: Option<Option<String>>,
  pub usage: Option<Option<String>>,
  pub dosage: Option<Option<String>>,
  pub manufacturing_info: Option<Option<String>>,
  pub highlights: Option<Option<String>>,
}

impl ProductPatch {
  pub fn is_empty(&self) -> bool {
    *self == ProductPatch::default()
  }

  /// Overwrites exactly the provided fields. Zero and empty values count as provided.
  pub fn apply_to(self, product: &mut Product, now: DateTime<Utc>) {
    if let Some(name) = self.name {
      product.name = name;
    }
    if let Some(category) = self.category {
      product.category = category;
    }
    if let Some(price) = self.price {
      product.price = price;
    }
    if let Some(stock) = self.stock {
      product.stock = stock;
    }
    if let Some(image) = self.image {
      product.image = image;
    }
    if let Some(description) = self.description {
      product.description = description;
    }
    let optional_fields = [
      (self.about, &mut product.about),
      (self.benefits, &mut product.benefits),
      (self.usage, &mut product.usage),
      (self.dosage, &mut product.dosage),
      (self.manufacturing_info, &mut product.manufacturing_info),
      (self.highlights, &mut product.highlights),
    ];
    for (patch_value, field) in optional_fields {
      if let Some(value) = patch_value {
        *field = value;
      }
    }
    product.updated_at = now;
  }
}

/// Product as returned by the API: the stored record plus the resolved image URL.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
  #[serde(flatten)]
  pub product: Product,
  pub image_url: Option<String>,
}

impl ProductView {
  pub fn new(product: Product, public_base_url: &str) -> Self {
    let image_url = product.image.as_ref().map(|m| m.resolve(public_base_url));
    Self { product, image_url }
  }
}
