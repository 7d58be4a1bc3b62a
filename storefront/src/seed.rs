// harvest_store/src/seed.rs

//! Startup data: the initial catalog and the bootstrap administrator.

use crate::config::AdminBootstrap;
use crate::errors::{AppError, Result};
use crate::models::user::{normalize_email, NewUser};
use crate::models::{MediaRef, Money, NewProduct};
use crate::services::auth_service;
use crate::store::{CatalogStore, UserStore};
use tracing::{info, instrument};

struct SeedProduct {
  name: &'static str,
  category: &'static str,
  price_cents: i64,
  stock: i64,
  description: &'static str,
  image_url: &'static str,
}

const fn seed(
  name: &'static str,
  category: &'static str,
  price_cents: i64,
  stock: i64,
  description: &'static str,
  image_url: &'static str,
) -> SeedProduct {
  SeedProduct {
    name,
    category,
    price_cents,
    stock,
    description,
    image_url,
  }
}

const CATALOG: &[SeedProduct] = &[
  seed(
    "Fresh Spinach",
    "vegetables", 250, 50, "Organic, farm-fresh spinach leaves rich in iron.",
    "https://images.unsplash.com/photo-1576045057995-568f588f82fb?auto=format&fit=crop&w=300&q=80",
  ),
  seed(
    "Red Tomatoes",
    "vegetables", 120, 100, "Juicy, ripe red tomatoes perfect for salads and cooking.",
    "https://images.unsplash.com/photo-1592924357228-91a4daadcfea?auto=format&fit=crop&w=300&q=80",
  ),
  seed(
    "Crisp Carrots",
    "vegetables", 180, 80, "Crunchy orange carrots, sweet and perfect for snacking.",
    "https://images.unsplash.com/photo-1598170845058-32b9d6a5da37?auto=format&fit=crop&w=300&q=80",
  ),
  seed(
    "Green Broccoli",
    "vegetables", 300, 40, "Fresh green broccoli heads, full of vitamins.",
    "https://images.unsplash.com/photo-1459411621453-7b03977f4bfc?auto=format&fit=crop&w=300&q=80",
  ),
  seed(
    "Bell Peppers (Mix)",
    "vegetables", 220, 60, "A colorful mix of red, yellow, and green bell peppers.",
    "https://freshby4roots.com/cdn/shop/files/Locally-grown-mixed-bell-peppers-4roots.webp?v=1724081569",
  ),
  seed(
    "Organic Potatoes",
    "vegetables", 100, 150, "Earthy, versatile potatoes grown without pesticides.",
    "https://images.unsplash.com/photo-1518977676601-b53f82aba655?auto=format&fit=crop&w=300&q=80",
  ),
  seed(
    "Red Onions",
    "vegetables", 150, 120, "Sharp and flavorful red onions, essential for every kitchen.",
    "https://images.unsplash.com/photo-1618512496248-a07fe83aa8cb?auto=format&fit=crop&w=300&q=80",
  ),
  seed(
    "Cucumber",
    "vegetables", 110, 70, "Cool and refreshing cucumbers, great for salads.",
    "https://images.unsplash.com/photo-1449300079323-02e209d9d3a6?auto=format&fit=crop&w=300&q=80",
  ),
  seed(
    "Eggplant (Brinjal)",
    "vegetables", 200, 45, "Glossy purple eggplants, perfect for roasting or curries.",
    "https://images.pexels.com/photos/321551/pexels-photo-321551.jpeg?auto=compress&cs=tinysrgb&w=400",
  ),
  seed(
    "Cauliflower",
    "vegetables", 280, 35, "Fresh white cauliflower heads.",
    "https://images.unsplash.com/photo-1568584711075-3d021a7c3ca3?auto=format&fit=crop&w=300&q=80",
  ),
  seed(
    "Turmeric Powder",
    "powders", 450, 100, "Pure organic turmeric with high curcumin content.",
    "https://images.pexels.com/photos/1340116/pexels-photo-1340116.jpeg?auto=compress&cs=tinysrgb&w=400",
  ),
  seed(
    "Chilli Powder",
    "powders", 500, 90, "Spicy red chilli powder made from dried chillies.",
    "https://encrypted-tbn0.gstatic.com/images?q=tbn:ANd9GcQdwJLNEjaZ7ub46CLiAcbVUwkfos6qmRgW2Q&s",
  ),
  seed(
    "Coriander Powder",
    "powders", 350, 85, "Aromatic coriander powder, essential for curry bases.",
    "https://encrypted-tbn0.gstatic.com/images?q=tbn:ANd9GcRVY9V7p4IV12IHFr_RdaEKjT_SKElqctKBWg&s",
  ),
  seed(
    "Cumin Powder",
    "powders", 400, 80, "Ground cumin seeds with a warm, earthy flavor.",
    "https://i.ebayimg.com/images/g/aTgAAOSwvtxdO5bs/s-l1200.jpg",
  ),
  seed(
    "Garam Masala",
    "powders", 600, 60, "A premium blend of aromatic spices for authentic taste.",
    "https://twosleevers.com/wp-content/uploads/2013/08/Garam-Masala-1-500x500.jpg",
  ),
  seed(
    "Black Pepper Powder",
    "powders", 750, 50, "Sharp and spicy crushed black pepper.",
    "https://i.ebayimg.com/images/g/BgcAAOSw8XpjkLMf/s-l1200.jpg",
  ),
  seed(
    "Ginger Powder",
    "powders", 480, 55, "Dried ginger powder, great for tea and cooking.",
    "https://i.ebayimg.com/images/g/NboAAOSwDRhhDphh/s-l1200.jpg",
  ),
  seed(
    "Cinnamon Powder",
    "powders", 800, 40, "Sweet and woody cinnamon powder for baking and cooking.",
    "https://bi.imgix.net/2024/08/Ground-Cinnamon.jpg?fm=pjpg&s=b8a64c901afb0873b3748799ca74d241",
  ),
];

/// Inserts the starter catalog when the catalog is empty. Returns how many
/// products were added.
#[instrument(name = "seed::catalog", skip(catalog))]
pub async fn seed_catalog_if_empty(catalog: &dyn CatalogStore) -> Result<usize> {
  let existing = catalog.count().await?;
  if existing > 0 {
    info!(existing, "Catalog already populated, skipping seed.");
    return Ok(0);
  }

  for entry in CATALOG {
    let price = Money::from_cents(entry.price_cents)
      .ok_or_else(|| AppError::Internal(format!("Invalid seed price for {}", entry.name)))?;
    let mut product = NewProduct::basic(entry.name, entry.category, price, entry.stock, entry.description);
    product.image = MediaRef::new(entry.image_url);
    catalog.create(product).await?;
  }
  info!(count = CATALOG.len(), "Catalog seeded.");
  Ok(CATALOG.len())
}

/// Creates the configured administrator unless a user with that email exists.
/// Returns `true` when a user was created.
#[instrument(name = "seed::admin", skip(users, admin), fields(admin_email = %admin.email))]
pub async fn ensure_admin(users: &dyn UserStore, admin: &AdminBootstrap) -> Result<bool> {
  let email = normalize_email(&admin.email);
  if users.find_by_email(&email).await?.is_some() {
    info!("Admin user already exists.");
    return Ok(false);
  }

  let password_hash = auth_service::hash_password(&admin.password)?;
  let user = users
    .create(NewUser {
      name: admin.name.clone(),
      email,
      password_hash,
      is_admin: true,
    })
    .await?;
  info!(user_id = %user.id, "Admin user created.");
  Ok(true)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn catalog_covers_both_categories() {
    assert_eq!(CATALOG.iter().filter(|p| p.category == "vegetables").count(), 10);
    assert_eq!(CATALOG.iter().filter(|p| p.category == "powders").count(), 8);
    assert!(CATALOG.iter().all(|p| p.price_cents > 0 && p.stock > 0));
  }

  #[test]
  fn catalog_images_are_external_urls() {
    for entry in CATALOG {
      let media = MediaRef::new(entry.image_url).unwrap();
      assert!(media.is_external_url(), "{} has no external image", entry.name);
      assert_eq!(media.resolve("http://localhost:5000"), entry.image_url);
    }
  }
}
