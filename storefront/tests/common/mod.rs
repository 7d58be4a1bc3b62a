// harvest_store/tests/common/mod.rs
#![allow(dead_code)]

use harvest_store::config::AppConfig;
use harvest_store::models::user::NewUser;
use harvest_store::models::{Money, NewProduct, Product, User};
use harvest_store::services::auth_service;
use harvest_store::state::AppState;
use harvest_store::store::Stores;
use once_cell::sync::Lazy;
use std::sync::Arc;
use tracing::Level;

pub const TEST_SECRET: &str = "harvest-test-secret-0123456789";
pub const PUBLIC_BASE_URL: &str = "http://shop.test";

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

pub fn test_config() -> AppConfig {
  AppConfig::from_lookup(|key| match key {
    "JWT_SECRET" => Some(TEST_SECRET.to_string()),
    "PUBLIC_BASE_URL" => Some(PUBLIC_BASE_URL.to_string()),
    _ => None,
  })
  .expect("test configuration should be valid")
}

/// Fresh in-memory state with every pipeline registered.
pub fn test_state() -> AppState {
  setup_tracing();
  AppState::new(Arc::new(test_config()), Stores::in_memory())
}

pub fn state_with_stores(stores: Stores) -> AppState {
  setup_tracing();
  AppState::new(Arc::new(test_config()), stores)
}

pub async fn add_product(state: &AppState, name: &str, price_cents: i64, stock: i64) -> Product {
  let price = Money::from_cents(price_cents).expect("valid price");
  state
    .stores
    .catalog
    .create(NewProduct::basic(name, "powders", price, stock, "Test product"))
    .await
    .expect("product should be created")
}

pub async fn add_user(state: &AppState, name: &str, email: &str, password: &str, is_admin: bool) -> User {
  let password_hash = auth_service::hash_password(password).expect("hash");
  state
    .stores
    .users
    .create(NewUser {
      name: name.to_string(),
      email: email.to_string(),
      password_hash,
      is_admin,
    })
    .await
    .expect("user should be created")
}

pub fn token_for(state: &AppState, user: &User) -> String {
  state.verifier.tokens().issue(user.id, user.role()).expect("token")
}
