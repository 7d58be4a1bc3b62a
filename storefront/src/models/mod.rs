// harvest_store/src/models/mod.rs

//! Records held by the stores and the JSON shapes built from them.

pub mod contact;
pub mod media;
pub mod money;
pub mod order;
pub mod product;
pub mod serde_util;
pub mod user;

pub use contact::{ContactMessage, ContactStatus, NewContactMessage};
pub use media::MediaRef;
pub use money::Money;
pub use order::{AdminOrderView, CustomerSummary, LineItem, NewOrder, Order, OrderStatus};
pub use product::{NewProduct, Product, ProductPatch, ProductView};
pub use user::{NewUser, Role, User, UserSummary};
