// harvest_store/src/lib.rs

//! Harvest storefront: catalog, orders, contact messages and accounts over a
//! JSON API. Order placement and the account flows run as `harvest_flow`
//! pipelines.

pub mod config;
pub mod errors;
pub mod models;
pub mod pipelines;
pub mod seed;
pub mod services;
pub mod state;
pub mod store;
pub mod web;
