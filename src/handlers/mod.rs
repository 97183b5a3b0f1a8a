//! HTTP handlers, one module per entity. Every router here is mounted under
//! `/api/v1` behind the bearer gate (see [`crate::api_v1_routes`]).

pub mod attributes;
pub mod barcodes;
pub mod categories;
pub mod common;
pub mod companies;
pub mod inventory;
pub mod products;
pub mod sku_attributes;
pub mod skus;
pub mod users;
pub mod warehouses;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;
