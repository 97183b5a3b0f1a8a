//! Record types persisted through the store, one collection each.

pub mod attribute;
pub mod barcode;
pub mod category;
pub mod company;
pub mod inventory;
pub mod product;
pub mod sku;
pub mod sku_attribute;
pub mod user;
pub mod warehouse;

pub use attribute::Attribute;
pub use barcode::{Barcode, DEFAULT_BARCODE_NAME};
pub use category::Category;
pub use company::Company;
pub use inventory::Inventory;
pub use product::Product;
pub use sku::Sku;
pub use sku_attribute::SkuAttribute;
pub use user::User;
pub use warehouse::{Address, Warehouse, WarehouseRow};
