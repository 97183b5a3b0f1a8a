use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::store::CompositeKey;

/// Quantity of one SKU held at one warehouse, keyed by `(sku_id, location_id)`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Inventory {
    #[serde(default)]
    pub sku_id: Uuid,
    /// Warehouse id
    #[serde(default)]
    pub location_id: Uuid,
    #[serde(default)]
    pub user_id: Uuid,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

crate::stored_as_is!(Inventory, "inventory");

impl CompositeKey for Inventory {
    const KEY: [&'static str; 2] = ["sku_id", "location_id"];
}
