use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::store::CompositeKey;

/// Value of one attribute on one SKU, keyed by `(sku_id, attribute_id)`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SkuAttribute {
    #[serde(default)]
    pub sku_id: Uuid,
    #[serde(default)]
    pub attribute_id: Uuid,
    #[serde(rename = "attr_value", default)]
    pub value: String,
    #[serde(default)]
    pub user_id: Uuid,
}

crate::stored_as_is!(SkuAttribute, "sku_attributes");

impl CompositeKey for SkuAttribute {
    const KEY: [&'static str; 2] = ["sku_id", "attribute_id"];
}
