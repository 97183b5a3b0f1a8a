use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Name given to a barcode submitted without one
pub const DEFAULT_BARCODE_NAME: &str = "Product Barcode";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Barcode {
    #[serde(default)]
    pub id: Uuid,
    #[serde(default)]
    pub user_id: Uuid,
    #[serde(default)]
    pub sku_id: Uuid,
    #[serde(rename = "barcode_name", default)]
    pub name: String,
    /// Encoded payload, e.g. an EAN-13 digit string
    #[serde(rename = "barcode_value", default)]
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

crate::stored_as_is!(Barcode, "barcodes");
