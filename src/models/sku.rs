use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A sellable variant of a [`Product`](super::Product)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Sku {
    #[serde(default)]
    pub id: Uuid,
    #[serde(default)]
    pub user_id: Uuid,
    #[serde(default)]
    pub product_id: Uuid,
    /// Stock keeping code, e.g. `TSHIRT-RED-M`
    #[serde(rename = "sku", default)]
    pub code: String,
    #[serde(default, with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 24.5)]
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

crate::stored_as_is!(Sku, "skus");
