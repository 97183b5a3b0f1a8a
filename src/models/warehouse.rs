//! Warehouses and the mapping between their nested API address and the six
//! flat address columns they are stored with.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::store::Record;

/// Postal address as it appears in request and response bodies
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Address {
    #[serde(default)]
    pub address_line_1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_line_2: Option<String>,
    #[serde(default)]
    pub town_city: String,
    #[serde(default)]
    pub state_county: String,
    #[serde(default)]
    pub post_zip_code: String,
    #[serde(default)]
    pub country: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Warehouse {
    #[serde(default)]
    pub id: Uuid,
    #[serde(default)]
    pub user_id: Uuid,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: Address,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Storage form of a [`Warehouse`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WarehouseRow {
    #[serde(default)]
    pub id: Uuid,
    #[serde(default)]
    pub user_id: Uuid,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address_line_1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_line_2: Option<String>,
    #[serde(default)]
    pub town_city: String,
    #[serde(default)]
    pub state_county: String,
    #[serde(default)]
    pub post_zip_code: String,
    #[serde(default)]
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<Warehouse> for WarehouseRow {
    fn from(warehouse: Warehouse) -> Self {
        let Address {
            address_line_1,
            address_line_2,
            town_city,
            state_county,
            post_zip_code,
            country,
        } = warehouse.address;

        Self {
            id: warehouse.id,
            user_id: warehouse.user_id,
            name: warehouse.name,
            address_line_1,
            address_line_2,
            town_city,
            state_county,
            post_zip_code,
            country,
            latitude: warehouse.latitude,
            longitude: warehouse.longitude,
            created_at: warehouse.created_at,
            updated_at: warehouse.updated_at,
        }
    }
}

impl From<WarehouseRow> for Warehouse {
    fn from(row: WarehouseRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            address: Address {
                address_line_1: row.address_line_1,
                address_line_2: row.address_line_2,
                town_city: row.town_city,
                state_county: row.state_county,
                post_zip_code: row.post_zip_code,
                country: row.country,
            },
            latitude: row.latitude,
            longitude: row.longitude,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl Record for Warehouse {
    const TABLE: &'static str = "warehouses";

    type Row = WarehouseRow;

    fn into_row(self) -> WarehouseRow {
        self.into()
    }

    fn from_row(row: WarehouseRow) -> Self {
        row.into()
    }
}
