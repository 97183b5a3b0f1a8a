use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Inventory Manager API",
        version = "1.0.0",
        description = r#"
# Inventory Manager API

CRUD backend for products, SKUs, attributes, barcodes, categories, warehouses,
per-location inventory, users and companies.

## Authentication

Every `/api/v1` endpoint requires the access token issued by the hosted
backend's auth service. Requests run against the store as that caller, so the
store's row policies decide what each caller can see:

```
Authorization: Bearer <access-token>
```

## Errors

Failures answer with a single-field body and the matching status code:

```json
{ "error": "Product name is required" }
```

## Pagination

`GET /api/v1/products` accepts `page` (1-based, default 1). Other listings
return every row.
        "#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers((url = "http://localhost:3000", description = "Local development")),
    tags(
        (name = "products", description = "Product endpoints"),
        (name = "skus", description = "SKU endpoints"),
        (name = "attributes", description = "Attribute endpoints"),
        (name = "sku-attributes", description = "Attribute values per SKU"),
        (name = "barcodes", description = "Barcode endpoints"),
        (name = "categories", description = "Category tree endpoints"),
        (name = "warehouses", description = "Warehouse endpoints"),
        (name = "inventory", description = "Stock per warehouse and SKU"),
        (name = "users", description = "User profile endpoints"),
        (name = "companies", description = "Company endpoints"),
        (name = "health", description = "Liveness")
    ),
    paths(
        // Products
        handlers::products::create_product,
        handlers::products::list_products,
        handlers::products::get_product,
        handlers::products::update_product,
        handlers::products::delete_product,
        handlers::products::list_product_skus,

        // SKUs
        handlers::skus::create_sku,
        handlers::skus::list_skus,
        handlers::skus::get_sku,
        handlers::skus::update_sku,
        handlers::skus::delete_sku,
        handlers::skus::list_sku_barcodes,
        handlers::skus::list_sku_inventory,

        // Attributes
        handlers::attributes::create_attribute,
        handlers::attributes::list_attributes,
        handlers::attributes::get_attribute,
        handlers::attributes::update_attribute,
        handlers::attributes::delete_attribute,
        handlers::sku_attributes::upsert_sku_attribute,
        handlers::sku_attributes::list_sku_attributes,
        handlers::sku_attributes::get_sku_attribute,
        handlers::sku_attributes::delete_sku_attribute,

        // Barcodes
        handlers::barcodes::create_barcode,
        handlers::barcodes::list_barcodes,
        handlers::barcodes::get_barcode,
        handlers::barcodes::update_barcode,
        handlers::barcodes::delete_barcode,

        // Categories
        handlers::categories::create_category,
        handlers::categories::list_categories,
        handlers::categories::get_category,
        handlers::categories::list_child_categories,
        handlers::categories::update_category,
        handlers::categories::delete_category,

        // Warehouses
        handlers::warehouses::create_warehouse,
        handlers::warehouses::list_warehouses,
        handlers::warehouses::get_warehouse,
        handlers::warehouses::update_warehouse,
        handlers::warehouses::delete_warehouse,

        // Inventory
        handlers::inventory::list_inventory,
        handlers::inventory::list_location_inventory,
        handlers::inventory::get_inventory,
        handlers::inventory::upsert_inventory,
        handlers::inventory::delete_location_inventory,
        handlers::inventory::delete_inventory,

        // Users and companies
        handlers::users::create_user,
        handlers::users::get_current_user,
        handlers::users::get_user,
        handlers::users::update_current_user,
        handlers::users::delete_current_user,
        handlers::users::list_company_users,
        handlers::companies::create_company,
        handlers::companies::list_companies,
        handlers::companies::get_company,
        handlers::companies::update_company,
        handlers::companies::delete_company,

        crate::health::health_check,
    ),
    components(
        schemas(
            crate::models::Product,
            crate::models::Sku,
            crate::models::Attribute,
            crate::models::SkuAttribute,
            crate::models::Barcode,
            crate::models::Category,
            crate::models::Address,
            crate::models::Warehouse,
            crate::models::Inventory,
            crate::models::User,
            crate::models::Company,
            crate::health::HealthInfo,
            crate::health::HealthStatus,
            handlers::common::MessageResponse,

            // Error types
            crate::errors::ErrorResponse
        )
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDocV1;

/// Registers the `bearer_auth` scheme referenced by every handler.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}
