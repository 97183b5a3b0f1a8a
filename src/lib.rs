//! Inventory Manager API Library
//!
//! HTTP backend for products, SKUs, warehouses and stock levels. Records live
//! in a hosted PostgREST store; every request talks to it as the caller.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod auth;
pub mod common;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod health;
pub mod metrics;
pub mod middleware_helpers;
pub mod models;
pub mod openapi;
pub mod store;
pub mod tracing;
pub mod validation;

use axum::{http::HeaderValue, middleware, routing::get, Router};
use std::{sync::Arc, time::Instant};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer};
use uuid::Uuid;

use crate::{
    config::AppConfig,
    store::{MemoryStore, PostgrestConnector, StoreConnector, StoreError},
};

/// Access token accepted by the in-memory store when running locally.
pub const DEV_ACCESS_TOKEN: &str = "local-dev-token";

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    /// Opens a caller-scoped store handle per request
    pub connector: Arc<dyn StoreConnector>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: AppConfig, connector: Arc<dyn StoreConnector>) -> Self {
        Self {
            config: Arc::new(config),
            connector,
            started_at: Instant::now(),
        }
    }
}

/// Builds the connector for the configured store backend.
pub fn build_connector(config: &AppConfig) -> Result<Arc<dyn StoreConnector>, StoreError> {
    if config.uses_memory_store() {
        let store = Arc::new(MemoryStore::new());
        let user_id = Uuid::new_v4();
        store.register_token(DEV_ACCESS_TOKEN, user_id);
        ::tracing::warn!(
            %user_id,
            token = DEV_ACCESS_TOKEN,
            "Using the in-memory store; data is lost on exit"
        );
        return Ok(Arc::new(store));
    }

    let url = config.store_url.as_deref().unwrap_or_default();
    let api_key = config.store_api_key.clone().unwrap_or_default();
    let connector = PostgrestConnector::new(url, api_key, config.store_timeout())?;
    ::tracing::info!(store_url = %url, "Using hosted PostgREST store");
    Ok(Arc::new(connector))
}

/// Entity routes, relative to `/api/v1`.
pub fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .merge(handlers::products::product_routes())
        .merge(handlers::skus::sku_routes())
        .merge(handlers::attributes::attribute_routes())
        .merge(handlers::sku_attributes::sku_attribute_routes())
        .merge(handlers::barcodes::barcode_routes())
        .merge(handlers::categories::category_routes())
        .merge(handlers::warehouses::warehouse_routes())
        .merge(handlers::inventory::inventory_routes())
        .merge(handlers::users::user_routes())
        .merge(handlers::companies::company_routes())
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins()
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    if !origins.is_empty() {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(tower_http::cors::Any)
            .allow_headers(tower_http::cors::Any)
    } else if config.should_allow_permissive_cors() {
        ::tracing::info!("Using permissive CORS because explicit origins were not configured");
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
    }
}

/// Full application router: health, metrics, docs and the bearer-gated API.
pub fn app_router(state: AppState) -> Router {
    let config = state.config.clone();

    Router::new()
        .merge(health::health_routes())
        .route("/metrics", get(metrics::metrics_handler))
        .nest(
            "/api/v1",
            api_v1_routes().route_layer(middleware::from_fn(auth::require_bearer)),
        )
        .merge(openapi::swagger_ui())
        // HTTP tracing layer for consistent request/response telemetry
        .layer(tracing::configure_http_tracing())
        .layer(RequestBodyLimitLayer::new(config.max_body_size))
        .layer(cors_layer(&config))
        .layer(middleware::from_fn(metrics::track_requests))
        // Ensure every request carries a request id for traceability
        .layer(middleware::from_fn(
            middleware_helpers::request_id::request_id_middleware,
        ))
        .with_state(state)
}
