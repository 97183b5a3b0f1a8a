mod common;

use axum::http::Method;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

use common::{response_json, TestApp};
use inventory_manager_api::config::AppConfig;

fn timestamp(value: &Value) -> DateTime<Utc> {
    value
        .as_str()
        .expect("timestamp string")
        .parse()
        .expect("rfc3339 timestamp")
}

#[tokio::test]
async fn create_product_assigns_id_owner_and_timestamps() {
    let app = TestApp::new();
    let injected_owner = Uuid::new_v4();
    let injected_id = Uuid::new_v4();

    let product = app
        .create(
            "/api/v1/products",
            json!({
                "id": injected_id,
                "user_id": injected_owner,
                "name": "Desk Lamp",
                "description": "Adjustable arm",
                "price": 39.5
            }),
        )
        .await;

    let id: Uuid = product["id"].as_str().unwrap().parse().unwrap();
    assert_ne!(id, injected_id);
    assert!(!id.is_nil());
    assert_eq!(product["user_id"], json!(app.user_id));
    assert_eq!(product["name"], "Desk Lamp");
    assert_eq!(product["price"], json!(39.5));
    assert_eq!(
        timestamp(&product["created_at"]),
        timestamp(&product["updated_at"])
    );
    assert_eq!(app.store.rows("products").len(), 1);
}

#[tokio::test]
async fn create_product_rejects_missing_fields_without_writing() {
    let app = TestApp::new();

    let cases = [
        (json!({ "price": 10.0 }), "Product name is required"),
        (json!({ "name": "   ", "price": 10.0 }), "Product name is required"),
        (json!({ "name": "Mug" }), "Price must be greater than 0"),
        (json!({ "name": "Mug", "price": -1.0 }), "Price must be greater than 0"),
    ];

    for (body, message) in cases {
        let response = app
            .request_authenticated(Method::POST, "/api/v1/products", Some(body))
            .await;
        assert_eq!(response.status(), 400);
        assert_eq!(response_json(response).await["error"], message);
    }
    assert!(app.store.rows("products").is_empty());
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let app = TestApp::new();

    let response = app
        .send(
            Method::POST,
            "/api/v1/products",
            Some("{\"name\": ".to_string()),
            Some(common::TOKEN),
        )
        .await;

    assert_eq!(response.status(), 400);
    assert_eq!(response_json(response).await["error"], "Cannot parse JSON");
}

#[tokio::test]
async fn get_product_by_id() {
    let app = TestApp::new();
    let created = app
        .create("/api/v1/products", json!({ "name": "Kettle", "price": 25 }))
        .await;
    let id = created["id"].as_str().unwrap();

    let response = app
        .request_authenticated(Method::GET, &format!("/api/v1/products/{id}"), None)
        .await;
    assert_eq!(response.status(), 200);
    assert_eq!(response_json(response).await, created);
}

#[tokio::test]
async fn get_product_errors() {
    let app = TestApp::new();

    let response = app
        .request_authenticated(Method::GET, "/api/v1/products/not-a-uuid", None)
        .await;
    assert_eq!(response.status(), 400);
    assert_eq!(response_json(response).await["error"], "Invalid product ID");

    let response = app
        .request_authenticated(Method::GET, "/api/v1/products/%FF", None)
        .await;
    assert_eq!(response.status(), 400);
    assert_eq!(response_json(response).await["error"], "Invalid ID");

    let missing = Uuid::new_v4();
    let response = app
        .request_authenticated(Method::GET, &format!("/api/v1/products/{missing}"), None)
        .await;
    assert_eq!(response.status(), 404);
    assert_eq!(response_json(response).await["error"], "Product not found");
}

#[tokio::test]
async fn update_product_keeps_created_and_uses_path_id() {
    let app = TestApp::new();
    let created = app
        .create("/api/v1/products", json!({ "name": "Chair", "price": 80 }))
        .await;
    let id = created["id"].as_str().unwrap().to_string();

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;

    let response = app
        .request_authenticated(
            Method::PUT,
            &format!("/api/v1/products/{id}"),
            Some(json!({
                "id": Uuid::new_v4(),
                "name": "Armchair",
                "price": 120,
                "created_at": "2000-01-01T00:00:00Z"
            })),
        )
        .await;
    assert_eq!(response.status(), 200);
    let updated = response_json(response).await;

    assert_eq!(updated["id"], json!(id));
    assert_eq!(updated["name"], "Armchair");
    assert_eq!(updated["created_at"], created["created_at"]);
    assert!(timestamp(&updated["updated_at"]) > timestamp(&created["created_at"]));

    let rows = app.store.rows("products");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["name"], "Armchair");
}

#[tokio::test]
async fn update_product_validates_body() {
    let app = TestApp::new();
    let created = app
        .create("/api/v1/products", json!({ "name": "Chair", "price": 80 }))
        .await;
    let id = created["id"].as_str().unwrap();

    let response = app
        .request_authenticated(
            Method::PUT,
            &format!("/api/v1/products/{id}"),
            Some(json!({ "name": "", "price": 80 })),
        )
        .await;
    assert_eq!(response.status(), 400);
    assert_eq!(app.store.rows("products")[0]["name"], "Chair");
}

#[tokio::test]
async fn delete_product_is_idempotent() {
    let app = TestApp::new();
    let created = app
        .create("/api/v1/products", json!({ "name": "Vase", "price": 12 }))
        .await;
    let id = created["id"].as_str().unwrap();

    for _ in 0..2 {
        let response = app
            .request_authenticated(Method::DELETE, &format!("/api/v1/products/{id}"), None)
            .await;
        assert_eq!(response.status(), 200);
        assert_eq!(
            response_json(response).await["message"],
            "Product deleted successfully"
        );
    }
    assert!(app.store.rows("products").is_empty());
}

#[tokio::test]
async fn list_products_is_paginated() {
    let app = TestApp::new();
    for n in 0..12 {
        app.create(
            "/api/v1/products",
            json!({ "name": format!("Item {n}"), "price": 1 }),
        )
        .await;
    }

    let page = |uri: &'static str| {
        let app = &app;
        async move {
            let response = app.request_authenticated(Method::GET, uri, None).await;
            assert_eq!(response.status(), 200);
            response_json(response).await.as_array().unwrap().len()
        }
    };

    assert_eq!(page("/api/v1/products").await, 10);
    assert_eq!(page("/api/v1/products?page=1").await, 10);
    assert_eq!(page("/api/v1/products?page=2").await, 2);
    assert_eq!(page("/api/v1/products?page=3").await, 0);
    assert_eq!(page("/api/v1/products?page=abc").await, 10);
    assert_eq!(page("/api/v1/products?page=0").await, 10);

    let response = app
        .request_authenticated(Method::GET, "/api/v1/products?page=1&page=2", None)
        .await;
    assert_eq!(response.status(), 400);
    assert_eq!(
        response_json(response).await["error"],
        "Cannot parse query string"
    );
}

#[tokio::test]
async fn product_page_size_is_configurable() {
    let app = TestApp::with_config(AppConfig {
        product_page_size: 3,
        ..AppConfig::in_memory()
    });
    for n in 0..4 {
        app.create(
            "/api/v1/products",
            json!({ "name": format!("Item {n}"), "price": 1 }),
        )
        .await;
    }

    let response = app
        .request_authenticated(Method::GET, "/api/v1/products?page=2", None)
        .await;
    assert_eq!(response_json(response).await.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn products_are_scoped_to_their_owner() {
    let app = TestApp::new();
    let created = app
        .create("/api/v1/products", json!({ "name": "Private", "price": 5 }))
        .await;
    let id = created["id"].as_str().unwrap();

    let response = app
        .request_as_other(Method::GET, &format!("/api/v1/products/{id}"), None)
        .await;
    assert_eq!(response.status(), 404);

    // Another caller's delete matches nothing and still reports success
    let response = app
        .request_as_other(Method::DELETE, &format!("/api/v1/products/{id}"), None)
        .await;
    assert_eq!(response.status(), 200);
    assert_eq!(app.store.rows("products").len(), 1);

    let response = app
        .request_as_other(Method::GET, "/api/v1/products", None)
        .await;
    assert_eq!(response_json(response).await, json!([]));
}

#[tokio::test]
async fn requests_without_a_valid_credential_are_unauthorized() {
    let app = TestApp::new();

    let response = app
        .request(Method::GET, "/api/v1/products", None, None)
        .await;
    assert_eq!(response.status(), 401);
    assert_eq!(response_json(response).await["error"], "Unauthorized");

    // The gate answers, so the handler never asks the store who the caller is.
    for blank in ["Bearer   ", "bearer", ""] {
        let response = app
            .request_with_headers(Method::GET, "/api/v1/users/me", &[("authorization", blank)])
            .await;
        assert_eq!(response.status(), 401);
        assert_eq!(response_json(response).await["error"], "Unauthorized");
    }

    let response = app
        .request(Method::GET, "/api/v1/products", None, Some("forged"))
        .await;
    assert_eq!(response.status(), 401);

    let response = app
        .request(
            Method::POST,
            "/api/v1/products",
            Some(json!({ "name": "Lamp", "price": 3 })),
            Some("forged"),
        )
        .await;
    assert_eq!(response.status(), 401);
    assert_eq!(
        response_json(response).await["error"],
        "Cannot fetch user ID - please log in"
    );
    assert!(app.store.rows("products").is_empty());
}

#[tokio::test]
async fn product_skus_are_listed_from_either_side() {
    let app = TestApp::new();
    let product = app
        .create("/api/v1/products", json!({ "name": "Shirt", "price": 20 }))
        .await;
    let product_id = product["id"].as_str().unwrap();
    for code in ["SHIRT-S", "SHIRT-M"] {
        app.create(
            "/api/v1/skus",
            json!({ "sku": code, "price": 20, "product_id": product_id }),
        )
        .await;
    }
    app.create(
        "/api/v1/skus",
        json!({ "sku": "OTHER", "price": 5, "product_id": Uuid::new_v4() }),
    )
    .await;

    for uri in [
        format!("/api/v1/products/{product_id}/skus"),
        format!("/api/v1/skus/{product_id}/products"),
    ] {
        let response = app.request_authenticated(Method::GET, &uri, None).await;
        assert_eq!(response.status(), 200);
        let skus = response_json(response).await;
        let mut codes: Vec<&str> = skus
            .as_array()
            .unwrap()
            .iter()
            .map(|sku| sku["sku"].as_str().unwrap())
            .collect();
        codes.sort_unstable();
        assert_eq!(codes, ["SHIRT-M", "SHIRT-S"]);
    }
}
