//! Handler tests for the Products domain
//!
//! These drive the real routers, services and in-memory repositories through
//! `oneshot`, covering request parsing, status codes and error bodies.

use std::sync::Arc;

use axum::body::Body;
use axum::Router;
use axum::http::{Request, StatusCode};
use domain_products::*;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt; // For oneshot()

// Helper to parse JSON response body
async fn json_body<T: serde::de::DeserializeOwned>(body: Body) -> T {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn products_app(repo: InMemoryProductRepository) -> Router {
    handlers::router(ProductService::new(repo))
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn seed(
    repo: &InMemoryProductRepository,
    name: &str,
    description: &str,
    ratings: Vec<f64>,
) -> Product {
    repo.create(CreateProduct {
        name: name.to_string(),
        description: description.to_string(),
        price: 10.0,
        category: None,
        image: None,
        ratings,
    })
    .await
    .unwrap()
}

#[tokio::test]
async fn test_create_then_get_product() {
    let repo = InMemoryProductRepository::new();

    let response = products_app(repo.clone())
        .oneshot(json_request(
            "POST",
            "/create",
            json!({ "name": "Desk Lamp", "price": 24.5, "category": "lighting" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let created: Product = json_body(response.into_body()).await;
    assert_eq!(created.name, "Desk Lamp");
    assert_eq!(created.description, "");
    assert_eq!(created.category.as_deref(), Some("lighting"));

    let response = products_app(repo)
        .oneshot(empty_request("GET", &format!("/{}", created.id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let fetched: Product = json_body(response.into_body()).await;
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_create_product_rejects_negative_price() {
    let response = products_app(InMemoryProductRepository::new())
        .oneshot(json_request(
            "POST",
            "/create",
            json!({ "name": "Lamp", "price": -1.0 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["error"], "Request validation failed");
    assert!(body["details"]["price"].is_array());
}

#[tokio::test]
async fn test_create_product_rejects_malformed_json() {
    let request = Request::builder()
        .method("POST")
        .uri("/create")
        .header("content-type", "application/json")
        .body(Body::from("{\"name\": "))
        .unwrap();

    let response = products_app(InMemoryProductRepository::new())
        .oneshot(request)
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_unknown_product_is_404() {
    let response = products_app(InMemoryProductRepository::new())
        .oneshot(empty_request("GET", "/invalidProductId"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body, json!({ "error": "Failed to get product." }));
}

#[tokio::test]
async fn test_update_merges_fields() {
    let repo = InMemoryProductRepository::new();
    let product = seed(&repo, "Lamp", "Warm light", vec![]).await;

    let response = products_app(repo)
        .oneshot(json_request(
            "PUT",
            &format!("/{}", product.id),
            json!({ "price": 12.0 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let updated: Product = json_body(response.into_body()).await;
    assert_eq!(updated.price, 12.0);
    assert_eq!(updated.name, "Lamp");
    assert_eq!(updated.description, "Warm light");
}

#[tokio::test]
async fn test_update_unknown_product_is_404() {
    let response = products_app(InMemoryProductRepository::new())
        .oneshot(json_request(
            "PUT",
            "/invalidProductId",
            json!({ "name": "Updated Product" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body, json!({ "error": "Failed to update product." }));
}

#[tokio::test]
async fn test_delete_returns_document_and_removes_it() {
    let repo = InMemoryProductRepository::new();
    let product = seed(&repo, "Lamp", "", vec![]).await;
    let uri = format!("/{}", product.id);

    let response = products_app(repo.clone())
        .oneshot(empty_request("DELETE", &uri))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let deleted: Product = json_body(response.into_body()).await;
    assert_eq!(deleted, product);

    let response = products_app(repo)
        .oneshot(empty_request("DELETE", &uri))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body, json!({ "error": "Failed to delete product." }));
}

#[tokio::test]
async fn test_all_returns_every_product_in_store_order() {
    let repo = InMemoryProductRepository::new();
    for name in ["A", "B", "C"] {
        seed(&repo, name, "", vec![]).await;
    }

    let response = products_app(repo)
        .oneshot(empty_request("GET", "/all"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let products: Vec<Product> = json_body(response.into_body()).await;
    let names: Vec<_> = products.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["A", "B", "C"]);
}

#[tokio::test]
async fn test_search_matches_both_fields_case_insensitively() {
    let repo = InMemoryProductRepository::new();
    seed(&repo, "Test Product", "This is a test product.", vec![]).await;
    seed(&repo, "Test Product", "Unrelated", vec![]).await;
    seed(&repo, "Other", "This is a test product.", vec![]).await;

    let response = products_app(repo.clone())
        .oneshot(empty_request(
            "GET",
            "/search?name=test%20product&description=TEST",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let found: Vec<Product> = json_body(response.into_body()).await;
    assert_eq!(found.len(), 1);

    // Missing params match everything
    let response = products_app(repo)
        .oneshot(empty_request("GET", "/search"))
        .await
        .unwrap();
    let found: Vec<Product> = json_body(response.into_body()).await;
    assert_eq!(found.len(), 3);
}

#[tokio::test]
async fn test_search_without_matches_is_empty_array() {
    let repo = InMemoryProductRepository::new();
    seed(&repo, "Lamp", "", vec![]).await;

    let response = products_app(repo)
        .oneshot(empty_request("GET", "/search?name=chair"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_top_rated_ranks_by_average_rating() {
    let repo = InMemoryProductRepository::new();
    seed(&repo, "unrated", "", vec![]).await;
    seed(&repo, "good", "", vec![4.0, 4.0]).await;
    seed(&repo, "best", "", vec![5.0]).await;

    let response = products_app(repo)
        .oneshot(empty_request("GET", "/top-rated/2"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let ranked: Vec<Product> = json_body(response.into_body()).await;
    let names: Vec<_> = ranked.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["best", "good"]);
}

#[tokio::test]
async fn test_top_rated_rejects_bad_limits() {
    for uri in ["/top-rated/0", "/top-rated/-2", "/top-rated/many"] {
        let response = products_app(InMemoryProductRepository::new())
            .oneshot(empty_request("GET", uri))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        let body: Value = json_body(response.into_body()).await;
        assert_eq!(body, json!({ "error": "Limit must be a positive integer." }));
    }
}

// ============================================================================
// Cart Handler Tests
// ============================================================================

fn carts_app(products: Arc<InMemoryProductRepository>, carts: InMemoryCartRepository) -> Router {
    cart_handlers::router(CartService::new(carts, products))
}

#[tokio::test]
async fn test_cart_lifecycle_through_http() {
    let products = Arc::new(InMemoryProductRepository::new());
    let lamp = seed(&products, "Lamp", "", vec![]).await;
    let carts = InMemoryCartRepository::new();
    let app = || carts_app(products.clone(), carts.clone());

    // First access opens an empty cart
    let response = app().oneshot(empty_request("GET", "/user-1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let opened: Cart = json_body(response.into_body()).await;
    assert!(opened.items.is_empty());
    assert!(!opened.completed);

    // Adding the same product twice merges the line
    for quantity in [1, 2] {
        let response = app()
            .oneshot(json_request(
                "POST",
                "/user-1/items",
                json!({ "product": lamp.id, "quantity": quantity, "price": 8.0 }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app()
        .oneshot(empty_request("POST", "/user-1/checkout"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let completed: Cart = json_body(response.into_body()).await;
    assert!(completed.completed);
    assert_eq!(completed.id, opened.id);
    assert_eq!(completed.items.len(), 1);
    assert_eq!(completed.items[0].quantity, 3);
    assert_eq!(completed.total(), 24.0);

    // The next access opens a fresh cart
    let response = app().oneshot(empty_request("GET", "/user-1")).await.unwrap();
    let fresh: Cart = json_body(response.into_body()).await;
    assert_ne!(fresh.id, opened.id);
    assert!(fresh.items.is_empty());

    let response = app()
        .oneshot(empty_request("GET", "/user-1/history"))
        .await
        .unwrap();
    let history: Vec<Cart> = json_body(response.into_body()).await;
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].id, fresh.id);
}

#[tokio::test]
async fn test_add_unknown_product_is_404() {
    let response = carts_app(Arc::default(), InMemoryCartRepository::new())
        .oneshot(json_request(
            "POST",
            "/user-1/items",
            json!({ "product": "missing" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body, json!({ "error": "Product not found." }));
}

#[tokio::test]
async fn test_remove_item_from_cart() {
    let products = Arc::new(InMemoryProductRepository::new());
    let lamp = seed(&products, "Lamp", "", vec![]).await;
    let carts = InMemoryCartRepository::new();

    carts_app(products.clone(), carts.clone())
        .oneshot(json_request(
            "POST",
            "/user-1/items",
            json!({ "product": lamp.id }),
        ))
        .await
        .unwrap();

    let uri = format!("/user-1/items/{}", lamp.id);
    let response = carts_app(products.clone(), carts.clone())
        .oneshot(empty_request("DELETE", &uri))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cart: Cart = json_body(response.into_body()).await;
    assert!(cart.items.is_empty());

    let response = carts_app(products, carts)
        .oneshot(empty_request("DELETE", &uri))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body, json!({ "error": "Item not found in cart." }));
}

#[tokio::test]
async fn test_checkout_rules() {
    let carts = InMemoryCartRepository::new();

    // No open cart yet
    let response = carts_app(Arc::default(), carts.clone())
        .oneshot(empty_request("POST", "/user-1/checkout"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body, json!({ "error": "Failed to checkout cart." }));

    // Open but empty
    carts_app(Arc::default(), carts.clone())
        .oneshot(empty_request("GET", "/user-1"))
        .await
        .unwrap();
    let response = carts_app(Arc::default(), carts)
        .oneshot(empty_request("POST", "/user-1/checkout"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body, json!({ "error": "Cannot checkout an empty cart." }));
}
