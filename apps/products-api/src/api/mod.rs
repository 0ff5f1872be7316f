//! API routes module

pub mod carts;
pub mod health;
pub mod products;

use axum::Router;
use domain_products::MongoProductRepository;
use std::sync::Arc;

use crate::state::AppState;

/// Routes nested under `/api`. Carts share the product repository for
/// existence checks.
pub fn routes(state: &AppState) -> Router {
    let products = Arc::new(MongoProductRepository::new(&state.db));

    Router::new()
        .nest("/products", products::router(products.clone()))
        .nest("/carts", carts::router(state, products))
}

/// Initialize database indexes
pub async fn init_indexes(state: &AppState) -> eyre::Result<()> {
    products::init_indexes(state).await?;
    carts::init_indexes(state).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Environment};
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode, header};
    use core_config::{app_info, server::ServerConfig};
    use database::mongodb::MongoConfig;
    use http_body_util::BodyExt;
    use mongodb::Client;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    // The driver connects lazily, so nothing below reaches a server unless a
    // handler touches the store.
    async fn offline_state() -> AppState {
        let client = Client::with_uri_str("mongodb://127.0.0.1:1/?serverSelectionTimeoutMS=100")
            .await
            .unwrap();
        AppState {
            config: Config {
                app: app_info!(),
                mongodb: MongoConfig::default(),
                server: ServerConfig::default(),
                environment: Environment::Development,
            },
            db: client.database("catalog"),
            mongo_client: client,
        }
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    #[tokio::test]
    async fn test_top_rated_rejects_non_numeric_limit() {
        let state = offline_state().await;
        let request = Request::get("/products/top-rated/abc")
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(routes(&state), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Limit must be a positive integer." }));
    }

    #[tokio::test]
    async fn test_cart_item_quantity_is_bounded() {
        let state = offline_state().await;
        let request = Request::post("/carts/user-1/items")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({ "product": "p1", "quantity": 10_001, "price": 1.0 }).to_string(),
            ))
            .unwrap();

        let (status, body) = send(routes(&state), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["details"]["quantity"].is_array());
    }

    #[tokio::test]
    async fn test_static_segments_do_not_fall_through_to_id() {
        let state = offline_state().await;

        for (method, uri) in [(Method::GET, "/products/create"), (Method::PUT, "/products/search")] {
            let request = Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap();
            let (status, _) = send(routes(&state), request).await;
            assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_ready_reports_unreachable_mongodb() {
        let state = offline_state().await;
        let request = Request::get("/ready").body(Body::empty()).unwrap();

        let (status, body) = send(health::router(state.mongo_client), request).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body, json!({ "mongodb": "disconnected", "status": "not ready" }));
    }
}
