//! Products Domain
//!
//! Product catalog and per-user carts backed by MongoDB.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────┐
//! │  handlers / cart_handlers    │  ← HTTP endpoints
//! └──────────────┬───────────────┘
//!                │
//! ┌──────────────▼───────────────┐
//! │  ProductService / CartService│  ← Business rules, error kinds
//! └──────────────┬───────────────┘
//!                │
//! ┌──────────────▼───────────────┐
//! │  Repository traits           │  ← MongoDB and in-memory implementations
//! └──────────────┬───────────────┘
//!                │
//! ┌──────────────▼───────────────┐
//! │  Models                      │  ← Documents, DTOs
//! └──────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use domain_products::{
//!     CartService, MongoCartRepository, MongoProductRepository, ProductService,
//!     cart_handlers, handlers,
//! };
//! use mongodb::Client;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::with_uri_str("mongodb://localhost:27017").await?;
//! let db = client.database("catalog");
//!
//! let products = Arc::new(MongoProductRepository::new(&db));
//! let carts = MongoCartRepository::new(&db);
//!
//! let router = axum::Router::new()
//!     .nest("/products", handlers::router(ProductService::from_shared(products.clone())))
//!     .nest("/carts", cart_handlers::router(CartService::new(carts, products)));
//! # Ok(())
//! # }
//! ```

pub mod cart_handlers;
pub mod cart_service;
pub mod error;
pub mod handlers;
pub mod memory;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;

pub use cart_handlers::CartApiDoc;
pub use cart_service::CartService;
pub use error::{ProductError, ProductResult};
pub use handlers::ApiDoc;
pub use memory::{InMemoryCartRepository, InMemoryProductRepository};
pub use models::{
    AddCartItem, Cart, CartItem, CreateProduct, Product, ProductFilter, SearchQuery,
    UpdateProduct,
};
pub use mongodb::{MongoCartRepository, MongoProductRepository};
pub use repository::{CartRepository, ProductRepository};
pub use service::{ProductCatalog, ProductService};
