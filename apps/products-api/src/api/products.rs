//! Products API routes

use axum::Router;
use domain_products::{MongoProductRepository, ProductService, handlers};
use std::sync::Arc;

use crate::state::AppState;

/// Create products router
pub fn router(repository: Arc<MongoProductRepository>) -> Router {
    handlers::router(ProductService::from_shared(repository))
}

/// Initialize products indexes
pub async fn init_indexes(state: &AppState) -> eyre::Result<()> {
    let repository = MongoProductRepository::new(&state.db);
    repository.init_indexes().await?;
    Ok(())
}
