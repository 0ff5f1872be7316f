//! Cart API routes

use axum::Router;
use domain_products::{CartService, MongoCartRepository, MongoProductRepository, cart_handlers};
use std::sync::Arc;

use crate::state::AppState;

pub fn router(state: &AppState, products: Arc<MongoProductRepository>) -> Router {
    let carts = MongoCartRepository::new(&state.db);
    cart_handlers::router(CartService::new(carts, products))
}

/// Creates the one-open-cart-per-user index
pub async fn init_indexes(state: &AppState) -> eyre::Result<()> {
    MongoCartRepository::new(&state.db).init_indexes().await?;
    Ok(())
}
