use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;

/// Messages surfaced verbatim in `{ "error": ... }` bodies.
pub mod messages {
    pub const GET_FAILED: &str = "Failed to get product.";
    pub const UPDATE_FAILED: &str = "Failed to update product.";
    pub const DELETE_FAILED: &str = "Failed to delete product.";
    pub const INVALID_LIMIT: &str = "Limit must be a positive integer.";
    pub const PRODUCT_NOT_FOUND: &str = "Product not found.";
    pub const ITEM_NOT_IN_CART: &str = "Item not found in cart.";
    pub const EMPTY_CART: &str = "Cannot checkout an empty cart.";
    pub const CHECKOUT_FAILED: &str = "Failed to checkout cart.";
    pub const CART_CLOSED: &str = "Cart is no longer active.";
    pub const QUANTITY_LIMIT: &str = "Quantity per cart line must be between 1 and 10000.";
}

/// Failure kinds of the catalog and cart services.
///
/// `Display` is the bare message; the HTTP status comes from the variant.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProductError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Store(String),
}

impl ProductError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn store(message: impl Into<String>) -> Self {
        Self::Store(message.into())
    }
}

pub type ProductResult<T> = Result<T, ProductError>;

impl From<ProductError> for AppError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::NotFound(msg) => AppError::NotFound(msg),
            ProductError::Validation(msg) => AppError::BadRequest(msg),
            ProductError::Store(msg) => AppError::Store(msg),
        }
    }
}

impl IntoResponse for ProductError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}

impl From<mongodb::error::Error> for ProductError {
    fn from(err: mongodb::error::Error) -> Self {
        ProductError::Store(err.to_string())
    }
}

impl From<mongodb::bson::ser::Error> for ProductError {
    fn from(err: mongodb::bson::ser::Error) -> Self {
        ProductError::Store(err.to_string())
    }
}
