use async_trait::async_trait;

use crate::error::ProductResult;
use crate::models::{Cart, CartItem, CreateProduct, Product, ProductFilter, UpdateProduct};

/// Persistence for products.
///
/// Id lookups answer `None` for anything that is not a stored id,
/// including strings that could never be one.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Insert a product; the id is assigned here
    async fn create(&self, input: CreateProduct) -> ProductResult<Product>;

    async fn find_by_id(&self, id: &str) -> ProductResult<Option<Product>>;

    /// Apply a partial update atomically and return the updated document
    async fn find_by_id_and_update(
        &self,
        id: &str,
        input: UpdateProduct,
    ) -> ProductResult<Option<Product>>;

    /// Delete atomically and return the removed document
    async fn find_by_id_and_delete(&self, id: &str) -> ProductResult<Option<Product>>;

    /// All products matching every pattern in `filter`, in store order
    async fn find(&self, filter: ProductFilter) -> ProductResult<Vec<Product>>;

    /// At most `limit` products, highest average rating first
    async fn find_top_rated(&self, limit: i64) -> ProductResult<Vec<Product>>;
}

/// Persistence for carts.
///
/// Mutations only apply to carts that are not completed; a completed or
/// unknown cart yields `None`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// Insert an empty cart for `user_id`
    async fn create(&self, user_id: &str) -> ProductResult<Cart>;

    /// The user's non-completed cart, if any
    async fn find_active_by_user(&self, user_id: &str) -> ProductResult<Option<Cart>>;

    /// Append `item`, or merge it into the line for the same product, in one
    /// atomic step. A merged quantity outside `1..=MAX_LINE_QUANTITY` is a
    /// validation error.
    async fn add_item(&self, cart_id: &str, item: CartItem) -> ProductResult<Option<Cart>>;

    /// Drop the line for `product_id` atomically; `None` also when there is
    /// no such line.
    async fn remove_item(&self, cart_id: &str, product_id: &str) -> ProductResult<Option<Cart>>;

    async fn mark_completed(&self, cart_id: &str) -> ProductResult<Option<Cart>>;

    /// Every cart of the user, newest first
    async fn find_by_user(&self, user_id: &str) -> ProductResult<Vec<Cart>>;
}
