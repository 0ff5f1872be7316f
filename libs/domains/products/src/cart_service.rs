//! Cart lifecycle on top of the cart and product repositories

use std::sync::Arc;
use tracing::instrument;

use crate::error::{ProductError, ProductResult, messages};
use crate::models::{AddCartItem, Cart, CartItem};
use crate::repository::{CartRepository, ProductRepository};

/// Each user has at most one open cart; it is created on first access and
/// frozen by checkout, after which the next access opens a new one.
pub struct CartService<C: CartRepository, P: ProductRepository> {
    carts: Arc<C>,
    products: Arc<P>,
}

impl<C: CartRepository, P: ProductRepository> CartService<C, P> {
    pub fn new(carts: C, products: Arc<P>) -> Self {
        Self {
            carts: Arc::new(carts),
            products,
        }
    }

    /// The user's open cart, created empty if there is none.
    #[instrument(skip(self))]
    pub async fn get_cart(&self, user_id: &str) -> ProductResult<Cart> {
        if let Some(cart) = self.carts.find_active_by_user(user_id).await? {
            return Ok(cart);
        }

        match self.carts.create(user_id).await {
            Ok(cart) => Ok(cart),
            // A concurrent request may have opened the cart first
            Err(err) => self.carts.find_active_by_user(user_id).await?.ok_or(err),
        }
    }

    #[instrument(skip(self))]
    pub async fn cart_history(&self, user_id: &str) -> ProductResult<Vec<Cart>> {
        self.carts.find_by_user(user_id).await
    }

    #[instrument(skip(self, input), fields(product_id = %input.product, quantity = input.quantity))]
    pub async fn add_item(&self, user_id: &str, input: AddCartItem) -> ProductResult<Cart> {
        if self.products.find_by_id(&input.product).await?.is_none() {
            return Err(ProductError::not_found(messages::PRODUCT_NOT_FOUND));
        }

        let cart = self.get_cart(user_id).await?;
        let cart = self
            .carts
            .add_item(&cart.id, CartItem::from(input))
            .await?
            .ok_or_else(|| ProductError::not_found(messages::CART_CLOSED))?;

        tracing::info!(cart_id = %cart.id, lines = cart.items.len(), "Item added to cart");
        Ok(cart)
    }

    #[instrument(skip(self))]
    pub async fn remove_item(&self, user_id: &str, product_id: &str) -> ProductResult<Cart> {
        let cart = self
            .carts
            .find_active_by_user(user_id)
            .await?
            .ok_or_else(|| ProductError::not_found(messages::ITEM_NOT_IN_CART))?;

        let cart = self
            .carts
            .remove_item(&cart.id, product_id)
            .await?
            .ok_or_else(|| ProductError::not_found(messages::ITEM_NOT_IN_CART))?;

        tracing::info!(cart_id = %cart.id, "Item removed from cart");
        Ok(cart)
    }

    #[instrument(skip(self))]
    pub async fn checkout(&self, user_id: &str) -> ProductResult<Cart> {
        let cart = self
            .carts
            .find_active_by_user(user_id)
            .await?
            .ok_or_else(|| ProductError::not_found(messages::CHECKOUT_FAILED))?;

        if cart.items.is_empty() {
            return Err(ProductError::validation(messages::EMPTY_CART));
        }

        let completed = self
            .carts
            .mark_completed(&cart.id)
            .await?
            .ok_or_else(|| ProductError::not_found(messages::CHECKOUT_FAILED))?;

        tracing::info!(cart_id = %completed.id, total = completed.total(), "Cart checked out");
        Ok(completed)
    }
}
