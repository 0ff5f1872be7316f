//! In-memory repositories for development and tests.
//!
//! They follow the MongoDB implementations' observable behavior: insertion
//! order is store order, ids are hex ObjectIds, and an invalid search pattern
//! is a store failure.

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use regex::{Regex, RegexBuilder};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{ProductError, ProductResult};
use crate::models::{Cart, CartItem, CreateProduct, Product, ProductFilter, UpdateProduct};
use crate::repository::{CartRepository, ProductRepository};

fn compile(pattern: &Option<String>) -> ProductResult<Option<Regex>> {
    pattern
        .as_deref()
        .map(|p| {
            RegexBuilder::new(p)
                .case_insensitive(true)
                .build()
                .map_err(|e| ProductError::store(format!("Invalid regular expression: {e}")))
        })
        .transpose()
}

#[derive(Clone, Default)]
pub struct InMemoryProductRepository {
    products: Arc<RwLock<Vec<Product>>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn create(&self, input: CreateProduct) -> ProductResult<Product> {
        let product = Product::new(ObjectId::new().to_hex(), input);
        self.products.write().await.push(product.clone());
        Ok(product)
    }

    async fn find_by_id(&self, id: &str) -> ProductResult<Option<Product>> {
        let products = self.products.read().await;
        Ok(products.iter().find(|p| p.id == id).cloned())
    }

    async fn find_by_id_and_update(
        &self,
        id: &str,
        input: UpdateProduct,
    ) -> ProductResult<Option<Product>> {
        let mut products = self.products.write().await;
        Ok(products.iter_mut().find(|p| p.id == id).map(|product| {
            product.apply_update(input);
            product.clone()
        }))
    }

    async fn find_by_id_and_delete(&self, id: &str) -> ProductResult<Option<Product>> {
        let mut products = self.products.write().await;
        Ok(products
            .iter()
            .position(|p| p.id == id)
            .map(|index| products.remove(index)))
    }

    async fn find(&self, filter: ProductFilter) -> ProductResult<Vec<Product>> {
        let name = compile(&filter.name)?;
        let description = compile(&filter.description)?;

        let products = self.products.read().await;
        Ok(products
            .iter()
            .filter(|p| name.as_ref().is_none_or(|re| re.is_match(&p.name)))
            .filter(|p| {
                description
                    .as_ref()
                    .is_none_or(|re| re.is_match(&p.description))
            })
            .cloned()
            .collect())
    }

    async fn find_top_rated(&self, limit: i64) -> ProductResult<Vec<Product>> {
        let mut ranked = self.products.read().await.clone();
        // sort_by is stable: equal averages keep insertion order
        ranked.sort_by(|a, b| b.average_rating().total_cmp(&a.average_rating()));
        ranked.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(ranked)
    }
}

#[derive(Clone, Default)]
pub struct InMemoryCartRepository {
    carts: Arc<RwLock<Vec<Cart>>>,
}

impl InMemoryCartRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `apply` on the open cart under the write lock. `apply` answers
    /// whether it changed anything; `false` reads as `None`.
    async fn update_open<F>(&self, cart_id: &str, apply: F) -> ProductResult<Option<Cart>>
    where
        F: FnOnce(&mut Cart) -> ProductResult<bool> + Send,
    {
        let mut carts = self.carts.write().await;
        let Some(cart) = carts.iter_mut().find(|c| c.id == cart_id && !c.completed) else {
            return Ok(None);
        };

        Ok(apply(cart)?.then(|| cart.clone()))
    }
}

#[async_trait]
impl CartRepository for InMemoryCartRepository {
    async fn create(&self, user_id: &str) -> ProductResult<Cart> {
        let mut carts = self.carts.write().await;
        if carts.iter().any(|c| c.user_id == user_id && !c.completed) {
            return Err(ProductError::store(format!(
                "User {user_id} already has an open cart"
            )));
        }

        let cart = Cart::new(ObjectId::new().to_hex(), user_id);
        carts.push(cart.clone());
        Ok(cart)
    }

    async fn find_active_by_user(&self, user_id: &str) -> ProductResult<Option<Cart>> {
        let carts = self.carts.read().await;
        Ok(carts
            .iter()
            .rev()
            .find(|c| c.user_id == user_id && !c.completed)
            .cloned())
    }

    async fn add_item(&self, cart_id: &str, item: CartItem) -> ProductResult<Option<Cart>> {
        self.update_open(cart_id, |cart| cart.add_item(item).map(|()| true))
            .await
    }

    async fn remove_item(&self, cart_id: &str, product_id: &str) -> ProductResult<Option<Cart>> {
        self.update_open(cart_id, |cart| Ok(cart.remove_item(product_id)))
            .await
    }

    async fn mark_completed(&self, cart_id: &str) -> ProductResult<Option<Cart>> {
        self.update_open(cart_id, |cart| {
            cart.completed = true;
            Ok(true)
        })
        .await
    }

    async fn find_by_user(&self, user_id: &str) -> ProductResult<Vec<Cart>> {
        let carts = self.carts.read().await;
        Ok(carts
            .iter()
            .rev()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect())
    }
}
