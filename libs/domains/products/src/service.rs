//! Product Service - Business logic layer

use async_trait::async_trait;
use std::sync::Arc;
use tracing::instrument;

use crate::error::{ProductError, ProductResult, messages};
use crate::models::{CreateProduct, Product, ProductFilter, UpdateProduct};
use crate::repository::ProductRepository;

/// Catalog operations exposed to the HTTP layer.
///
/// Missing documents surface as [`ProductError::NotFound`] with a fixed
/// per-operation message; store failures pass through unchanged.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductCatalog: Send + Sync + 'static {
    async fn create_product(&self, input: CreateProduct) -> ProductResult<Product>;

    async fn get_product(&self, id: &str) -> ProductResult<Product>;

    async fn update_product(&self, id: &str, input: UpdateProduct) -> ProductResult<Product>;

    async fn delete_product(&self, id: &str) -> ProductResult<Product>;

    /// Products whose name and description both match; empty patterns match anything
    async fn search_product(&self, name: &str, description: &str) -> ProductResult<Vec<Product>>;

    async fn get_all_products(&self) -> ProductResult<Vec<Product>>;

    async fn get_top_rated_products(&self, limit: i64) -> ProductResult<Vec<Product>>;
}

/// [`ProductCatalog`] over any [`ProductRepository`]
pub struct ProductService<R: ProductRepository> {
    repository: Arc<R>,
}

impl<R: ProductRepository> ProductService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    pub fn from_shared(repository: Arc<R>) -> Self {
        Self { repository }
    }
}

impl<R: ProductRepository> Clone for ProductService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

#[async_trait]
impl<R: ProductRepository + 'static> ProductCatalog for ProductService<R> {
    #[instrument(skip(self, input), fields(product_name = %input.name))]
    async fn create_product(&self, input: CreateProduct) -> ProductResult<Product> {
        self.repository.create(input).await
    }

    #[instrument(skip(self))]
    async fn get_product(&self, id: &str) -> ProductResult<Product> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| ProductError::not_found(messages::GET_FAILED))
    }

    #[instrument(skip(self, input))]
    async fn update_product(&self, id: &str, input: UpdateProduct) -> ProductResult<Product> {
        self.repository
            .find_by_id_and_update(id, input)
            .await?
            .ok_or_else(|| ProductError::not_found(messages::UPDATE_FAILED))
    }

    #[instrument(skip(self))]
    async fn delete_product(&self, id: &str) -> ProductResult<Product> {
        self.repository
            .find_by_id_and_delete(id)
            .await?
            .ok_or_else(|| ProductError::not_found(messages::DELETE_FAILED))
    }

    #[instrument(skip(self))]
    async fn search_product(&self, name: &str, description: &str) -> ProductResult<Vec<Product>> {
        let products = self
            .repository
            .find(ProductFilter::new(name, description))
            .await?;

        tracing::debug!(matches = products.len(), "Product search finished");
        Ok(products)
    }

    #[instrument(skip(self))]
    async fn get_all_products(&self) -> ProductResult<Vec<Product>> {
        self.repository.find(ProductFilter::default()).await
    }

    #[instrument(skip(self))]
    async fn get_top_rated_products(&self, limit: i64) -> ProductResult<Vec<Product>> {
        if limit <= 0 {
            return Err(ProductError::validation(messages::INVALID_LIMIT));
        }

        self.repository.find_top_rated(limit).await
    }
}
