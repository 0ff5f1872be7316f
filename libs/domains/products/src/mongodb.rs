//! MongoDB implementations of ProductRepository and CartRepository

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Document, doc, oid::ObjectId, to_bson, to_document},
    options::{IndexOptions, ReturnDocument},
};
use tracing::instrument;

use crate::error::{ProductError, ProductResult, messages};
use crate::models::{
    Cart, CartItem, CreateProduct, MAX_LINE_QUANTITY, Product, ProductFilter, UpdateProduct,
};
use crate::repository::{CartRepository, ProductRepository};

/// Merge and append can each lose a race against the other; past this many
/// rounds the cart is considered too contended.
const ADD_ITEM_ATTEMPTS: usize = 3;

/// Ids are stored as hex strings so that lookups by arbitrary path
/// segments are plain equality matches.
fn new_id() -> String {
    ObjectId::new().to_hex()
}

/// MongoDB implementation of the ProductRepository
pub struct MongoProductRepository {
    collection: Collection<Product>,
}

impl MongoProductRepository {
    pub fn new(db: &Database) -> Self {
        Self::with_collection(db, "products")
    }

    pub fn with_collection(db: &Database, collection_name: &str) -> Self {
        let collection = db.collection::<Product>(collection_name);
        Self { collection }
    }

    pub async fn init_indexes(&self) -> ProductResult<()> {
        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "name": 1 })
                .options(IndexOptions::builder().name("idx_name".to_string()).build())
                .build(),
            IndexModel::builder()
                .keys(doc! { "category": 1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_category".to_string())
                        .sparse(true)
                        .build(),
                )
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!("Product indexes created successfully");
        Ok(())
    }

    pub fn collection(&self) -> &Collection<Product> {
        &self.collection
    }

    /// `{ field: { $regex, $options: "i" } }` for every present pattern.
    fn build_filter(filter: &ProductFilter) -> Document {
        let mut doc = doc! {};

        if let Some(ref name) = filter.name {
            doc.insert("name", doc! { "$regex": name, "$options": "i" });
        }

        if let Some(ref description) = filter.description {
            doc.insert("description", doc! { "$regex": description, "$options": "i" });
        }

        doc
    }

    /// Ranks by the mean of `ratings` (unrated counts as 0); `_id` breaks
    /// ties in insertion order.
    fn top_rated_pipeline(limit: i64) -> Vec<Document> {
        vec![
            doc! {
                "$addFields": {
                    "average_rating": { "$ifNull": [{ "$avg": "$ratings" }, 0] }
                }
            },
            doc! { "$sort": { "average_rating": -1, "_id": 1 } },
            doc! { "$limit": limit },
            doc! { "$unset": "average_rating" },
        ]
    }
}

#[async_trait]
impl ProductRepository for MongoProductRepository {
    #[instrument(skip(self, input), fields(product_name = %input.name))]
    async fn create(&self, input: CreateProduct) -> ProductResult<Product> {
        let product = Product::new(new_id(), input);

        self.collection.insert_one(&product).await?;

        tracing::info!(product_id = %product.id, "Product created successfully");
        Ok(product)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: &str) -> ProductResult<Option<Product>> {
        let product = self.collection.find_one(doc! { "_id": id }).await?;
        Ok(product)
    }

    #[instrument(skip(self, input))]
    async fn find_by_id_and_update(
        &self,
        id: &str,
        input: UpdateProduct,
    ) -> ProductResult<Option<Product>> {
        let changes = to_document(&input)?;
        if changes.is_empty() {
            return self.find_by_id(id).await;
        }

        let product = self
            .collection
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": changes })
            .return_document(ReturnDocument::After)
            .await?;

        if product.is_some() {
            tracing::info!(product_id = %id, "Product updated successfully");
        }
        Ok(product)
    }

    #[instrument(skip(self))]
    async fn find_by_id_and_delete(&self, id: &str) -> ProductResult<Option<Product>> {
        let product = self.collection.find_one_and_delete(doc! { "_id": id }).await?;

        if product.is_some() {
            tracing::info!(product_id = %id, "Product deleted successfully");
        }
        Ok(product)
    }

    #[instrument(skip(self))]
    async fn find(&self, filter: ProductFilter) -> ProductResult<Vec<Product>> {
        let cursor = self.collection.find(Self::build_filter(&filter)).await?;
        let products: Vec<Product> = cursor.try_collect().await?;

        Ok(products)
    }

    #[instrument(skip(self))]
    async fn find_top_rated(&self, limit: i64) -> ProductResult<Vec<Product>> {
        let cursor = self
            .collection
            .aggregate(Self::top_rated_pipeline(limit))
            .with_type::<Product>()
            .await?;
        let products: Vec<Product> = cursor.try_collect().await?;

        Ok(products)
    }
}

/// MongoDB implementation of the CartRepository
pub struct MongoCartRepository {
    collection: Collection<Cart>,
}

impl MongoCartRepository {
    pub fn new(db: &Database) -> Self {
        Self::with_collection(db, "carts")
    }

    pub fn with_collection(db: &Database, collection_name: &str) -> Self {
        let collection = db.collection::<Cart>(collection_name);
        Self { collection }
    }

    /// The partial unique index keeps at most one open cart per user.
    pub async fn init_indexes(&self) -> ProductResult<()> {
        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "user_id": 1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_user_active_unique".to_string())
                        .unique(true)
                        .partial_filter_expression(doc! { "completed": false })
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "user_id": 1, "_id": -1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_user_history".to_string())
                        .build(),
                )
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!("Cart indexes created successfully");
        Ok(())
    }

    fn open_cart(cart_id: &str) -> Document {
        doc! { "_id": cart_id, "completed": false }
    }

    /// Open cart holding a line for `product` that can take `headroom` more
    /// units; `items.$` in the update then addresses that line.
    fn merge_target(cart_id: &str, product: &str, headroom: i64) -> Document {
        let mut target = Self::open_cart(cart_id);
        target.insert(
            "items",
            doc! { "$elemMatch": { "product": product, "quantity": { "$lte": headroom } } },
        );
        target
    }
}

#[async_trait]
impl CartRepository for MongoCartRepository {
    #[instrument(skip(self))]
    async fn create(&self, user_id: &str) -> ProductResult<Cart> {
        let cart = Cart::new(new_id(), user_id);

        self.collection.insert_one(&cart).await?;

        tracing::info!(cart_id = %cart.id, "Cart created");
        Ok(cart)
    }

    #[instrument(skip(self))]
    async fn find_active_by_user(&self, user_id: &str) -> ProductResult<Option<Cart>> {
        let cart = self
            .collection
            .find_one(doc! { "user_id": user_id, "completed": false })
            .sort(doc! { "_id": -1 })
            .await?;
        Ok(cart)
    }

    #[instrument(skip(self, item), fields(product_id = %item.product, quantity = item.quantity))]
    async fn add_item(&self, cart_id: &str, item: CartItem) -> ProductResult<Option<Cart>> {
        if !(1..=MAX_LINE_QUANTITY).contains(&item.quantity) {
            return Err(ProductError::validation(messages::QUANTITY_LIMIT));
        }
        let headroom = MAX_LINE_QUANTITY - item.quantity;

        for _ in 0..ADD_ITEM_ATTEMPTS {
            let merged = self
                .collection
                .find_one_and_update(
                    Self::merge_target(cart_id, &item.product, headroom),
                    doc! {
                        "$inc": { "items.$.quantity": item.quantity },
                        "$set": { "items.$.price": item.price },
                    },
                )
                .return_document(ReturnDocument::After)
                .await?;
            if merged.is_some() {
                return Ok(merged);
            }

            let mut push_target = Self::open_cart(cart_id);
            push_target.insert("items.product", doc! { "$ne": item.product.as_str() });
            let pushed = self
                .collection
                .find_one_and_update(push_target, doc! { "$push": { "items": to_bson(&item)? } })
                .return_document(ReturnDocument::After)
                .await?;
            if pushed.is_some() {
                return Ok(pushed);
            }

            // Neither update matched. A concurrent push of the same product
            // is retried; anything else is decided from the stored cart.
            let Some(cart) = self.collection.find_one(Self::open_cart(cart_id)).await? else {
                return Ok(None);
            };
            if cart
                .items
                .iter()
                .any(|line| line.product == item.product && line.quantity > headroom)
            {
                return Err(ProductError::validation(messages::QUANTITY_LIMIT));
            }
        }

        Err(ProductError::store(format!(
            "Cart {cart_id} changed concurrently, item not added"
        )))
    }

    #[instrument(skip(self))]
    async fn remove_item(&self, cart_id: &str, product_id: &str) -> ProductResult<Option<Cart>> {
        let mut target = Self::open_cart(cart_id);
        target.insert("items.product", product_id);

        let cart = self
            .collection
            .find_one_and_update(
                target,
                doc! { "$pull": { "items": { "product": product_id } } },
            )
            .return_document(ReturnDocument::After)
            .await?;
        Ok(cart)
    }

    #[instrument(skip(self))]
    async fn mark_completed(&self, cart_id: &str) -> ProductResult<Option<Cart>> {
        let cart = self
            .collection
            .find_one_and_update(
                Self::open_cart(cart_id),
                doc! { "$set": { "completed": true } },
            )
            .return_document(ReturnDocument::After)
            .await?;

        if cart.is_some() {
            tracing::info!(cart_id = %cart_id, "Cart checked out");
        }
        Ok(cart)
    }

    #[instrument(skip(self))]
    async fn find_by_user(&self, user_id: &str) -> ProductResult<Vec<Cart>> {
        let cursor = self
            .collection
            .find(doc! { "user_id": user_id })
            .sort(doc! { "_id": -1 })
            .await?;
        let carts: Vec<Cart> = cursor.try_collect().await?;

        Ok(carts)
    }
}
