use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::error::{ProductError, ProductResult, messages};

/// Upper bound for the quantity of a single cart line, merged or not
pub const MAX_LINE_QUANTITY: i64 = 10_000;

fn default_price() -> f64 {
    1.0
}

fn default_quantity() -> i64 {
    1
}

/// Product entity as stored in the `products` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    /// Store-assigned identifier (hex ObjectId)
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_price")]
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Image URL or reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Individual ratings in submission order
    #[serde(default)]
    pub ratings: Vec<f64>,
}

/// DTO for creating a new product
#[derive(Debug, Clone, PartialEq, Deserialize, Validate, ToSchema)]
pub struct CreateProduct {
    #[validate(length(min = 1))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[validate(range(min = 0.0))]
    #[serde(default = "default_price")]
    pub price: f64,
    pub category: Option<String>,
    pub image: Option<String>,
    #[serde(default)]
    pub ratings: Vec<f64>,
}

/// DTO for a partial update; absent fields are left untouched.
///
/// Serializes to the `$set` document of the update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateProduct {
    #[validate(length(min = 1))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[validate(range(min = 0.0))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ratings: Option<Vec<f64>>,
}

/// Repository-level search: case-insensitive regex patterns, all present
/// ones must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl ProductFilter {
    /// Empty patterns match everything, so they are dropped.
    pub fn new(name: &str, description: &str) -> Self {
        let pattern = |p: &str| (!p.is_empty()).then(|| p.to_string());
        Self {
            name: pattern(name),
            description: pattern(description),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }
}

/// Query string of `GET /search`
#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Case-insensitive regex on the name
    #[serde(default)]
    pub name: String,
    /// Case-insensitive regex on the description
    #[serde(default)]
    pub description: String,
}

impl Product {
    pub fn new(id: impl Into<String>, input: CreateProduct) -> Self {
        Self {
            id: id.into(),
            name: input.name,
            description: input.description,
            price: input.price,
            category: input.category,
            image: input.image,
            ratings: input.ratings,
        }
    }

    pub fn apply_update(&mut self, update: UpdateProduct) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(category) = update.category {
            self.category = Some(category);
        }
        if let Some(image) = update.image {
            self.image = Some(image);
        }
        if let Some(ratings) = update.ratings {
            self.ratings = ratings;
        }
    }

    /// Mean of `ratings`, `0` when unrated.
    pub fn average_rating(&self) -> f64 {
        if self.ratings.is_empty() {
            0.0
        } else {
            self.ratings.iter().sum::<f64>() / self.ratings.len() as f64
        }
    }
}

/// One line of a cart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CartItem {
    /// Product id
    pub product: String,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
    /// Unit price at the time the item was added
    #[serde(default = "default_price")]
    pub price: f64,
}

/// Shopping cart, one active (non-completed) per user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Cart {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub items: Vec<CartItem>,
    /// Set once at checkout; a completed cart is never modified again
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

/// DTO for `POST /{user_id}/items`
#[derive(Debug, Clone, PartialEq, Deserialize, Validate, ToSchema)]
pub struct AddCartItem {
    #[validate(length(min = 1))]
    pub product: String,
    #[validate(range(min = 1, max = MAX_LINE_QUANTITY))]
    #[serde(default = "default_quantity")]
    pub quantity: i64,
    #[validate(range(min = 0.0))]
    #[serde(default = "default_price")]
    pub price: f64,
}

impl From<AddCartItem> for CartItem {
    fn from(input: AddCartItem) -> Self {
        Self {
            product: input.product,
            quantity: input.quantity,
            price: input.price,
        }
    }
}

fn merged_quantity(current: i64, added: i64) -> ProductResult<i64> {
    current
        .checked_add(added)
        .filter(|quantity| (1..=MAX_LINE_QUANTITY).contains(quantity))
        .ok_or_else(|| ProductError::validation(messages::QUANTITY_LIMIT))
}

impl Cart {
    pub fn new(id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            items: Vec::new(),
            completed: false,
            created_at: Utc::now(),
        }
    }

    /// Adds a line, or merges into the existing line for the same product:
    /// quantities add up and the newer price wins. A line never ends up
    /// outside `1..=MAX_LINE_QUANTITY`; the cart is untouched on error.
    pub fn add_item(&mut self, item: CartItem) -> ProductResult<()> {
        match self.items.iter_mut().find(|line| line.product == item.product) {
            Some(line) => {
                line.quantity = merged_quantity(line.quantity, item.quantity)?;
                line.price = item.price;
            }
            None => {
                merged_quantity(0, item.quantity)?;
                self.items.push(item);
            }
        }
        Ok(())
    }

    /// Returns `false` when no line references `product_id`.
    pub fn remove_item(&mut self, product_id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|line| line.product != product_id);
        self.items.len() != before
    }

    pub fn total(&self) -> f64 {
        self.items
            .iter()
            .map(|line| line.price * line.quantity as f64)
            .sum()
    }
}
