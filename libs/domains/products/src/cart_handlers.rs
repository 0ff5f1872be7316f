//! HTTP handlers for the cart endpoints

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post},
};
use axum_helpers::{
    ValidatedJson,
    errors::responses::{
        BadRequestValidationResponse, InternalServerErrorResponse, NotFoundResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::cart_service::CartService;
use crate::error::ProductResult;
use crate::models::{AddCartItem, Cart, CartItem};
use crate::repository::{CartRepository, ProductRepository};

#[derive(OpenApi)]
#[openapi(
    paths(get_cart, cart_history, add_item, remove_item, checkout),
    components(
        schemas(Cart, CartItem, AddCartItem),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Carts", description = "Per-user shopping cart endpoints")
    )
)]
pub struct CartApiDoc;

type SharedCarts<C, P> = State<Arc<CartService<C, P>>>;

pub fn router<C, P>(service: CartService<C, P>) -> Router
where
    C: CartRepository + 'static,
    P: ProductRepository + 'static,
{
    Router::new()
        .route("/{user_id}", get(get_cart::<C, P>))
        .route("/{user_id}/history", get(cart_history::<C, P>))
        .route("/{user_id}/items", post(add_item::<C, P>))
        .route("/{user_id}/items/{product_id}", delete(remove_item::<C, P>))
        .route("/{user_id}/checkout", post(checkout::<C, P>))
        .with_state(Arc::new(service))
}

/// The user's open cart, created empty on first access
#[utoipa::path(
    get,
    path = "/{user_id}",
    tag = "Carts",
    params(("user_id" = String, Path, description = "Owner of the cart")),
    responses(
        (status = 200, description = "Open cart", body = Cart),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_cart<C: CartRepository + 'static, P: ProductRepository + 'static>(
    State(service): SharedCarts<C, P>,
    Path(user_id): Path<String>,
) -> ProductResult<Json<Cart>> {
    Ok(Json(service.get_cart(&user_id).await?))
}

/// Every cart of the user, newest first
#[utoipa::path(
    get,
    path = "/{user_id}/history",
    tag = "Carts",
    params(("user_id" = String, Path, description = "Owner of the carts")),
    responses(
        (status = 200, description = "Open and completed carts", body = Vec<Cart>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn cart_history<C: CartRepository + 'static, P: ProductRepository + 'static>(
    State(service): SharedCarts<C, P>,
    Path(user_id): Path<String>,
) -> ProductResult<Json<Vec<Cart>>> {
    Ok(Json(service.cart_history(&user_id).await?))
}

/// Add a product line; an existing line for the same product is merged
#[utoipa::path(
    post,
    path = "/{user_id}/items",
    tag = "Carts",
    params(("user_id" = String, Path, description = "Owner of the cart")),
    request_body = AddCartItem,
    responses(
        (status = 200, description = "Updated cart", body = Cart),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn add_item<C: CartRepository + 'static, P: ProductRepository + 'static>(
    State(service): SharedCarts<C, P>,
    Path(user_id): Path<String>,
    ValidatedJson(input): ValidatedJson<AddCartItem>,
) -> ProductResult<Json<Cart>> {
    Ok(Json(service.add_item(&user_id, input).await?))
}

#[utoipa::path(
    delete,
    path = "/{user_id}/items/{product_id}",
    tag = "Carts",
    params(
        ("user_id" = String, Path, description = "Owner of the cart"),
        ("product_id" = String, Path, description = "Product line to remove")
    ),
    responses(
        (status = 200, description = "Updated cart", body = Cart),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn remove_item<C: CartRepository + 'static, P: ProductRepository + 'static>(
    State(service): SharedCarts<C, P>,
    Path((user_id, product_id)): Path<(String, String)>,
) -> ProductResult<Json<Cart>> {
    Ok(Json(service.remove_item(&user_id, &product_id).await?))
}

/// Freeze the open cart; the next access opens a new one
#[utoipa::path(
    post,
    path = "/{user_id}/checkout",
    tag = "Carts",
    params(("user_id" = String, Path, description = "Owner of the cart")),
    responses(
        (status = 200, description = "Completed cart", body = Cart),
        (status = 400, description = "Cart is empty"),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn checkout<C: CartRepository + 'static, P: ProductRepository + 'static>(
    State(service): SharedCarts<C, P>,
    Path(user_id): Path<String>,
) -> ProductResult<Json<Cart>> {
    Ok(Json(service.checkout(&user_id).await?))
}
