//! HTTP handlers for Products API

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use axum_helpers::{
    ValidatedJson,
    errors::responses::{
        BadRequestValidationResponse, InternalServerErrorResponse, NotFoundResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::{ProductError, ProductResult, messages};
use crate::models::{CreateProduct, Product, SearchQuery, UpdateProduct};
use crate::service::ProductCatalog;

/// OpenAPI documentation for Products API
#[derive(OpenApi)]
#[openapi(
    paths(
        get_all_products,
        create_product,
        search_product,
        get_top_rated_products,
        get_product,
        update_product,
        delete_product,
    ),
    components(
        schemas(Product, CreateProduct, UpdateProduct),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Products", description = "Product catalog endpoints")
    )
)]
pub struct ApiDoc;

/// Products router. Literal segments are registered ahead of `/{id}`.
pub fn router<S: ProductCatalog>(service: S) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/all", get(get_all_products::<S>))
        .route("/create", post(create_product::<S>))
        .route("/search", get(search_product::<S>))
        .route("/top-rated/{limit}", get(get_top_rated_products::<S>))
        .route(
            "/{id}",
            get(get_product::<S>)
                .put(update_product::<S>)
                .delete(delete_product::<S>),
        )
        .with_state(shared_service)
}

/// List every product
#[utoipa::path(
    get,
    path = "/all",
    tag = "Products",
    responses(
        (status = 200, description = "All products", body = Vec<Product>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_all_products<S: ProductCatalog>(
    State(service): State<Arc<S>>,
) -> ProductResult<Json<Vec<Product>>> {
    let products = service.get_all_products().await?;
    Ok(Json(products))
}

/// Create a new product
#[utoipa::path(
    post,
    path = "/create",
    tag = "Products",
    request_body = CreateProduct,
    responses(
        (status = 201, description = "Product created successfully", body = Product),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_product<S: ProductCatalog>(
    State(service): State<Arc<S>>,
    ValidatedJson(input): ValidatedJson<CreateProduct>,
) -> ProductResult<impl IntoResponse> {
    let product = service.create_product(input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Search products by name and description
#[utoipa::path(
    get,
    path = "/search",
    tag = "Products",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching products, possibly none", body = Vec<Product>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn search_product<S: ProductCatalog>(
    State(service): State<Arc<S>>,
    Query(query): Query<SearchQuery>,
) -> ProductResult<Json<Vec<Product>>> {
    let products = service
        .search_product(&query.name, &query.description)
        .await?;
    Ok(Json(products))
}

/// Highest average rating first
#[utoipa::path(
    get,
    path = "/top-rated/{limit}",
    tag = "Products",
    params(
        ("limit" = i64, Path, description = "Maximum number of products, must be positive")
    ),
    responses(
        (status = 200, description = "Top-rated products", body = Vec<Product>),
        (status = 400, description = "Limit is not a positive integer"),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_top_rated_products<S: ProductCatalog>(
    State(service): State<Arc<S>>,
    Path(limit): Path<String>,
) -> ProductResult<Json<Vec<Product>>> {
    let limit: i64 = limit
        .trim()
        .parse()
        .map_err(|_| ProductError::validation(messages::INVALID_LIMIT))?;

    let products = service.get_top_rated_products(limit).await?;
    Ok(Json(products))
}

/// Get a product by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Products",
    params(
        ("id" = String, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product found", body = Product),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_product<S: ProductCatalog>(
    State(service): State<Arc<S>>,
    Path(id): Path<String>,
) -> ProductResult<Json<Product>> {
    let product = service.get_product(&id).await?;
    Ok(Json(product))
}

/// Update a product
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Products",
    params(
        ("id" = String, Path, description = "Product ID")
    ),
    request_body = UpdateProduct,
    responses(
        (status = 200, description = "Product updated successfully", body = Product),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_product<S: ProductCatalog>(
    State(service): State<Arc<S>>,
    Path(id): Path<String>,
    ValidatedJson(input): ValidatedJson<UpdateProduct>,
) -> ProductResult<Json<Product>> {
    let product = service.update_product(&id, input).await?;
    Ok(Json(product))
}

/// Delete a product, returning the removed document
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Products",
    params(
        ("id" = String, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product deleted", body = Product),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_product<S: ProductCatalog>(
    State(service): State<Arc<S>>,
    Path(id): Path<String>,
) -> ProductResult<Json<Product>> {
    let product = service.delete_product(&id).await?;
    Ok(Json(product))
}
