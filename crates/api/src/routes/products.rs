//! Internal marketplace routes: products and cash sales.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::{
    AppState,
    middleware::auth::{AuthUser, require},
    routes::{internal_error, not_found},
};
use arta_db::{
    ProductRepository,
    repositories::product::{ProductError, ProductInput},
};

/// Creates the marketplace routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products))
        .route("/products", post(create_product))
        .route("/products/{id}", get(get_product))
        .route("/products/{id}", put(update_product))
        .route("/products/{id}", delete(delete_product))
        .route("/sales", post(create_sale))
}

/// Request body for creating or updating a product.
#[derive(Debug, Deserialize)]
pub struct ProductRequest {
    /// Product name.
    pub name: String,
    /// Unit price.
    pub price: Decimal,
    /// Units in stock.
    pub stock: i32,
    /// Free-text description.
    pub description: Option<String>,
}

/// Request body for a cash sale.
#[derive(Debug, Deserialize)]
pub struct CreateSaleRequest {
    /// Product ID.
    pub product_id: Uuid,
    /// Units sold.
    pub quantity: u32,
}

/// GET `/products` - List active products.
async fn list_products(State(state): State<AppState>, auth: AuthUser) -> Response {
    if let Err(response) = require(&auth, "shop:view") {
        return response;
    }

    let repo = ProductRepository::new((*state.db).clone());

    match repo.list().await {
        Ok(products) => (StatusCode::OK, Json(products)).into_response(),
        Err(e) => internal_error(&e, "Failed to list products"),
    }
}

/// GET `/products/{id}` - Get one product.
async fn get_product(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Response {
    if let Err(response) = require(&auth, "shop:view") {
        return response;
    }

    let repo = ProductRepository::new((*state.db).clone());

    match repo.find_by_id(id).await {
        Ok(product) => (StatusCode::OK, Json(product)).into_response(),
        Err(ProductError::NotFound(_)) => not_found("Product not found"),
        Err(e) => internal_error(&e, "Failed to get product"),
    }
}

/// POST `/products` - Create a product.
async fn create_product(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<ProductRequest>,
) -> Response {
    if let Err(response) = require(&auth, "shop:manage") {
        return response;
    }

    if payload.price < Decimal::ZERO || payload.stock < 0 {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_product",
                "message": "Price and stock cannot be negative"
            })),
        )
            .into_response();
    }

    let repo = ProductRepository::new((*state.db).clone());

    let input = ProductInput {
        name: payload.name,
        price: payload.price,
        stock: payload.stock,
        description: payload.description,
    };

    match repo.create(input).await {
        Ok(product) => {
            info!(product_id = %product.id, "Product created");
            (StatusCode::CREATED, Json(product)).into_response()
        }
        Err(e) => internal_error(&e, "Failed to create product"),
    }
}

/// PUT `/products/{id}` - Update a product.
async fn update_product(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ProductRequest>,
) -> Response {
    if let Err(response) = require(&auth, "shop:manage") {
        return response;
    }

    let repo = ProductRepository::new((*state.db).clone());

    let input = ProductInput {
        name: payload.name,
        price: payload.price,
        stock: payload.stock,
        description: payload.description,
    };

    match repo.update(id, input).await {
        Ok(product) => (StatusCode::OK, Json(product)).into_response(),
        Err(ProductError::NotFound(_)) => not_found("Product not found"),
        Err(e) => internal_error(&e, "Failed to update product"),
    }
}

/// DELETE `/products/{id}` - Retire a product from the marketplace.
async fn delete_product(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Response {
    if let Err(response) = require(&auth, "shop:manage") {
        return response;
    }

    let repo = ProductRepository::new((*state.db).clone());

    match repo.delete(id).await {
        Ok(()) => (StatusCode::NO_CONTENT, ()).into_response(),
        Err(ProductError::NotFound(_)) => not_found("Product not found"),
        Err(e) => internal_error(&e, "Failed to delete product"),
    }
}

/// POST `/sales` - Record a cash sale with its journal posting.
async fn create_sale(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateSaleRequest>,
) -> Response {
    if let Err(response) = require(&auth, "shop:sell") {
        return response;
    }

    if payload.quantity == 0 {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_quantity",
                "message": "Quantity must be positive"
            })),
        )
            .into_response();
    }

    let repo = ProductRepository::new((*state.db).clone());

    match repo
        .create_sale(
            payload.product_id,
            payload.quantity,
            &state.ledger.cash_account_number,
            &state.ledger.sales_account_number,
        )
        .await
    {
        Ok(sale) => {
            info!(
                sale_id = %sale.id,
                product_id = %payload.product_id,
                quantity = payload.quantity,
                "Cash sale recorded"
            );
            (StatusCode::CREATED, Json(sale)).into_response()
        }
        Err(ProductError::NotFound(_)) => not_found("Product not found"),
        Err(
            e @ (ProductError::InsufficientStock { .. } | ProductError::MissingAccount { .. }),
        ) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "sale_rejected", "message": e.to_string() })),
        )
            .into_response(),
        Err(e) => internal_error(&e, "Failed to record sale"),
    }
}
