//! Loan type routes, including ledger account mapping.

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
    LoanTypeRepository,
    repositories::loan_type::{LoanTypeError, LoanTypeInput},
};

/// Creates the loan type routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/loan-types", get(list_types))
        .route("/loan-types", post(create_type))
        .route("/loan-types/{id}", put(update_type))
        .route("/loan-types/{id}", delete(delete_type))
        .route("/loan-types/{id}/account", put(map_account))
}

/// Request body for creating or updating a loan type.
#[derive(Debug, Deserialize)]
pub struct LoanTypeRequest {
    /// Type name (must be unique).
    pub name: String,
    /// Flat monthly interest rate, in percent.
    pub monthly_interest_rate: Decimal,
}

/// Request body for mapping a loan type to a ledger account.
#[derive(Debug, Deserialize)]
pub struct MapAccountRequest {
    /// The account to map, or null to clear the mapping.
    pub account_id: Option<Uuid>,
}

/// GET `/loan-types` - List all loan types.
async fn list_types(State(state): State<AppState>, auth: AuthUser) -> Response {
    if let Err(response) = require(&auth, "loans:view") {
        return response;
    }

    let repo = LoanTypeRepository::new((*state.db).clone());

    match repo.list().await {
        Ok(types) => (StatusCode::OK, Json(types)).into_response(),
        Err(e) => internal_error(&e, "Failed to list loan types"),
    }
}

/// POST `/loan-types` - Create a loan type.
async fn create_type(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<LoanTypeRequest>,
) -> Response {
    if let Err(response) = require(&auth, "settings:manage") {
        return response;
    }

    let repo = LoanTypeRepository::new((*state.db).clone());

    match repo
        .create(LoanTypeInput {
            name: payload.name,
            monthly_interest_rate: payload.monthly_interest_rate,
        })
        .await
    {
        Ok(loan_type) => {
            info!(loan_type_id = %loan_type.id, "Loan type created");
            (StatusCode::CREATED, Json(loan_type)).into_response()
        }
        Err(e @ LoanTypeError::DuplicateName(_)) => (
            StatusCode::CONFLICT,
            Json(json!({ "error": "duplicate_name", "message": e.to_string() })),
        )
            .into_response(),
        Err(e @ LoanTypeError::NegativeRate) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid_rate", "message": e.to_string() })),
        )
            .into_response(),
        Err(e) => internal_error(&e, "Failed to create loan type"),
    }
}

/// PUT `/loan-types/{id}` - Update a loan type.
async fn update_type(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<LoanTypeRequest>,
) -> Response {
    if let Err(response) = require(&auth, "settings:manage") {
        return response;
    }

    let repo = LoanTypeRepository::new((*state.db).clone());

    match repo
        .update(
            id,
            LoanTypeInput {
                name: payload.name,
                monthly_interest_rate: payload.monthly_interest_rate,
            },
        )
        .await
    {
        Ok(loan_type) => (StatusCode::OK, Json(loan_type)).into_response(),
        Err(LoanTypeError::NotFound(_)) => not_found("Loan type not found"),
        Err(e @ LoanTypeError::NegativeRate) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid_rate", "message": e.to_string() })),
        )
            .into_response(),
        Err(e) => internal_error(&e, "Failed to update loan type"),
    }
}

/// DELETE `/loan-types/{id}` - Delete a loan type.
async fn delete_type(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Response {
    if let Err(response) = require(&auth, "settings:manage") {
        return response;
    }

    let repo = LoanTypeRepository::new((*state.db).clone());

    match repo.delete(id).await {
        Ok(()) => (StatusCode::NO_CONTENT, ()).into_response(),
        Err(LoanTypeError::NotFound(_)) => not_found("Loan type not found"),
        Err(e) => internal_error(&e, "Failed to delete loan type"),
    }
}

/// PUT `/loan-types/{id}/account` - Map the type to a ledger account.
///
/// The mapping is the prerequisite for disbursement and payment postings
/// of this type.
async fn map_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<MapAccountRequest>,
) -> Response {
    if let Err(response) = require(&auth, "settings:manage") {
        return response;
    }

    let repo = LoanTypeRepository::new((*state.db).clone());

    match repo.map_account(id, payload.account_id).await {
        Ok(loan_type) => {
            info!(
                loan_type_id = %id,
                account_id = ?payload.account_id,
                "Loan type account mapping updated"
            );
            (StatusCode::OK, Json(loan_type)).into_response()
        }
        Err(LoanTypeError::NotFound(_)) => not_found("Loan type not found"),
        Err(e @ LoanTypeError::AccountNotFound(_)) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "account_not_found", "message": e.to_string() })),
        )
            .into_response(),
        Err(e) => internal_error(&e, "Failed to map loan type account"),
    }
}
