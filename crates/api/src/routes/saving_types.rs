//! Saving type routes, including ledger account mapping.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
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
    SavingTypeRepository,
    entities::sea_orm_active_enums::SavingTypeKind,
    repositories::saving_type::{SavingTypeError, SavingTypeInput},
};

/// Creates the saving type routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/saving-types", get(list_types))
        .route("/saving-types", post(create_type))
        .route("/saving-types/{id}", put(update_type))
        .route("/saving-types/{id}", delete(delete_type))
        .route("/saving-types/{id}/account", put(map_account))
}

/// Request body for creating or updating a saving type.
#[derive(Debug, Deserialize)]
pub struct SavingTypeRequest {
    /// Type name (must be unique).
    pub name: String,
    /// Posting direction: deposit or withdrawal.
    pub kind: String,
}

/// Request body for mapping a saving type to a ledger account.
#[derive(Debug, Deserialize)]
pub struct MapAccountRequest {
    /// The account to map, or null to clear the mapping.
    pub account_id: Option<Uuid>,
}

/// GET `/saving-types` - List all saving types.
async fn list_types(State(state): State<AppState>, auth: AuthUser) -> Response {
    if let Err(response) = require(&auth, "savings:view") {
        return response;
    }

    let repo = SavingTypeRepository::new((*state.db).clone());

    match repo.list().await {
        Ok(types) => (StatusCode::OK, Json(types)).into_response(),
        Err(e) => internal_error(&e, "Failed to list saving types"),
    }
}

/// POST `/saving-types` - Create a saving type.
async fn create_type(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<SavingTypeRequest>,
) -> Response {
    if let Err(response) = require(&auth, "settings:manage") {
        return response;
    }

    let Some(kind) = string_to_kind(&payload.kind) else {
        return invalid_kind(&payload.kind);
    };

    let repo = SavingTypeRepository::new((*state.db).clone());

    match repo
        .create(SavingTypeInput {
            name: payload.name,
            kind,
        })
        .await
    {
        Ok(saving_type) => {
            info!(saving_type_id = %saving_type.id, "Saving type created");
            (StatusCode::CREATED, Json(saving_type)).into_response()
        }
        Err(e @ SavingTypeError::DuplicateName(_)) => (
            StatusCode::CONFLICT,
            Json(json!({ "error": "duplicate_name", "message": e.to_string() })),
        )
            .into_response(),
        Err(e) => internal_error(&e, "Failed to create saving type"),
    }
}

/// PUT `/saving-types/{id}` - Update a saving type.
async fn update_type(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<SavingTypeRequest>,
) -> Response {
    if let Err(response) = require(&auth, "settings:manage") {
        return response;
    }

    let Some(kind) = string_to_kind(&payload.kind) else {
        return invalid_kind(&payload.kind);
    };

    let repo = SavingTypeRepository::new((*state.db).clone());

    match repo
        .update(
            id,
            SavingTypeInput {
                name: payload.name,
                kind,
            },
        )
        .await
    {
        Ok(saving_type) => (StatusCode::OK, Json(saving_type)).into_response(),
        Err(SavingTypeError::NotFound(_)) => not_found("Saving type not found"),
        Err(e) => internal_error(&e, "Failed to update saving type"),
    }
}

/// DELETE `/saving-types/{id}` - Delete a saving type.
async fn delete_type(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Response {
    if let Err(response) = require(&auth, "settings:manage") {
        return response;
    }

    let repo = SavingTypeRepository::new((*state.db).clone());

    match repo.delete(id).await {
        Ok(()) => (StatusCode::NO_CONTENT, ()).into_response(),
        Err(SavingTypeError::NotFound(_)) => not_found("Saving type not found"),
        Err(e) => internal_error(&e, "Failed to delete saving type"),
    }
}

/// PUT `/saving-types/{id}/account` - Map the type to a ledger account.
///
/// The mapping is the prerequisite for posting approvals of this type.
async fn map_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<MapAccountRequest>,
) -> Response {
    if let Err(response) = require(&auth, "settings:manage") {
        return response;
    }

    let repo = SavingTypeRepository::new((*state.db).clone());

    match repo.map_account(id, payload.account_id).await {
        Ok(saving_type) => {
            info!(
                saving_type_id = %id,
                account_id = ?payload.account_id,
                "Saving type account mapping updated"
            );
            (StatusCode::OK, Json(saving_type)).into_response()
        }
        Err(SavingTypeError::NotFound(_)) => not_found("Saving type not found"),
        Err(e @ SavingTypeError::AccountNotFound(_)) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "account_not_found", "message": e.to_string() })),
        )
            .into_response(),
        Err(e) => internal_error(&e, "Failed to map saving type account"),
    }
}

fn string_to_kind(s: &str) -> Option<SavingTypeKind> {
    match s.to_lowercase().as_str() {
        "deposit" => Some(SavingTypeKind::Deposit),
        "withdrawal" => Some(SavingTypeKind::Withdrawal),
        _ => None,
    }
}

fn invalid_kind(kind: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": "invalid_kind",
            "message": format!("Invalid saving type kind: {kind}")
        })),
    )
        .into_response()
}
