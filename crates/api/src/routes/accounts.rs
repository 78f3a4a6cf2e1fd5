//! Chart of accounts routes.

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
    AccountRepository,
    entities::sea_orm_active_enums::AccountType,
    repositories::account::{AccountError, CreateAccountInput, UpdateAccountInput},
};

/// Creates the chart of accounts routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts", get(list_accounts))
        .route("/accounts", post(create_account))
        .route("/accounts/{id}", put(update_account))
        .route("/accounts/{id}", delete(delete_account))
        .route("/journal-accounts", get(list_journalable))
}

/// Request body for creating an account.
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    /// Account number (must be unique).
    pub account_number: String,
    /// Account name.
    pub name: String,
    /// Account type: asset, liability, equity, revenue, or expense.
    pub account_type: String,
    /// Parent account for roll-up reporting.
    pub parent_id: Option<Uuid>,
}

/// Request body for updating an account.
#[derive(Debug, Deserialize)]
pub struct UpdateAccountRequest {
    /// New name.
    pub name: Option<String>,
    /// New account type.
    pub account_type: Option<String>,
    /// New active flag.
    pub is_active: Option<bool>,
}

/// GET `/accounts` - List all accounts ordered by number.
async fn list_accounts(State(state): State<AppState>, auth: AuthUser) -> Response {
    if let Err(response) = require(&auth, "accounting:view") {
        return response;
    }

    let repo = AccountRepository::new((*state.db).clone());

    match repo.list().await {
        Ok(accounts) => (StatusCode::OK, Json(accounts)).into_response(),
        Err(e) => internal_error(&e, "Failed to list accounts"),
    }
}

/// GET `/journal-accounts` - Active leaf accounts only.
async fn list_journalable(State(state): State<AppState>, auth: AuthUser) -> Response {
    if let Err(response) = require(&auth, "accounting:view") {
        return response;
    }

    let repo = AccountRepository::new((*state.db).clone());

    match repo.list_journalable().await {
        Ok(accounts) => (StatusCode::OK, Json(accounts)).into_response(),
        Err(e) => internal_error(&e, "Failed to list journalable accounts"),
    }
}

/// POST `/accounts` - Create an account.
async fn create_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateAccountRequest>,
) -> Response {
    if let Err(response) = require(&auth, "accounting:manage") {
        return response;
    }

    let Some(account_type) = string_to_account_type(&payload.account_type) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_account_type",
                "message": format!("Invalid account type: {}", payload.account_type)
            })),
        )
            .into_response();
    };

    let repo = AccountRepository::new((*state.db).clone());

    let input = CreateAccountInput {
        account_number: payload.account_number,
        name: payload.name,
        account_type,
        parent_id: payload.parent_id,
    };

    match repo.create(input).await {
        Ok(account) => {
            info!(account_id = %account.id, number = %account.account_number, "Account created");
            (StatusCode::CREATED, Json(account)).into_response()
        }
        Err(e @ (AccountError::DuplicateNumber(_) | AccountError::ParentNotFound(_))) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid_account", "message": e.to_string() })),
        )
            .into_response(),
        Err(e) => internal_error(&e, "Failed to create account"),
    }
}

/// PUT `/accounts/{id}` - Update an account.
async fn update_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAccountRequest>,
) -> Response {
    if let Err(response) = require(&auth, "accounting:manage") {
        return response;
    }

    let account_type = match payload.account_type.as_deref() {
        Some(s) => match string_to_account_type(s) {
            Some(t) => Some(t),
            None => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": "invalid_account_type",
                        "message": format!("Invalid account type: {s}")
                    })),
                )
                    .into_response();
            }
        },
        None => None,
    };

    let repo = AccountRepository::new((*state.db).clone());

    let input = UpdateAccountInput {
        name: payload.name,
        account_type,
        is_active: payload.is_active,
    };

    match repo.update(id, input).await {
        Ok(account) => (StatusCode::OK, Json(account)).into_response(),
        Err(AccountError::NotFound(_)) => not_found("Account not found"),
        Err(e) => internal_error(&e, "Failed to update account"),
    }
}

/// DELETE `/accounts/{id}` - Delete an account without journal lines.
async fn delete_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Response {
    if let Err(response) = require(&auth, "accounting:manage") {
        return response;
    }

    let repo = AccountRepository::new((*state.db).clone());

    match repo.delete(id).await {
        Ok(()) => {
            info!(account_id = %id, "Account deleted");
            (StatusCode::NO_CONTENT, ()).into_response()
        }
        Err(AccountError::NotFound(_)) => not_found("Account not found"),
        Err(e @ AccountError::HasJournalLines(_)) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "account_in_use", "message": e.to_string() })),
        )
            .into_response(),
        Err(e) => internal_error(&e, "Failed to delete account"),
    }
}

fn string_to_account_type(s: &str) -> Option<AccountType> {
    match s.to_lowercase().as_str() {
        "asset" => Some(AccountType::Asset),
        "liability" => Some(AccountType::Liability),
        "equity" => Some(AccountType::Equity),
        "revenue" => Some(AccountType::Revenue),
        "expense" => Some(AccountType::Expense),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_type_parsing() {
        assert_eq!(string_to_account_type("asset"), Some(AccountType::Asset));
        assert_eq!(string_to_account_type("REVENUE"), Some(AccountType::Revenue));
        assert_eq!(string_to_account_type("cash"), None);
    }
}
