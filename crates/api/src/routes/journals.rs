//! General journal routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::{
    AppState,
    middleware::auth::{AuthUser, require},
    routes::{internal_error, not_found, page_request},
};
use arta_db::{
    JournalRepository,
    repositories::journal::{
        CreateJournalInput, JournalError, JournalLineInput, JournalWithLines,
    },
};
use arta_shared::PageResponse;

/// Creates the journal routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/journals", get(list_journals))
        .route("/journals", post(create_journal))
        .route("/journals/{id}", get(get_journal))
        .route("/journals/{id}", delete(delete_journal))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing journals.
#[derive(Debug, Deserialize)]
pub struct ListJournalsQuery {
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Page size.
    pub limit: Option<u32>,
}

/// Request body for one manual journal line.
#[derive(Debug, Deserialize)]
pub struct JournalLineRequest {
    /// Account ID.
    pub account_id: Uuid,
    /// Debit amount.
    #[serde(default)]
    pub debit: Decimal,
    /// Credit amount.
    #[serde(default)]
    pub credit: Decimal,
}

/// Request body for a manual journal.
#[derive(Debug, Deserialize)]
pub struct CreateJournalRequest {
    /// Entry date (YYYY-MM-DD); now when absent.
    pub entry_date: Option<NaiveDate>,
    /// Description.
    pub description: String,
    /// Journal lines.
    pub lines: Vec<JournalLineRequest>,
}

/// Response for a journal with its lines.
#[derive(Debug, Serialize)]
pub struct JournalResponse {
    /// Journal ID.
    pub id: Uuid,
    /// Entry date.
    pub entry_date: String,
    /// Description.
    pub description: String,
    /// Lines.
    pub lines: Vec<JournalLineResponse>,
    /// Total debits.
    pub total_debit: String,
    /// Total credits.
    pub total_credit: String,
}

/// Response for one journal line.
#[derive(Debug, Serialize)]
pub struct JournalLineResponse {
    /// Line ID.
    pub id: Uuid,
    /// Account ID.
    pub account_id: Uuid,
    /// Debit amount.
    pub debit: String,
    /// Credit amount.
    pub credit: String,
}

impl From<JournalWithLines> for JournalResponse {
    fn from(journal: JournalWithLines) -> Self {
        let total_debit: Decimal = journal.lines.iter().map(|l| l.debit).sum();
        let total_credit: Decimal = journal.lines.iter().map(|l| l.credit).sum();

        Self {
            id: journal.header.id,
            entry_date: journal.header.entry_date.to_rfc3339(),
            description: journal.header.description,
            lines: journal
                .lines
                .into_iter()
                .map(|l| JournalLineResponse {
                    id: l.id,
                    account_id: l.account_id,
                    debit: l.debit.to_string(),
                    credit: l.credit.to_string(),
                })
                .collect(),
            total_debit: total_debit.to_string(),
            total_credit: total_credit.to_string(),
        }
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/journals` - List journals with lines, newest first.
async fn list_journals(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListJournalsQuery>,
) -> Response {
    if let Err(response) = require(&auth, "accounting:view") {
        return response;
    }

    let repo = JournalRepository::new((*state.db).clone());
    let page = page_request(query.page, query.limit);

    match repo.list(&page).await {
        Ok((journals, total)) => {
            let items: Vec<JournalResponse> = journals.into_iter().map(Into::into).collect();
            let response = PageResponse::new(items, page.page, page.per_page, total);
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => internal_error(&e, "Failed to list journals"),
    }
}

/// GET `/journals/{id}` - Get a journal with its lines.
async fn get_journal(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Response {
    if let Err(response) = require(&auth, "accounting:view") {
        return response;
    }

    let repo = JournalRepository::new((*state.db).clone());

    match repo.get(id).await {
        Ok(journal) => (StatusCode::OK, Json(JournalResponse::from(journal))).into_response(),
        Err(JournalError::NotFound(_)) => not_found("Journal not found"),
        Err(e) => internal_error(&e, "Failed to get journal"),
    }
}

/// POST `/journals` - Create a manual balanced journal.
async fn create_journal(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateJournalRequest>,
) -> Response {
    if let Err(response) = require(&auth, "accounting:manage") {
        return response;
    }

    let entry_date = payload.entry_date.map_or_else(
        || Utc::now().into(),
        |d| {
            d.and_hms_opt(0, 0, 0)
                .map_or_else(|| Utc::now().into(), |dt| dt.and_utc().into())
        },
    );

    let repo = JournalRepository::new((*state.db).clone());

    let input = CreateJournalInput {
        entry_date,
        description: payload.description,
        lines: payload
            .lines
            .into_iter()
            .map(|l| JournalLineInput {
                account_id: l.account_id,
                debit: l.debit,
                credit: l.credit,
            })
            .collect(),
    };

    match repo.create(input).await {
        Ok(journal) => {
            info!(journal_id = %journal.header.id, "Manual journal created");
            (StatusCode::CREATED, Json(JournalResponse::from(journal))).into_response()
        }
        Err(
            e @ (JournalError::InsufficientLines
            | JournalError::Unbalanced { .. }
            | JournalError::InvalidLine
            | JournalError::AccountNotFound(_)
            | JournalError::NotPostable(_)),
        ) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid_journal", "message": e.to_string() })),
        )
            .into_response(),
        Err(e) => internal_error(&e, "Failed to create journal"),
    }
}

/// DELETE `/journals/{id}` - Delete a journal; lines cascade.
async fn delete_journal(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Response {
    if let Err(response) = require(&auth, "accounting:manage") {
        return response;
    }

    let repo = JournalRepository::new((*state.db).clone());

    match repo.delete(id).await {
        Ok(()) => {
            info!(journal_id = %id, "Journal deleted");
            (StatusCode::NO_CONTENT, ()).into_response()
        }
        Err(JournalError::NotFound(_)) => not_found("Journal not found"),
        Err(e) => internal_error(&e, "Failed to delete journal"),
    }
}
