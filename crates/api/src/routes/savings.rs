//! Savings management routes.

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use chrono::NaiveDate;
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
use arta_core::bulk::{ColumnMap, RawRow};
use arta_core::posting::SavingStatus;
use arta_db::{
    MemberRepository, SavingRepository,
    entities::sea_orm_active_enums,
    repositories::saving::{
        CreateSavingInput, SavingError, SavingFilter, SavingWithDetails, UpdateSavingInput,
    },
};
use arta_shared::PageResponse;

/// Creates the savings routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/savings", get(list_savings))
        .route("/savings", post(create_saving))
        .route("/savings/export-template", get(export_template))
        .route("/savings/bulk-upload", post(bulk_upload))
        .route("/savings/member/{member_id}", get(list_member_savings))
        .route("/savings/{id}", put(update_saving))
        .route("/savings/{id}", delete(delete_saving))
        .route("/savings/{id}/status", put(update_status))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing savings.
#[derive(Debug, Deserialize)]
pub struct ListSavingsQuery {
    /// Filter by date range start (YYYY-MM-DD).
    pub start_date: Option<NaiveDate>,
    /// Filter by date range end (YYYY-MM-DD).
    pub end_date: Option<NaiveDate>,
    /// Member name search.
    pub search: Option<String>,
    /// Filter by saving type.
    pub saving_type_id: Option<Uuid>,
    /// Filter by status.
    pub status: Option<String>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Page size.
    pub limit: Option<u32>,
}

/// Request body for creating a saving.
#[derive(Debug, Deserialize)]
pub struct CreateSavingRequest {
    /// Member ID.
    pub member_id: Uuid,
    /// Saving type ID.
    pub saving_type_id: Uuid,
    /// Amount.
    pub amount: Decimal,
    /// Entry date (YYYY-MM-DD); today when absent.
    pub date: Option<NaiveDate>,
    /// Free-text description.
    pub description: Option<String>,
}

/// Request body for editing a saving.
#[derive(Debug, Deserialize)]
pub struct UpdateSavingRequest {
    /// Member ID.
    pub member_id: Uuid,
    /// Saving type ID.
    pub saving_type_id: Uuid,
    /// Amount.
    pub amount: Decimal,
    /// Free-text description.
    pub description: Option<String>,
}

/// Request body for a status update.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    /// Requested status: Pending, Approved, or Rejected.
    pub status: String,
}

/// Response for a saving record.
#[derive(Debug, Serialize)]
pub struct SavingResponse {
    /// Saving ID.
    pub id: Uuid,
    /// Member ID.
    pub member_id: Uuid,
    /// Saving type ID.
    pub saving_type_id: Uuid,
    /// Member name.
    pub member_name: String,
    /// Member cooperative number.
    pub cooperative_number: String,
    /// Saving type name.
    pub saving_type_name: String,
    /// Amount.
    pub amount: String,
    /// Entry date.
    pub date: String,
    /// Status.
    pub status: String,
    /// Description.
    pub description: Option<String>,
    /// Linked journal header, once approved.
    pub journal_id: Option<Uuid>,
}

impl From<SavingWithDetails> for SavingResponse {
    fn from(details: SavingWithDetails) -> Self {
        let saving = details.saving;
        Self {
            id: saving.id,
            member_id: saving.member_id,
            saving_type_id: saving.saving_type_id,
            member_name: details.member_name,
            cooperative_number: details.cooperative_number,
            saving_type_name: details.saving_type_name,
            amount: saving.amount.to_string(),
            date: saving.date.to_string(),
            status: status_to_string(&saving.status).to_string(),
            description: saving.description,
            journal_id: saving.journal_id,
        }
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/savings` - List savings with filters and pagination.
async fn list_savings(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListSavingsQuery>,
) -> Response {
    if let Err(response) = require(&auth, "savings:view") {
        return response;
    }

    let repo = SavingRepository::new((*state.db).clone());

    let filter = SavingFilter {
        date_from: query.start_date,
        date_to: query.end_date,
        search: query.search,
        saving_type_id: query.saving_type_id,
        status: query.status.as_deref().and_then(string_to_status),
    };
    let page = page_request(query.page, query.limit);

    match repo.list(filter, &page).await {
        Ok((rows, total)) => {
            let items: Vec<SavingResponse> = rows.into_iter().map(Into::into).collect();
            let response = PageResponse::new(items, page.page, page.per_page, total);
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => internal_error(&e, "Failed to list savings"),
    }
}

/// GET `/savings/member/{member_id}` - List one member's savings.
async fn list_member_savings(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(member_id): Path<Uuid>,
) -> Response {
    if let Err(response) = require(&auth, "savings:view") {
        return response;
    }

    let repo = SavingRepository::new((*state.db).clone());

    match repo.list_by_member(member_id).await {
        Ok(rows) => {
            let items: Vec<SavingResponse> = rows.into_iter().map(Into::into).collect();
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => internal_error(&e, "Failed to list member savings"),
    }
}

/// POST `/savings` - Create a pending saving record.
async fn create_saving(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateSavingRequest>,
) -> Response {
    if let Err(response) = require(&auth, "savings:approve") {
        return response;
    }

    if payload.amount <= Decimal::ZERO {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_amount",
                "message": "Amount must be positive"
            })),
        )
            .into_response();
    }

    let repo = SavingRepository::new((*state.db).clone());

    let input = CreateSavingInput {
        member_id: payload.member_id,
        saving_type_id: payload.saving_type_id,
        amount: payload.amount,
        date: payload.date,
        description: payload.description,
    };

    match repo.create(input).await {
        Ok(saving) => {
            info!(saving_id = %saving.id, "Saving created");
            (StatusCode::CREATED, Json(saving)).into_response()
        }
        Err(e @ (SavingError::MemberNotFound(_) | SavingError::TypeNotFound(_))) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid_reference", "message": e.to_string() })),
        )
            .into_response(),
        Err(e) => internal_error(&e, "Failed to create saving"),
    }
}

/// PUT `/savings/{id}` - Edit a saving record.
async fn update_saving(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSavingRequest>,
) -> Response {
    if let Err(response) = require(&auth, "savings:manage") {
        return response;
    }

    let repo = SavingRepository::new((*state.db).clone());

    let input = UpdateSavingInput {
        member_id: payload.member_id,
        saving_type_id: payload.saving_type_id,
        amount: payload.amount,
        description: payload.description,
    };

    match repo.update(id, input).await {
        Ok(saving) => (StatusCode::OK, Json(saving)).into_response(),
        Err(SavingError::NotFound(_)) => not_found("Saving not found"),
        Err(e) => internal_error(&e, "Failed to update saving"),
    }
}

/// DELETE `/savings/{id}` - Delete a saving and its linked journal.
async fn delete_saving(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Response {
    if let Err(response) = require(&auth, "savings:manage") {
        return response;
    }

    let repo = SavingRepository::new((*state.db).clone());

    match repo.delete(id).await {
        Ok(()) => {
            info!(saving_id = %id, "Saving deleted");
            (StatusCode::NO_CONTENT, ()).into_response()
        }
        Err(SavingError::NotFound(_)) => not_found("Saving not found"),
        Err(e) => internal_error(&e, "Failed to delete saving"),
    }
}

/// PUT `/savings/{id}/status` - Update a saving's status.
///
/// The transition into Approved posts the journal entry atomically with
/// the status update.
async fn update_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Response {
    if let Err(response) = require(&auth, "savings:approve") {
        return response;
    }

    // Reject unknown statuses before any side effect.
    let Some(new_status) = SavingStatus::parse(&payload.status) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_status",
                "message": format!("Invalid status: {}", payload.status)
            })),
        )
            .into_response();
    };

    let repo = SavingRepository::new((*state.db).clone());

    match repo
        .update_status(id, new_status, &state.ledger.cash_account_number)
        .await
    {
        Ok(saving) => {
            info!(
                saving_id = %id,
                status = new_status.as_str(),
                journal_id = ?saving.journal_id,
                "Saving status updated"
            );
            (
                StatusCode::OK,
                Json(json!({
                    "id": saving.id,
                    "status": status_to_string(&saving.status),
                    "amount": saving.amount.to_string(),
                    "journal_id": saving.journal_id,
                })),
            )
                .into_response()
        }
        Err(SavingError::NotFound(_)) => not_found("Saving not found"),
        Err(
            e @ (SavingError::UnmappedAccount { .. } | SavingError::MissingCashAccount { .. }),
        ) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "posting_precondition", "message": e.to_string() })),
        )
            .into_response(),
        Err(e) => internal_error(&e, "Failed to update saving status"),
    }
}

/// GET `/savings/export-template` - Bulk import template prefilled with
/// active members.
async fn export_template(State(state): State<AppState>, auth: AuthUser) -> Response {
    if let Err(response) = require(&auth, "savings:approve") {
        return response;
    }

    let repo = MemberRepository::new((*state.db).clone());
    let members = match repo.list_active().await {
        Ok(members) => members,
        Err(e) => return internal_error(&e, "Failed to load members for template"),
    };

    if members.is_empty() {
        return not_found("No active members found for the template");
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    let header_row = [
        "Cooperative Number",
        "Member Name",
        "Saving Type",
        "Amount",
        "Date (YYYY-MM-DD)",
        "Description",
    ];
    if let Err(e) = writer.write_record(header_row) {
        return internal_error(&e, "Failed to write template");
    }
    for member in &members {
        let row = [
            member.cooperative_number.as_str(),
            member.name.as_str(),
            "",
            "",
            "",
            "",
        ];
        if let Err(e) = writer.write_record(row) {
            return internal_error(&e, "Failed to write template");
        }
    }

    match writer.into_inner() {
        Ok(body) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"savings_template.csv\"",
                ),
            ],
            body,
        )
            .into_response(),
        Err(e) => internal_error(&e, "Failed to write template"),
    }
}

/// POST `/savings/bulk-upload` - Import a CSV of savings as one
/// pre-approved, single-journal batch.
async fn bulk_upload(
    State(state): State<AppState>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> Response {
    if let Err(response) = require(&auth, "savings:approve") {
        return response;
    }

    // Take the first uploaded file field.
    let mut data: Option<Vec<u8>> = None;
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => match field.bytes().await {
                Ok(bytes) => {
                    data = Some(bytes.to_vec());
                    break;
                }
                Err(e) => {
                    return (
                        StatusCode::BAD_REQUEST,
                        Json(json!({
                            "error": "invalid_upload",
                            "message": format!("Failed to read uploaded file: {e}")
                        })),
                    )
                        .into_response();
                }
            },
            Ok(None) => break,
            Err(e) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": "invalid_upload",
                        "message": format!("Malformed multipart request: {e}")
                    })),
                )
                    .into_response();
            }
        }
    }
    let Some(data) = data else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "missing_file",
                "message": "No file was uploaded"
            })),
        )
            .into_response();
    };

    let rows = match parse_csv_rows(&data) {
        Ok(rows) => rows,
        Err(message) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "invalid_file", "message": message })),
            )
                .into_response();
        }
    };

    let repo = SavingRepository::new((*state.db).clone());

    match repo
        .bulk_import(&rows, &state.ledger.cash_account_number)
        .await
    {
        Ok(count) => {
            info!(rows = count, "Bulk savings import committed");
            (
                StatusCode::CREATED,
                Json(json!({
                    "message": format!("{count} savings rows imported and posted")
                })),
            )
                .into_response()
        }
        Err(
            e @ (SavingError::Bulk(_)
            | SavingError::MissingCashAccount { .. }
            | SavingError::UnmappedAccount { .. }),
        ) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "bulk_import_failed", "message": e.to_string() })),
        )
            .into_response(),
        Err(e) => internal_error(&e, "Bulk savings import failed"),
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Parses CSV bytes into raw rows using header-located columns.
fn parse_csv_rows(data: &[u8]) -> Result<Vec<RawRow>, String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(data);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| format!("Failed to read header row: {e}"))?
        .iter()
        .map(ToString::to_string)
        .collect();
    let columns = ColumnMap::locate(&headers).map_err(|e| e.to_string())?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| format!("Failed to read row: {e}"))?;
        let cells: Vec<String> = record.iter().map(ToString::to_string).collect();
        rows.push(columns.extract(&cells));
    }
    Ok(rows)
}

fn status_to_string(status: &sea_orm_active_enums::SavingStatus) -> &'static str {
    match status {
        sea_orm_active_enums::SavingStatus::Pending => "Pending",
        sea_orm_active_enums::SavingStatus::Approved => "Approved",
        sea_orm_active_enums::SavingStatus::Rejected => "Rejected",
    }
}

fn string_to_status(s: &str) -> Option<sea_orm_active_enums::SavingStatus> {
    match s {
        "Pending" => Some(sea_orm_active_enums::SavingStatus::Pending),
        "Approved" => Some(sea_orm_active_enums::SavingStatus::Approved),
        "Rejected" => Some(sea_orm_active_enums::SavingStatus::Rejected),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_csv_rows_locates_columns() {
        let data = b"Saving Type,Amount,Cooperative Number\nMandatory Saving,100000,KOP-001\n";
        let rows = parse_csv_rows(data).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].cooperative_number, "KOP-001");
        assert_eq!(rows[0].saving_type, "Mandatory Saving");
        assert_eq!(rows[0].amount, "100000");
    }

    #[test]
    fn test_parse_csv_rows_missing_column() {
        let data = b"Amount,Cooperative Number\n100000,KOP-001\n";
        let err = parse_csv_rows(data).unwrap_err();
        assert!(err.contains("Saving Type"));
    }

    #[test]
    fn test_status_roundtrip() {
        for s in ["Pending", "Approved", "Rejected"] {
            assert_eq!(status_to_string(&string_to_status(s).unwrap()), s);
        }
        assert!(string_to_status("Posted").is_none());
    }
}
