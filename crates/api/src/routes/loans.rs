//! Loan management routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
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
use arta_core::posting::LoanStatus;
use arta_db::{
    LoanRepository,
    entities::{loan_installments, sea_orm_active_enums},
    repositories::loan::{CreateLoanInput, LoanError, LoanWithDetails},
};
use arta_shared::PageResponse;

/// Creates the loan routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/loans", get(list_loans))
        .route("/loans", post(create_loan))
        .route("/loans/payment", post(record_payment))
        .route("/loans/member/{member_id}", get(list_member_loans))
        .route("/loans/{id}/details", get(get_loan_details))
        .route("/loans/{id}/status", put(update_status))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing loans.
#[derive(Debug, Deserialize)]
pub struct ListLoansQuery {
    /// Filter by status.
    pub status: Option<String>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Page size.
    pub limit: Option<u32>,
}

/// Request body for a loan application.
#[derive(Debug, Deserialize)]
pub struct CreateLoanRequest {
    /// Member ID.
    pub member_id: Uuid,
    /// Loan type ID.
    pub loan_type_id: Uuid,
    /// Principal amount.
    pub amount: Decimal,
    /// Tenor in months.
    pub tenor_months: u32,
    /// Stated purpose.
    pub purpose: Option<String>,
}

/// Request body for a loan status update.
#[derive(Debug, Deserialize)]
pub struct UpdateLoanStatusRequest {
    /// Requested status.
    pub status: String,
}

/// Request body for an installment payment.
#[derive(Debug, Deserialize)]
pub struct RecordPaymentRequest {
    /// Loan ID.
    pub loan_id: Uuid,
    /// Installment number to settle.
    pub installment_number: u32,
}

/// Response for a loan.
#[derive(Debug, Serialize)]
pub struct LoanResponse {
    /// Loan ID.
    pub id: Uuid,
    /// Member ID.
    pub member_id: Uuid,
    /// Loan type ID.
    pub loan_type_id: Uuid,
    /// Member name.
    pub member_name: String,
    /// Member cooperative number.
    pub cooperative_number: String,
    /// Loan type name.
    pub loan_type_name: String,
    /// Principal amount.
    pub amount: String,
    /// Tenor in months.
    pub tenor_months: i32,
    /// Stated purpose.
    pub purpose: Option<String>,
    /// Status.
    pub status: String,
    /// Linked disbursement journal, once approved.
    pub journal_id: Option<Uuid>,
}

impl From<LoanWithDetails> for LoanResponse {
    fn from(details: LoanWithDetails) -> Self {
        let loan = details.loan;
        Self {
            id: loan.id,
            member_id: loan.member_id,
            loan_type_id: loan.loan_type_id,
            member_name: details.member_name,
            cooperative_number: details.cooperative_number,
            loan_type_name: details.loan_type_name,
            amount: loan.amount.to_string(),
            tenor_months: loan.tenor_months,
            purpose: loan.purpose,
            status: status_to_string(&loan.status).to_string(),
            journal_id: loan.journal_id,
        }
    }
}

/// Response for one installment.
#[derive(Debug, Serialize)]
pub struct InstallmentResponse {
    /// 1-indexed installment number.
    pub installment_number: i32,
    /// Due date.
    pub due_date: String,
    /// Principal component.
    pub principal: String,
    /// Interest component.
    pub interest: String,
    /// Total due.
    pub total: String,
    /// Payment date, once paid.
    pub paid_at: Option<String>,
}

impl From<loan_installments::Model> for InstallmentResponse {
    fn from(m: loan_installments::Model) -> Self {
        Self {
            installment_number: m.installment_number,
            due_date: m.due_date.to_string(),
            principal: m.principal.to_string(),
            interest: m.interest.to_string(),
            total: m.total.to_string(),
            paid_at: m.paid_at.map(|d| d.to_string()),
        }
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/loans` - List loans with optional status filter.
async fn list_loans(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListLoansQuery>,
) -> Response {
    if let Err(response) = require(&auth, "loans:view") {
        return response;
    }

    let status = match query.status.as_deref() {
        Some(s) => match string_to_status(s) {
            Some(status) => Some(status),
            None => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": "invalid_status",
                        "message": format!("Invalid status: {s}")
                    })),
                )
                    .into_response();
            }
        },
        None => None,
    };

    let repo = LoanRepository::new((*state.db).clone());
    let page = page_request(query.page, query.limit);

    match repo.list(status, &page).await {
        Ok((rows, total)) => {
            let items: Vec<LoanResponse> = rows.into_iter().map(Into::into).collect();
            let response = PageResponse::new(items, page.page, page.per_page, total);
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => internal_error(&e, "Failed to list loans"),
    }
}

/// GET `/loans/member/{member_id}` - List one member's loans.
async fn list_member_loans(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(member_id): Path<Uuid>,
) -> Response {
    if let Err(response) = require(&auth, "loans:view") {
        return response;
    }

    let repo = LoanRepository::new((*state.db).clone());

    match repo.list_by_member(member_id).await {
        Ok(loans) => (StatusCode::OK, Json(loans)).into_response(),
        Err(e) => internal_error(&e, "Failed to list member loans"),
    }
}

/// POST `/loans` - Submit a loan application.
async fn create_loan(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateLoanRequest>,
) -> Response {
    if let Err(response) = require(&auth, "loans:apply") {
        return response;
    }

    if payload.amount <= Decimal::ZERO || payload.tenor_months == 0 {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_application",
                "message": "Amount must be positive and tenor at least one month"
            })),
        )
            .into_response();
    }

    let repo = LoanRepository::new((*state.db).clone());

    let input = CreateLoanInput {
        member_id: payload.member_id,
        loan_type_id: payload.loan_type_id,
        amount: payload.amount,
        tenor_months: payload.tenor_months,
        purpose: payload.purpose,
    };

    match repo.create(input).await {
        Ok(loan) => {
            info!(loan_id = %loan.id, "Loan application created");
            (StatusCode::CREATED, Json(loan)).into_response()
        }
        Err(e @ (LoanError::MemberNotFound(_) | LoanError::TypeNotFound(_))) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid_reference", "message": e.to_string() })),
        )
            .into_response(),
        Err(e) => internal_error(&e, "Failed to create loan"),
    }
}

/// GET `/loans/{id}/details` - Loan with its installment schedule.
async fn get_loan_details(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Response {
    if let Err(response) = require(&auth, "loans:view") {
        return response;
    }

    let repo = LoanRepository::new((*state.db).clone());

    match repo.get_details(id).await {
        Ok(details) => {
            let loan = LoanResponse::from(details.loan);
            let installments: Vec<InstallmentResponse> =
                details.installments.into_iter().map(Into::into).collect();
            (
                StatusCode::OK,
                Json(json!({ "loan": loan, "installments": installments })),
            )
                .into_response()
        }
        Err(LoanError::NotFound(_)) => not_found("Loan not found"),
        Err(e) => internal_error(&e, "Failed to get loan details"),
    }
}

/// PUT `/loans/{id}/status` - Move a loan through its review stages.
///
/// The transition into Approved disburses the loan: it posts the journal
/// entry and generates the installment schedule atomically.
async fn update_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateLoanStatusRequest>,
) -> Response {
    let Some(new_status) = LoanStatus::parse(&payload.status) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_status",
                "message": format!("Invalid status: {}", payload.status)
            })),
        )
            .into_response();
    };

    // Final approval is the manager's call; earlier stages belong to
    // accounting.
    let permission = if new_status == LoanStatus::Approved {
        "loans:approve-manager"
    } else {
        "loans:approve-accounting"
    };
    if let Err(response) = require(&auth, permission) {
        return response;
    }

    let repo = LoanRepository::new((*state.db).clone());

    match repo
        .update_status(id, new_status, &state.ledger.cash_account_number)
        .await
    {
        Ok(loan) => {
            info!(
                loan_id = %id,
                status = new_status.as_str(),
                journal_id = ?loan.journal_id,
                "Loan status updated"
            );
            (
                StatusCode::OK,
                Json(json!({
                    "id": loan.id,
                    "status": status_to_string(&loan.status),
                    "journal_id": loan.journal_id,
                })),
            )
                .into_response()
        }
        Err(LoanError::NotFound(_)) => not_found("Loan not found"),
        Err(
            e @ (LoanError::InvalidTransition { .. }
            | LoanError::UnmappedAccount { .. }
            | LoanError::MissingCashAccount { .. }),
        ) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "posting_precondition", "message": e.to_string() })),
        )
            .into_response(),
        Err(e) => internal_error(&e, "Failed to update loan status"),
    }
}

/// POST `/loans/payment` - Record one installment payment.
async fn record_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<RecordPaymentRequest>,
) -> Response {
    if let Err(response) = require(&auth, "loans:approve-accounting") {
        return response;
    }

    let repo = LoanRepository::new((*state.db).clone());

    match repo
        .record_installment_payment(
            payload.loan_id,
            payload.installment_number,
            &state.ledger.cash_account_number,
        )
        .await
    {
        Ok(outcome) => {
            info!(
                loan_id = %payload.loan_id,
                installment = payload.installment_number,
                loan_status = outcome.loan_status.as_str(),
                "Installment payment recorded"
            );
            (
                StatusCode::OK,
                Json(json!({
                    "message": format!(
                        "Installment {} recorded",
                        payload.installment_number
                    ),
                    "loan_status": outcome.loan_status.as_str(),
                    "paid_at": outcome.installment.paid_at.map(|d| d.to_string()),
                })),
            )
                .into_response()
        }
        Err(e @ (LoanError::NotFound(_) | LoanError::InstallmentNotFound { .. })) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "not_found", "message": e.to_string() })),
        )
            .into_response(),
        Err(
            e @ (LoanError::UnmappedAccount { .. } | LoanError::MissingCashAccount { .. }),
        ) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "posting_precondition", "message": e.to_string() })),
        )
            .into_response(),
        Err(e) => internal_error(&e, "Failed to record installment payment"),
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn status_to_string(status: &sea_orm_active_enums::LoanStatus) -> &'static str {
    match status {
        sea_orm_active_enums::LoanStatus::Pending => "Pending",
        sea_orm_active_enums::LoanStatus::AccountingApproved => "AccountingApproved",
        sea_orm_active_enums::LoanStatus::Approved => "Approved",
        sea_orm_active_enums::LoanStatus::PaidOff => "PaidOff",
        sea_orm_active_enums::LoanStatus::Rejected => "Rejected",
    }
}

fn string_to_status(s: &str) -> Option<sea_orm_active_enums::LoanStatus> {
    match s {
        "Pending" => Some(sea_orm_active_enums::LoanStatus::Pending),
        "AccountingApproved" => Some(sea_orm_active_enums::LoanStatus::AccountingApproved),
        "Approved" => Some(sea_orm_active_enums::LoanStatus::Approved),
        "PaidOff" => Some(sea_orm_active_enums::LoanStatus::PaidOff),
        "Rejected" => Some(sea_orm_active_enums::LoanStatus::Rejected),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip() {
        for s in [
            "Pending",
            "AccountingApproved",
            "Approved",
            "PaidOff",
            "Rejected",
        ] {
            assert_eq!(status_to_string(&string_to_status(s).unwrap()), s);
        }
        assert!(string_to_status("Lunas").is_none());
    }
}
