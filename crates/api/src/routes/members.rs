//! Member management routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::{
    AppState,
    middleware::auth::{AuthUser, require},
    routes::{internal_error, not_found, page_request},
};
use arta_db::{
    MemberRepository,
    entities::sea_orm_active_enums,
    repositories::member::{CreateMemberInput, MemberError, UpdateMemberInput},
};
use arta_shared::PageResponse;

/// Creates the member routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/members", get(list_members))
        .route("/members", post(create_member))
        .route("/members/{id}", get(get_member))
        .route("/members/{id}", put(update_member))
        .route("/members/{id}/status", put(update_status))
}

/// Query parameters for listing members.
#[derive(Debug, Deserialize)]
pub struct ListMembersQuery {
    /// Member name search.
    pub search: Option<String>,
    /// Filter by status.
    pub status: Option<String>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Page size.
    pub limit: Option<u32>,
}

/// Request body for registering a member.
#[derive(Debug, Deserialize)]
pub struct CreateMemberRequest {
    /// Cooperative number (must be unique).
    pub cooperative_number: String,
    /// Full name.
    pub name: String,
    /// Email address.
    pub email: Option<String>,
    /// Phone number.
    pub phone: Option<String>,
    /// Join date (YYYY-MM-DD); today when absent.
    pub joined_at: Option<NaiveDate>,
}

/// Request body for updating a member profile.
#[derive(Debug, Deserialize)]
pub struct UpdateMemberRequest {
    /// New name.
    pub name: Option<String>,
    /// New email.
    pub email: Option<String>,
    /// New phone.
    pub phone: Option<String>,
}

/// Request body for a member status update.
#[derive(Debug, Deserialize)]
pub struct UpdateMemberStatusRequest {
    /// Requested status: Pending, Active, Rejected, or Resigned.
    pub status: String,
}

/// GET `/members` - List members with search and status filter.
async fn list_members(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListMembersQuery>,
) -> Response {
    if let Err(response) = require(&auth, "members:view") {
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

    let repo = MemberRepository::new((*state.db).clone());
    let page = page_request(query.page, query.limit);

    match repo.list(query.search.as_deref(), status, &page).await {
        Ok((rows, total)) => {
            let response = PageResponse::new(rows, page.page, page.per_page, total);
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => internal_error(&e, "Failed to list members"),
    }
}

/// GET `/members/{id}` - Get one member.
async fn get_member(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Response {
    if let Err(response) = require(&auth, "members:view") {
        return response;
    }

    let repo = MemberRepository::new((*state.db).clone());

    match repo.find_by_id(id).await {
        Ok(member) => (StatusCode::OK, Json(member)).into_response(),
        Err(MemberError::NotFound(_)) => not_found("Member not found"),
        Err(e) => internal_error(&e, "Failed to get member"),
    }
}

/// POST `/members` - Register a member (status starts Pending).
async fn create_member(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateMemberRequest>,
) -> Response {
    if let Err(response) = require(&auth, "members:manage") {
        return response;
    }

    if payload.cooperative_number.trim().is_empty() || payload.name.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "missing_fields",
                "message": "Cooperative number and name are required"
            })),
        )
            .into_response();
    }

    let repo = MemberRepository::new((*state.db).clone());

    let input = CreateMemberInput {
        cooperative_number: payload.cooperative_number,
        name: payload.name,
        email: payload.email,
        phone: payload.phone,
        joined_at: payload.joined_at,
    };

    match repo.create(input).await {
        Ok(member) => {
            info!(member_id = %member.id, "Member registered");
            (StatusCode::CREATED, Json(member)).into_response()
        }
        Err(e @ MemberError::DuplicateNumber(_)) => (
            StatusCode::CONFLICT,
            Json(json!({ "error": "duplicate_number", "message": e.to_string() })),
        )
            .into_response(),
        Err(e) => internal_error(&e, "Failed to register member"),
    }
}

/// PUT `/members/{id}` - Update a member profile.
async fn update_member(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateMemberRequest>,
) -> Response {
    if let Err(response) = require(&auth, "members:manage") {
        return response;
    }

    let repo = MemberRepository::new((*state.db).clone());

    let input = UpdateMemberInput {
        name: payload.name,
        email: payload.email,
        phone: payload.phone,
    };

    match repo.update(id, input).await {
        Ok(member) => (StatusCode::OK, Json(member)).into_response(),
        Err(MemberError::NotFound(_)) => not_found("Member not found"),
        Err(e) => internal_error(&e, "Failed to update member"),
    }
}

/// PUT `/members/{id}/status` - Update membership status.
async fn update_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateMemberStatusRequest>,
) -> Response {
    if let Err(response) = require(&auth, "members:manage") {
        return response;
    }

    let Some(status) = string_to_status(&payload.status) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_status",
                "message": format!("Invalid status: {}", payload.status)
            })),
        )
            .into_response();
    };

    let repo = MemberRepository::new((*state.db).clone());

    match repo.update_status(id, status).await {
        Ok(member) => {
            info!(member_id = %id, status = %payload.status, "Member status updated");
            (StatusCode::OK, Json(member)).into_response()
        }
        Err(MemberError::NotFound(_)) => not_found("Member not found"),
        Err(e) => internal_error(&e, "Failed to update member status"),
    }
}

fn string_to_status(s: &str) -> Option<sea_orm_active_enums::MemberStatus> {
    match s {
        "Pending" => Some(sea_orm_active_enums::MemberStatus::Pending),
        "Active" => Some(sea_orm_active_enums::MemberStatus::Active),
        "Rejected" => Some(sea_orm_active_enums::MemberStatus::Rejected),
        "Resigned" => Some(sea_orm_active_enums::MemberStatus::Resigned),
        _ => None,
    }
}
