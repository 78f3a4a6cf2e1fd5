//! API route definitions.

use axum::{
    Json, Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

use crate::{AppState, middleware::auth::auth_middleware};
use arta_shared::PageRequest;

pub mod accounts;
pub mod health;
pub mod journals;
pub mod loan_types;
pub mod loans;
pub mod members;
pub mod products;
pub mod saving_types;
pub mod savings;

/// Creates the API router with protected routes that need state for middleware.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    // Protected routes that require authentication
    let protected_routes = Router::new()
        .merge(savings::routes())
        .merge(loans::routes())
        .merge(members::routes())
        .merge(journals::routes())
        .merge(accounts::routes())
        .merge(saving_types::routes())
        .merge(loan_types::routes())
        .merge(products::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Combine public and protected routes
    Router::new().merge(health::routes()).merge(protected_routes)
}

/// Builds a page request from optional query parameters, clamped to sane
/// bounds.
pub(crate) fn page_request(page: Option<u32>, limit: Option<u32>) -> PageRequest {
    let mut request = PageRequest::default();
    if let Some(page) = page {
        request.page = page.max(1);
    }
    if let Some(limit) = limit {
        request.per_page = limit.clamp(1, 100);
    }
    request
}

/// Standard 404 response body.
pub(crate) fn not_found(message: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "not_found", "message": message })),
    )
        .into_response()
}

/// Logs the error and returns an opaque 500 response.
pub(crate) fn internal_error(e: &dyn std::fmt::Display, context: &str) -> Response {
    error!(error = %e, "{context}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "internal_error",
            "message": "An error occurred"
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_clamps() {
        let page = page_request(Some(0), Some(1000));
        assert_eq!(page.page, 1);
        assert_eq!(page.per_page, 100);

        let page = page_request(None, None);
        assert_eq!(page.page, 1);
        assert_eq!(page.per_page, 20);
    }
}
