//! HTTP middleware: admin key authentication for the /admin routes.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use super::state::AppState;

/// Admin authentication middleware.
///
/// If `INTAKE_ADMIN_KEY` is set, requests under /admin must include
/// either `Authorization: Bearer <key>` or `X-Admin-Key: <key>`.
pub(crate) async fn admin_auth_middleware(
    State(state): State<Arc<AppState>>,
    request: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let expected_key = match &state.admin_key {
        Some(k) => k,
        None => return next.run(request).await, // No auth configured
    };

    // Check Authorization: Bearer <key>
    let auth_header = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok());

    if let Some(auth) = auth_header {
        if let Some(token) = auth.strip_prefix("Bearer ") {
            if token == expected_key {
                return next.run(request).await;
            }
            return super::json_error(StatusCode::FORBIDDEN, "invalid admin key").into_response();
        }
    }

    // Check X-Admin-Key header
    let admin_key_header = request
        .headers()
        .get("x-admin-key")
        .and_then(|v| v.to_str().ok());

    if let Some(key) = admin_key_header {
        if key == expected_key {
            return next.run(request).await;
        }
        return super::json_error(StatusCode::FORBIDDEN, "invalid admin key").into_response();
    }

    super::json_error(StatusCode::UNAUTHORIZED, "authentication required").into_response()
}
