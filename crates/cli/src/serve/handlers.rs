//! HTTP route handlers: health, form retrieval, submission, admin listings.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{ConnectInfo, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use intake_engine::{answers_from_json, answers_to_json, validate_all};
use intake_schema::visible_fields;
use intake_storage::{SubmissionRecord, SubmissionStore};

use super::json_error;
use super::state::AppState;

/// Fallback handler for unmatched routes.
pub(crate) async fn handle_not_found() -> impl IntoResponse {
    json_error(StatusCode::NOT_FOUND, "not found")
}

/// GET /health
pub(crate) async fn handle_health() -> impl IntoResponse {
    let response = serde_json::json!({
        "status": "ok",
        "schema_version": intake_schema::FORM_SCHEMA_VERSION,
    });
    (StatusCode::OK, Json(response))
}

/// GET /forms/{id}
///
/// The schema document for an access link, wrapped with its etag so
/// clients can cache. Requires the form's access token via
/// `X-Access-Token` or `?token=`.
pub(crate) async fn handle_get_form(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let forms = state.forms.read().await;
    let form = match forms.get(&id) {
        Some(f) => f,
        None => {
            return json_error(StatusCode::NOT_FOUND, &format!("form '{}' not found", id))
                .into_response()
        }
    };
    if !form.active {
        return json_error(StatusCode::GONE, "this form has been deactivated").into_response();
    }
    match presented_token(&headers, &params) {
        Some(token) if token == form.token => {}
        _ => {
            return json_error(StatusCode::UNAUTHORIZED, "missing or invalid access token")
                .into_response()
        }
    }

    let response = serde_json::json!({
        "form": form.schema,
        "etag": form.etag,
    });
    (StatusCode::OK, Json(response)).into_response()
}

fn presented_token<'a>(
    headers: &'a HeaderMap,
    params: &'a HashMap<String, String>,
) -> Option<&'a str> {
    headers
        .get("x-access-token")
        .and_then(|v| v.to_str().ok())
        .or_else(|| params.get("token").map(String::as_str))
}

#[derive(Deserialize)]
pub(crate) struct SubmitRequest {
    token: String,
    answers: serde_json::Value,
}

/// POST /forms/{id}/submissions
///
/// Rejection order: unknown form (404), deactivated (410), bad token
/// (401), rate limited (429), invalid answers (400). Success stores a
/// record and returns 201 with its id.
pub(crate) async fn handle_submit(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<std::net::SocketAddr>,
    Path(id): Path<String>,
    Json(request): Json<SubmitRequest>,
) -> impl IntoResponse {
    let forms = state.forms.read().await;
    let form = match forms.get(&id) {
        Some(f) => f,
        None => {
            return json_error(StatusCode::NOT_FOUND, &format!("form '{}' not found", id))
                .into_response()
        }
    };
    if !form.active {
        return json_error(StatusCode::GONE, "this form has been deactivated").into_response();
    }
    if request.token != form.token {
        return json_error(StatusCode::UNAUTHORIZED, "invalid access token").into_response();
    }

    if let Err(retry_after) = state.rate_limiter.check(addr.ip(), &id).await {
        let body = serde_json::json!({
            "error": "rate limit exceeded",
            "retry_after": retry_after,
        });
        return (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
    }

    // Re-validate server side with the same rules the engine applies,
    // over the fields visible under the submitted answers.
    let answers = answers_from_json(&form.schema, &request.answers);
    let visible = visible_fields(&form.schema, &answers);
    let errors = validate_all(&visible, &answers);
    if !errors.is_empty() {
        let fields: serde_json::Map<String, serde_json::Value> = errors
            .iter()
            .map(|e| (e.field_id.clone(), serde_json::Value::String(e.message.clone())))
            .collect();
        let body = serde_json::json!({
            "error": "validation failed",
            "fields": fields,
        });
        return (StatusCode::BAD_REQUEST, Json(body)).into_response();
    }

    let record = SubmissionRecord {
        record_id: new_record_id(),
        form_id: id.clone(),
        answers: answers_to_json(&answers),
        submitted_at: time::OffsetDateTime::now_utc(),
    };
    let record_id = record.record_id.clone();
    if let Err(e) = state.submissions.append(record).await {
        return json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            &format!("failed to store submission: {}", e),
        )
        .into_response();
    }

    (
        StatusCode::CREATED,
        Json(serde_json::json!({"record_id": record_id})),
    )
        .into_response()
}

fn new_record_id() -> String {
    format!("rec_{:016x}", rand::random::<u64>())
}

/// GET /admin/forms
pub(crate) async fn handle_list_forms(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let forms = state.forms.read().await;
    let list: Vec<serde_json::Value> = forms
        .iter()
        .map(|(id, form)| {
            serde_json::json!({
                "id": id,
                "title": form.schema.title,
                "version": form.schema.version,
                "sections": form.schema.sections.len(),
                "fields": form.schema.field_count(),
                "active": form.active,
                "etag": form.etag,
            })
        })
        .collect();
    (StatusCode::OK, Json(serde_json::json!({"forms": list})))
}

/// GET /admin/forms/{id}/submissions
pub(crate) async fn handle_list_submissions(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    {
        let forms = state.forms.read().await;
        if !forms.contains_key(&id) {
            return json_error(StatusCode::NOT_FOUND, &format!("form '{}' not found", id))
                .into_response();
        }
    }
    match state.submissions.list(&id).await {
        Ok(records) => (
            StatusCode::OK,
            Json(serde_json::json!({"submissions": records})),
        )
            .into_response(),
        Err(e) => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            &format!("failed to read submissions: {}", e),
        )
        .into_response(),
    }
}
