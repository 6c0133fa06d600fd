//! `intake serve` -- HTTP JSON API for form retrieval and submission.
//!
//! Exposes loaded form schemas and accepts completed answer sets as an
//! async HTTP service using `axum` + `tokio`. Supports concurrent
//! request handling.
//!
//! Security features:
//! - Access token per form, from the serve config
//! - Per-origin+form submission rate limiting (default: 10 per minute)
//! - Optional admin key authentication via INTAKE_ADMIN_KEY env var
//! - CORS headers on all responses (permissive for local dev)
//!
//! Endpoints:
//! - GET  /health                        - Server status (exempt from auth)
//! - GET  /forms/{id}                    - Schema document with etag (form token)
//! - POST /forms/{id}/submissions        - Validate and store a submission
//! - GET  /admin/forms                   - Loaded form listing (admin key)
//! - GET  /admin/forms/{id}/submissions  - Stored submissions (admin key)
//!
//! All responses use Content-Type: application/json.

pub(crate) mod config;
mod handlers;
mod middleware;
mod state;

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{middleware as axum_middleware, Json, Router};
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};

use intake_storage::MemorySubmissionStore;

use self::config::ServeConfig;
use self::handlers::{
    handle_get_form, handle_health, handle_list_forms, handle_list_submissions, handle_not_found,
    handle_submit,
};
use self::middleware::admin_auth_middleware;
use self::state::{AppState, LoadedForm, RateLimiter};

/// Maximum request body size: 1 MB.
const MAX_BODY_SIZE: usize = 1024 * 1024;

/// Default submission limit per origin+form per window.
const DEFAULT_RATE_LIMIT: u64 = 10;

/// Rate limit window duration in seconds (1 minute).
pub(crate) const RATE_LIMIT_WINDOW_SECS: u64 = 60;

/// Construct a JSON error response with the given status code and message.
fn json_error(status: StatusCode, message: &str) -> impl IntoResponse {
    (status, Json(serde_json::json!({"error": message})))
}

/// Compute SHA-256 etag from the compact JSON representation of a form.
fn compute_etag(document: &serde_json::Value) -> String {
    let canonical = serde_json::to_string(document).unwrap_or_default();
    let hash = Sha256::digest(canonical.as_bytes());
    format!("{:x}", hash)
}

/// Start the HTTP server on the given port, pre-loading the configured
/// forms.
///
/// Invalid form files are reported and skipped rather than aborting
/// startup, so one bad document does not take every form offline.
pub(crate) async fn start_server(
    port: u16,
    config: ServeConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut forms = HashMap::new();

    for entry in &config.forms {
        let text = match std::fs::read_to_string(&entry.path) {
            Ok(t) => t,
            Err(e) => {
                eprintln!("Warning: failed to read {}: {}", entry.path.display(), e);
                continue;
            }
        };
        match intake_schema::load_str(&text) {
            Ok(schema) => {
                let document = serde_json::to_value(&schema)?;
                let etag = compute_etag(&document);
                eprintln!("Loaded form: {} (from {})", schema.id, entry.path.display());
                forms.insert(
                    schema.id.clone(),
                    LoadedForm {
                        schema,
                        token: entry.token.clone(),
                        active: entry.active,
                        etag,
                    },
                );
            }
            Err(e) => {
                eprintln!("Warning: failed to load {}: {}", entry.path.display(), e);
            }
        }
    }

    // Rate limit: from INTAKE_RATE_LIMIT env var, or default
    let rate_limit = std::env::var("INTAKE_RATE_LIMIT")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(DEFAULT_RATE_LIMIT);

    // Admin key: from INTAKE_ADMIN_KEY env var (None = no auth)
    let admin_key = std::env::var("INTAKE_ADMIN_KEY")
        .ok()
        .filter(|k| !k.is_empty());

    if admin_key.is_some() {
        eprintln!("Admin key authentication enabled");
    }
    eprintln!(
        "Rate limit: {} submissions per minute per origin+form",
        rate_limit
    );

    let state = Arc::new(AppState {
        forms: RwLock::new(forms),
        submissions: MemorySubmissionStore::new(),
        rate_limiter: RateLimiter::new(rate_limit),
        admin_key,
    });

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_origin(Any)
        .allow_headers(Any);

    let admin = Router::new()
        .route("/forms", get(handle_list_forms))
        .route("/forms/{id}/submissions", get(handle_list_submissions))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            admin_auth_middleware,
        ));

    let app = Router::new()
        .route("/health", get(handle_health))
        .route("/forms/{id}", get(handle_get_form))
        .route("/forms/{id}/submissions", post(handle_submit))
        .nest("/admin", admin)
        .fallback(handle_not_found)
        .layer(cors)
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .with_state(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    eprintln!("Intake submission API listening on http://0.0.0.0:{}", port);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    eprintln!("\nServer shut down.");
    Ok(())
}

/// Wait for a shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install Ctrl+C handler");
    eprintln!("\nReceived shutdown signal...");
}
