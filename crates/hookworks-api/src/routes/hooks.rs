//! The webhook endpoint: turns push events into queued build jobs.

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::AppState;
use crate::error::ApiError;
use hookworks_core::{BuildJob, PushEvent};

pub fn router() -> Router<AppState> {
    Router::new().route("/hook", post(hook))
}

/// Handle a webhook delivery from the Git provider.
async fn hook(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Some(event_type) = headers.get("X-GitHub-Event").and_then(|v| v.to_str().ok()) else {
        info!("Received a non-hook request");
        return Ok((
            StatusCode::FORBIDDEN,
            Json(json!({ "status": "not a hook" })),
        ));
    };

    match event_type {
        "ping" => Ok((StatusCode::OK, Json(json!({ "status": "pong" })))),
        "push" => {
            let event = PushEvent::from_github_payload(&payload)
                .ok_or_else(|| ApiError::BadRequest("malformed push payload".to_string()))?;

            if !state.settings.owner_allowed(&event.owner) {
                warn!(owner = %event.owner, "Push from owner outside the allowlist");
                return Err(ApiError::Forbidden(format!(
                    "owner not allowed: {}",
                    event.owner
                )));
            }

            let job = BuildJob::new(event.job_name(), event.clone_url.clone())?;
            info!(name = %job.name, "Queueing build");
            state
                .jobs
                .submit(job)
                .map_err(|e| ApiError::Internal(e.to_string()))?;

            Ok((StatusCode::OK, Json(json!({ "status": "handled" }))))
        }
        other => {
            info!(event = %other, "Unhandled event type");
            Ok((
                StatusCode::NOT_IMPLEMENTED,
                Json(json!({ "status": "unhandled event", "event": other })),
            ))
        }
    }
}
