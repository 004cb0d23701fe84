use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;
use serde_json::Value;

use crate::ai::StoryAI;
use crate::error::AIError;
use crate::game_state::GameState;

// Per-process state: one immutable generation client, or none when the
// credential was absent at startup.
#[derive(Clone, Default)]
pub struct AppState {
    pub ai: Option<Arc<StoryAI>>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/story", post(next_scene))
        .layer(middleware::from_fn(cors_middleware))
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<&'static str>,
}

impl ErrorBody {
    fn bare(error: &'static str) -> Self {
        ErrorBody {
            error,
            detail: None,
            hint: None,
        }
    }
}

// Lenient by design: a body that fails to decode is an empty state rather
// than a request error, and a body that decodes to a JSON string (some
// platforms double-encode) is decoded a second time.
pub fn decode_request_body(raw: &str) -> Value {
    let mut body: Value = serde_json::from_str(raw).unwrap_or(Value::Null);
    if let Value::String(inner) = &body {
        body = serde_json::from_str(inner).unwrap_or(Value::Null);
    }
    body
}

async fn next_scene(State(state): State<AppState>, raw_body: String) -> Response {
    let Some(ai) = state.ai.as_ref() else {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody::bare("Missing GEMINI_API_KEY")),
        )
            .into_response();
    };

    let body = decode_request_body(&raw_body);
    let game_state = GameState::from_value(body.get("state").cloned().unwrap_or(Value::Null));
    let picked = body
        .get("picked")
        .and_then(Value::as_str)
        .map(str::to_string);

    match ai.next_scene(&game_state, picked.as_deref()).await {
        Ok(scene) => (StatusCode::OK, Json(scene)).into_response(),
        Err(err @ AIError::Exhausted { .. }) => (
            StatusCode::BAD_GATEWAY,
            Json(ErrorBody {
                error: "Story generation failed after retries",
                detail: Some(err.to_string()),
                hint: Some("Temporary issue. Try again."),
            }),
        )
            .into_response(),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody {
                error: "Story generation failed",
                detail: Some(err.to_string()),
                hint: Some("Non-retryable error (check API key / request size)."),
            }),
        )
            .into_response(),
    }
}

async fn cors_middleware(request: Request, next: Next) -> Response {
    let origin = request.headers().get(header::ORIGIN).cloned();

    if request.method() == Method::OPTIONS {
        let mut response = StatusCode::NO_CONTENT.into_response();
        apply_cors_headers(response.headers_mut(), origin.as_ref());
        return response;
    }

    let mut response = next.run(request).await;
    apply_cors_headers(response.headers_mut(), origin.as_ref());
    response
}

// Reflect the caller's origin when one is present; some contexts (file://)
// send none and get the wildcard.
fn apply_cors_headers(headers: &mut HeaderMap, origin: Option<&HeaderValue>) {
    match origin {
        Some(origin) => {
            headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
            headers.insert(header::VARY, HeaderValue::from_static("Origin"));
        }
        None => {
            headers.insert(
                header::ACCESS_CONTROL_ALLOW_ORIGIN,
                HeaderValue::from_static("*"),
            );
        }
    }
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("POST, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    headers.insert(
        header::ACCESS_CONTROL_MAX_AGE,
        HeaderValue::from_static("86400"),
    );
}
