//! Serves the in-memory backend over real HTTP for transport tests.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method as HttpMethod, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::{json, Value};

use dhadak_admin::backend::{ApiRequest, Backend, MemoryBackend, Method};
use dhadak_admin::error::AppError;

/// Bind to an ephemeral port and return the origin, e.g. `http://127.0.0.1:53121`
pub async fn spawn(backend: MemoryBackend) -> String {
    let app = Router::new().fallback(handle).with_state(backend);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test server");
    let addr = listener.local_addr().expect("Failed to read test server address");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Test server failed");
    });

    format!("http://{}", addr)
}

async fn handle(
    State(backend): State<MemoryBackend>,
    method: HttpMethod,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let method = match method {
        HttpMethod::GET => Method::Get,
        HttpMethod::POST => Method::Post,
        HttpMethod::PUT => Method::Put,
        HttpMethod::DELETE => Method::Delete,
        _ => return StatusCode::METHOD_NOT_ALLOWED.into_response(),
    };

    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string);

    let body = if body.is_empty() {
        None
    } else {
        match serde_json::from_slice::<Value>(&body) {
            Ok(value) => Some(value),
            Err(_) => {
                return error_response(422, json!([{ "loc": ["body"], "msg": "JSON decode error" }]))
            }
        }
    };

    let request = ApiRequest {
        method,
        path: uri.path().to_string(),
        body,
        token,
    };

    match backend.send(request).await {
        Ok(value) => Json(value).into_response(),
        Err(AppError::Rejected { status: 422, detail }) => {
            error_response(422, validation_detail(detail.as_deref().unwrap_or_default()))
        }
        Err(AppError::Rejected { status, detail }) => error_response(status, json!(detail)),
        Err(err) => error_response(500, json!(err.to_string())),
    }
}

/// Re-shape `"field: msg"` into the list form schema validators send
fn validation_detail(detail: &str) -> Value {
    match detail.split_once(": ") {
        Some((field, msg)) => json!([{ "loc": ["body", field], "msg": msg, "type": "missing" }]),
        None => json!([{ "loc": ["body"], "msg": detail }]),
    }
}

fn error_response(status: u16, detail: Value) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(json!({ "detail": detail }))).into_response()
}
