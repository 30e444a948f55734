use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::app::errors::json_error;

/// Header carrying the shared service key.
pub const API_KEY_HEADER: &str = "x-api-key";

#[derive(Clone)]
pub struct ApiKeyState {
    pub api_key: Arc<String>,
}

pub async fn api_key_middleware(
    State(state): State<ApiKeyState>,
    req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let provided = extract_api_key(req.headers())?;

    if provided != state.api_key.as_str() {
        return Err(json_error(
            StatusCode::UNAUTHORIZED,
            "invalid_api_key",
            "the provided API key is not valid",
        ));
    }

    Ok(next.run(req).await)
}

fn extract_api_key(headers: &HeaderMap) -> Result<&str, Response> {
    let header = headers.get(API_KEY_HEADER).ok_or_else(|| {
        json_error(
            StatusCode::UNAUTHORIZED,
            "missing_api_key",
            format!("the {API_KEY_HEADER} header is required"),
        )
    })?;

    let key = header
        .to_str()
        .map(str::trim)
        .unwrap_or_default();
    if key.is_empty() {
        return Err(json_error(
            StatusCode::UNAUTHORIZED,
            "missing_api_key",
            format!("the {API_KEY_HEADER} header is required"),
        ));
    }

    Ok(key)
}
