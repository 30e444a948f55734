use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use factura_core::IssuanceError;

/// Map a pipeline error onto an HTTP response.
///
/// Provider-side failures (authentication, transport, rejection) are all
/// 502: the client's request was fine, the upstream leg failed. A rejection
/// response additionally carries the authority's status so the caller can
/// fix the document.
pub fn issuance_error_to_response(err: IssuanceError) -> axum::response::Response {
    match err {
        IssuanceError::Validation(fields) => (
            StatusCode::BAD_REQUEST,
            axum::Json(json!({
                "error": "validation_error",
                "message": format!("validation failed ({} field error(s))", fields.len()),
                "fields": fields,
            })),
        )
            .into_response(),
        IssuanceError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        IssuanceError::NotFound(msg) => json_error(StatusCode::NOT_FOUND, "not_found", msg),
        IssuanceError::Authentication(e) => {
            json_error(StatusCode::BAD_GATEWAY, "provider_authentication", e.to_string())
        }
        IssuanceError::Transport(msg) => json_error(StatusCode::BAD_GATEWAY, "provider_transport", msg),
        IssuanceError::Rejected(rejection) => (
            StatusCode::BAD_GATEWAY,
            axum::Json(json!({
                "error": "provider_rejection",
                "message": rejection.status_message,
                "status_code": rejection.status_code,
                "detail": rejection.detail,
            })),
        )
            .into_response(),
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
