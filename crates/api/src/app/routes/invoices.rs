use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use factura_core::InvoiceId;
use factura_invoicing::InvoiceRequest;
use factura_issuance::IssuanceService;

use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_invoice))
        .route("/by-order-code/:order_code", get(get_by_order_code))
        .route("/:id/status", get(get_status))
        .route("/:id/resend", post(resend))
}

pub async fn create_invoice(
    Extension(service): Extension<Arc<IssuanceService>>,
    Json(body): Json<InvoiceRequest>,
) -> axum::response::Response {
    match service.create_invoice(body).await {
        Ok(result) => {
            (StatusCode::CREATED, Json(dto::invoice_result_to_json(&result))).into_response()
        }
        Err(e) => errors::issuance_error_to_response(e),
    }
}

pub async fn get_by_order_code(
    Extension(service): Extension<Arc<IssuanceService>>,
    Path(order_code): Path<String>,
) -> axum::response::Response {
    match service.find_by_order_code(&order_code) {
        Ok(record) => Json(dto::record_to_json(&record)).into_response(),
        Err(e) => errors::issuance_error_to_response(e),
    }
}

pub async fn get_status(
    Extension(service): Extension<Arc<IssuanceService>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: InvoiceId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid invoice id"),
    };

    match service.get_status(id).await {
        Ok(record) => Json(dto::record_to_json(&record)).into_response(),
        Err(e) => errors::issuance_error_to_response(e),
    }
}

pub async fn resend(
    Extension(service): Extension<Arc<IssuanceService>>,
    Path(id): Path<String>,
    body: Option<Json<dto::ResendRequest>>,
) -> axum::response::Response {
    let id: InvoiceId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid invoice id"),
    };
    let email = body.as_ref().and_then(|Json(b)| b.email.as_deref());

    match service.resend(id, email).await {
        Ok(record) => Json(dto::record_to_json(&record)).into_response(),
        Err(e) => errors::issuance_error_to_response(e),
    }
}
