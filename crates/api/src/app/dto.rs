//! Response JSON mapping helpers.

use serde::Deserialize;
use serde_json::{json, Value};

use factura_invoicing::InvoiceRecord;
use factura_issuance::InvoiceResult;

#[derive(Debug, Deserialize)]
pub struct ResendRequest {
    #[serde(default)]
    pub email: Option<String>,
}

pub fn record_to_json(record: &InvoiceRecord) -> Value {
    json!({
        "id": record.id.to_string(),
        "order_code": record.order_code,
        "status": record.status,
        "provider_invoice_id": record.provider_document_id(),
        "provider_invoice_number": record.provider_document_number(),
        "cufe": record.cufe,
        "pdf_url": record.pdf_url,
        "xml_url": record.xml_url,
        "issued_at": record.issued_at,
        "error": record.last_error,
        "created_at": record.created_at,
    })
}

pub fn invoice_result_to_json(result: &InvoiceResult) -> Value {
    let mut body = record_to_json(&result.record);
    if let Value::Object(map) = &mut body {
        map.insert("message".to_string(), json!(result.message));
    }
    body
}
