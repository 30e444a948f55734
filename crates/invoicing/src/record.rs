//! Invoice lifecycle record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use factura_core::InvoiceId;

/// Lifecycle status of an issuance attempt.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Pending,
    Processing,
    Issued,
    Rejected,
    Cancelled,
}

/// One issuance attempt for an order.
///
/// Created `Processing` when an attempt starts; moves to `Issued` on
/// provider acceptance or `Rejected` on failure. Once `Issued` it is never
/// overwritten; a new attempt for the same order code is a conflict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    pub id: InvoiceId,
    pub order_code: String,
    pub prefix: String,
    pub document_number: String,
    pub status: InvoiceStatus,
    /// Unique fiscal document key (CUFE) returned on acceptance.
    pub cufe: Option<String>,
    pub pdf_url: Option<String>,
    pub xml_url: Option<String>,
    pub issued_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl InvoiceRecord {
    /// Fresh record for an attempt that is about to contact the provider.
    pub fn processing(order_code: &str, prefix: &str, document_number: &str) -> Self {
        Self {
            id: InvoiceId::new(),
            order_code: order_code.to_string(),
            prefix: prefix.to_string(),
            document_number: document_number.to_string(),
            status: InvoiceStatus::Processing,
            cufe: None,
            pdf_url: None,
            xml_url: None,
            issued_at: None,
            last_error: None,
            created_at: Utc::now(),
        }
    }

    /// Provider-side document id, e.g. `SETP-990000001`.
    pub fn provider_document_id(&self) -> String {
        format!("{}-{}", self.prefix, self.document_number)
    }

    /// Concatenated document number, e.g. `SETP990000001`.
    pub fn provider_document_number(&self) -> String {
        format!("{}{}", self.prefix, self.document_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn processing_record_starts_clean() {
        let record = InvoiceRecord::processing("ORD-1", "SETP", "990000001");
        assert_eq!(record.status, InvoiceStatus::Processing);
        assert!(record.cufe.is_none());
        assert!(record.issued_at.is_none());
        assert_eq!(record.provider_document_id(), "SETP-990000001");
        assert_eq!(record.provider_document_number(), "SETP990000001");
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(InvoiceStatus::Issued).unwrap(),
            serde_json::json!("issued")
        );
    }
}
