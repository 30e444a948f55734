//! Provider response shapes.
//!
//! The provider mixes snake_case and PascalCase keys; renames below follow
//! its contract, not our conventions.

use serde::Deserialize;

use factura_core::ProviderRejection;

/// `POST {base}/auth/login` response.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub access_token: Option<String>,
    /// `"YYYY-MM-DD HH:MM:SS"`, interpreted as UTC. May be absent.
    pub expires_at: Option<String>,
    #[serde(default)]
    pub success: bool,
    pub message: Option<String>,
}

/// Create/fetch invoice response.
#[derive(Debug, Clone, Deserialize)]
pub struct InvoiceResponse {
    #[serde(default)]
    pub success: bool,
    pub message: Option<String>,
    #[serde(rename = "XmlDocumentKey")]
    pub xml_document_key: Option<String>,
    pub response: Option<AuthorityResponse>,
    pub pdf: Option<DocumentLink>,
    #[serde(rename = "AttachedDocument")]
    pub attached_document: Option<DocumentLink>,
}

/// The fiscal authority's verdict, embedded in the provider response.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthorityResponse {
    /// `"true"` when the authority accepted the document. Any other value
    /// (or absence) is a rejection even when the outer `success` is true.
    #[serde(rename = "IsValid")]
    pub is_valid: Option<String>,
    #[serde(rename = "StatusCode")]
    pub status_code: Option<String>,
    #[serde(rename = "StatusMessage")]
    pub status_message: Option<String>,
    /// Free-form error detail block; preserved verbatim for diagnosis.
    #[serde(rename = "ErrorMessage")]
    pub error_message: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DocumentLink {
    pub url: Option<String>,
}

/// `POST {base}/invoice/{id}/send-email` response.
#[derive(Debug, Clone, Deserialize)]
pub struct SendEmailResponse {
    #[serde(default)]
    pub success: bool,
    pub message: Option<String>,
}

impl InvoiceResponse {
    /// True only when the authority explicitly accepted the document.
    pub fn is_accepted(&self) -> bool {
        matches!(
            self.response.as_ref().and_then(|r| r.is_valid.as_deref()),
            Some("true")
        )
    }

    pub fn pdf_url(&self) -> Option<String> {
        self.pdf.as_ref().and_then(|link| link.url.clone())
    }

    pub fn xml_url(&self) -> Option<String> {
        self.attached_document.as_ref().and_then(|link| link.url.clone())
    }

    /// Build the rejection detail for a refused or invalid document.
    pub fn rejection(&self) -> ProviderRejection {
        let authority = self.response.as_ref();
        ProviderRejection {
            status_code: authority.and_then(|r| r.status_code.clone()),
            status_message: authority
                .and_then(|r| r.status_message.clone())
                .or_else(|| self.message.clone())
                .unwrap_or_else(|| "document validation failed".to_string()),
            detail: authority.and_then(|r| r.error_message.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepted_only_when_is_valid_is_the_string_true() {
        let accepted: InvoiceResponse = serde_json::from_value(serde_json::json!({
            "success": true,
            "XmlDocumentKey": "cufe-1",
            "response": { "IsValid": "true", "StatusCode": "00" }
        }))
        .unwrap();
        assert!(accepted.is_accepted());

        let rejected: InvoiceResponse = serde_json::from_value(serde_json::json!({
            "success": true,
            "response": { "IsValid": "false", "StatusCode": "99", "StatusMessage": "Rechazado" }
        }))
        .unwrap();
        assert!(!rejected.is_accepted());

        let silent: InvoiceResponse =
            serde_json::from_value(serde_json::json!({ "success": true })).unwrap();
        assert!(!silent.is_accepted());
    }

    #[test]
    fn rejection_preserves_authority_status_and_detail() {
        let response: InvoiceResponse = serde_json::from_value(serde_json::json!({
            "success": true,
            "response": {
                "IsValid": "false",
                "StatusCode": "99",
                "StatusMessage": "Documento rechazado",
                "ErrorMessage": { "string": ["Regla FAD06"] }
            }
        }))
        .unwrap();

        let rejection = response.rejection();
        assert_eq!(rejection.status_code.as_deref(), Some("99"));
        assert_eq!(rejection.status_message, "Documento rechazado");
        assert_eq!(
            rejection.detail,
            Some(serde_json::json!({ "string": ["Regla FAD06"] }))
        );
    }

    #[test]
    fn rejection_falls_back_to_the_outer_message() {
        let response: InvoiceResponse = serde_json::from_value(serde_json::json!({
            "success": false,
            "message": "Invoice creation failed"
        }))
        .unwrap();

        assert_eq!(response.rejection().status_message, "Invoice creation failed");
    }
}
