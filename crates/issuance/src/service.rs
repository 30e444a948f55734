//! Issuance orchestration.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use factura_core::{InvoiceId, IssuanceError, IssuanceResult};
use factura_invoicing::{validate, InvoiceRecord, InvoiceRequest, InvoiceStatus};
use factura_provider::{transform, ProviderApi};
use factura_store::{InvoiceStore, IssuedOutcome, ProviderRefs};

/// Outcome of a successful issuance.
#[derive(Debug, Clone)]
pub struct InvoiceResult {
    pub record: InvoiceRecord,
    /// Human-readable provider message, when one was returned.
    pub message: Option<String>,
}

/// Orchestrates one issuance attempt end to end.
///
/// Order of operations is load-bearing: the store registers the attempt
/// (and rejects duplicates) before validation and before any provider
/// traffic, so a conflicting order never reaches the provider.
pub struct IssuanceService {
    store: Arc<dyn InvoiceStore>,
    provider: Arc<dyn ProviderApi>,
}

impl IssuanceService {
    pub fn new(store: Arc<dyn InvoiceStore>, provider: Arc<dyn ProviderApi>) -> Self {
        Self { store, provider }
    }

    pub async fn create_invoice(&self, request: InvoiceRequest) -> IssuanceResult<InvoiceResult> {
        let record = self.store.begin_attempt(
            &request.order_code,
            &request.prefix,
            &request.document_number,
        )?;
        info!(
            invoice_id = %record.id,
            order_code = %request.order_code,
            document = %record.provider_document_id(),
            document_type = request.document_type.code(),
            "issuance attempt started"
        );

        let field_errors = validate(&request);
        if !field_errors.is_empty() {
            return Err(self.fail_attempt(record.id, IssuanceError::validation(field_errors)));
        }

        let totals = match factura_invoicing::totals::compute(&request.items) {
            Ok(totals) => totals,
            Err(err) => return Err(self.fail_attempt(record.id, err)),
        };
        let payload = match transform(&request, &totals) {
            Ok(payload) => payload,
            Err(err) => return Err(self.fail_attempt(record.id, err)),
        };

        let response = match self.provider.create_invoice(&payload).await {
            Ok(response) => response,
            Err(err) => return Err(self.fail_attempt(record.id, err)),
        };

        let issued = self.store.mark_issued(
            record.id,
            IssuedOutcome {
                cufe: response.xml_document_key.clone(),
                pdf_url: response.pdf_url(),
                xml_url: response.xml_url(),
                issued_at: Utc::now(),
            },
        )?;
        info!(
            invoice_id = %issued.id,
            cufe = ?issued.cufe,
            "invoice issued"
        );

        Ok(InvoiceResult {
            record: issued,
            message: response.message,
        })
    }

    /// Current lifecycle record, refreshed from the provider whenever the
    /// record carries a document reference. A failed refresh never fails
    /// the read.
    pub async fn get_status(&self, id: InvoiceId) -> IssuanceResult<InvoiceRecord> {
        let record = self.store.get(id)?;
        if record.prefix.is_empty() || record.document_number.is_empty() {
            return Ok(record);
        }

        match self
            .provider
            .get_invoice(&record.prefix, &record.document_number)
            .await
        {
            Ok(response) => {
                let cufe = response.xml_document_key.clone();
                let pdf_url = response.pdf_url();
                let xml_url = response.xml_url();

                // The authority's verdict wins over stale local state.
                if response.is_accepted() && record.status != InvoiceStatus::Issued {
                    self.store.mark_issued(
                        id,
                        IssuedOutcome {
                            cufe,
                            pdf_url,
                            xml_url,
                            issued_at: Utc::now(),
                        },
                    )
                } else {
                    self.store.update_provider_refs(
                        id,
                        ProviderRefs {
                            cufe,
                            pdf_url,
                            xml_url,
                        },
                    )
                }
            }
            Err(err) => {
                warn!(invoice_id = %id, error = %err, "provider status refresh failed; serving stored record");
                Ok(record)
            }
        }
    }

    pub fn find_by_order_code(&self, order_code: &str) -> IssuanceResult<InvoiceRecord> {
        self.store.find_by_order_code(order_code)
    }

    /// Re-send the document by email. Without a recipient this is a local
    /// no-op; the provider already emailed the customer at issuance when the
    /// request asked for it.
    pub async fn resend(&self, id: InvoiceId, email: Option<&str>) -> IssuanceResult<InvoiceRecord> {
        let record = self.store.get(id)?;
        if record.prefix.is_empty() || record.document_number.is_empty() {
            return Err(IssuanceError::validation_field(
                "documentNumber",
                "record is missing the provider document reference",
            ));
        }

        if let Some(email) = email {
            self.provider
                .resend_email(&record.prefix, &record.document_number, email)
                .await?;
            info!(invoice_id = %id, email = %email, "invoice email resent");
        }

        Ok(record)
    }

    /// Persist the failure on the attempt, then hand the error back. A store
    /// write failure here is logged and swallowed so it cannot mask the
    /// original failure.
    fn fail_attempt(&self, id: InvoiceId, err: IssuanceError) -> IssuanceError {
        if let Err(store_err) = self.store.mark_rejected(id, &err.to_string()) {
            warn!(invoice_id = %id, error = %store_err, "failed to record rejection");
        }
        info!(invoice_id = %id, error = %err, "issuance attempt failed");
        err
    }
}
