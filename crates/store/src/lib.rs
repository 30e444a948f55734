//! Persistence for invoice lifecycle records.
//!
//! The trait is the seam; the in-memory implementation backs tests and
//! single-node deployments.

pub mod memory;

use chrono::{DateTime, Utc};

use factura_core::{InvoiceId, IssuanceResult};
use factura_invoicing::InvoiceRecord;

pub use memory::InMemoryInvoiceStore;

/// Fields recorded when the provider accepts a document.
#[derive(Debug, Clone)]
pub struct IssuedOutcome {
    pub cufe: Option<String>,
    pub pdf_url: Option<String>,
    pub xml_url: Option<String>,
    pub issued_at: DateTime<Utc>,
}

/// Provider-side references learned after issuance, e.g. during a status
/// refresh. Only fills gaps; an issued record is never downgraded.
#[derive(Debug, Clone)]
pub struct ProviderRefs {
    pub cufe: Option<String>,
    pub pdf_url: Option<String>,
    pub xml_url: Option<String>,
}

/// Lifecycle store for issuance attempts.
pub trait InvoiceStore: Send + Sync {
    /// Atomically check the order code and register a new `Processing`
    /// attempt. Fails with `Conflict` when an issued invoice already exists
    /// for the order or another attempt is still in flight; a prior
    /// rejected attempt does not block a retry.
    fn begin_attempt(
        &self,
        order_code: &str,
        prefix: &str,
        document_number: &str,
    ) -> IssuanceResult<InvoiceRecord>;

    fn mark_issued(&self, id: InvoiceId, outcome: IssuedOutcome) -> IssuanceResult<InvoiceRecord>;

    fn mark_rejected(&self, id: InvoiceId, error: &str) -> IssuanceResult<InvoiceRecord>;

    fn get(&self, id: InvoiceId) -> IssuanceResult<InvoiceRecord>;

    /// Latest attempt for an order code, regardless of its outcome.
    fn find_by_order_code(&self, order_code: &str) -> IssuanceResult<InvoiceRecord>;

    fn update_provider_refs(&self, id: InvoiceId, refs: ProviderRefs) -> IssuanceResult<InvoiceRecord>;
}
