//! In-memory invoice store.

use std::collections::HashMap;
use std::sync::RwLock;

use factura_core::{InvoiceId, IssuanceError, IssuanceResult};
use factura_invoicing::{InvoiceRecord, InvoiceStatus};

use crate::{InvoiceStore, IssuedOutcome, ProviderRefs};

#[derive(Debug, Default)]
struct Inner {
    by_id: HashMap<InvoiceId, InvoiceRecord>,
    /// Latest attempt per order code. Older attempts stay in `by_id`.
    latest_by_order: HashMap<String, InvoiceId>,
}

/// `RwLock`-guarded maps. Cheap to clone records out; all mutation happens
/// under the write lock so the conflict check and the insert are one step.
#[derive(Debug, Default)]
pub struct InMemoryInvoiceStore {
    inner: RwLock<Inner>,
}

impl InMemoryInvoiceStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn update<F>(&self, id: InvoiceId, apply: F) -> IssuanceResult<InvoiceRecord>
    where
        F: FnOnce(&mut InvoiceRecord),
    {
        let mut inner = self.inner.write().map_err(poisoned)?;
        let record = inner
            .by_id
            .get_mut(&id)
            .ok_or_else(|| IssuanceError::not_found(format!("invoice {id}")))?;
        apply(record);
        Ok(record.clone())
    }
}

impl InvoiceStore for InMemoryInvoiceStore {
    fn begin_attempt(
        &self,
        order_code: &str,
        prefix: &str,
        document_number: &str,
    ) -> IssuanceResult<InvoiceRecord> {
        let mut inner = self.inner.write().map_err(poisoned)?;

        if let Some(existing) = inner
            .latest_by_order
            .get(order_code)
            .and_then(|id| inner.by_id.get(id))
        {
            match existing.status {
                InvoiceStatus::Issued => {
                    return Err(IssuanceError::conflict(format!(
                        "an invoice was already issued for order {order_code}"
                    )));
                }
                // An in-flight attempt must not race a second submission.
                InvoiceStatus::Processing => {
                    return Err(IssuanceError::conflict(format!(
                        "an issuance attempt is already in progress for order {order_code}"
                    )));
                }
                _ => {}
            }
        }

        let record = InvoiceRecord::processing(order_code, prefix, document_number);
        inner.by_id.insert(record.id, record.clone());
        inner.latest_by_order.insert(order_code.to_string(), record.id);
        Ok(record)
    }

    fn mark_issued(&self, id: InvoiceId, outcome: IssuedOutcome) -> IssuanceResult<InvoiceRecord> {
        self.update(id, |record| {
            record.status = InvoiceStatus::Issued;
            record.cufe = outcome.cufe;
            record.pdf_url = outcome.pdf_url;
            record.xml_url = outcome.xml_url;
            record.issued_at = Some(outcome.issued_at);
            record.last_error = None;
        })
    }

    fn mark_rejected(&self, id: InvoiceId, error: &str) -> IssuanceResult<InvoiceRecord> {
        self.update(id, |record| {
            record.status = InvoiceStatus::Rejected;
            record.last_error = Some(error.to_string());
        })
    }

    fn get(&self, id: InvoiceId) -> IssuanceResult<InvoiceRecord> {
        let inner = self.inner.read().map_err(poisoned)?;
        inner
            .by_id
            .get(&id)
            .cloned()
            .ok_or_else(|| IssuanceError::not_found(format!("invoice {id}")))
    }

    fn find_by_order_code(&self, order_code: &str) -> IssuanceResult<InvoiceRecord> {
        let inner = self.inner.read().map_err(poisoned)?;
        inner
            .latest_by_order
            .get(order_code)
            .and_then(|id| inner.by_id.get(id))
            .cloned()
            .ok_or_else(|| IssuanceError::not_found(format!("no invoice for order {order_code}")))
    }

    fn update_provider_refs(&self, id: InvoiceId, refs: ProviderRefs) -> IssuanceResult<InvoiceRecord> {
        self.update(id, |record| {
            if record.cufe.is_none() {
                record.cufe = refs.cufe;
            }
            if record.pdf_url.is_none() {
                record.pdf_url = refs.pdf_url;
            }
            if record.xml_url.is_none() {
                record.xml_url = refs.xml_url;
            }
        })
    }
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> IssuanceError {
    IssuanceError::transport("invoice store lock poisoned")
}
