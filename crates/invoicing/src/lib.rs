//! Pure invoice domain.
//!
//! Internal request model, type-conditional validation, exact monetary
//! computation, and the lifecycle record. No I/O and no wire formats; the
//! provider schema lives in `factura-provider`.

pub mod record;
pub mod request;
pub mod totals;
pub mod validate;

pub use record::{InvoiceRecord, InvoiceStatus};
pub use request::{
    AllowanceCharge, BillingReference, Customer, DiscrepancyResponse, DocumentSignature,
    DocumentType, InvoiceRequest, LineItem, Payment, PointOfSaleInfo, SoftwareManufacturerInfo,
};
pub use totals::{InvoiceTotals, LineAmounts};
pub use validate::validate;
