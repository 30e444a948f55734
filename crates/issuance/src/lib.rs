//! The issuance orchestrator.
//!
//! Glues validation, totals, the provider client and the store into the
//! create/status/resend operations the API exposes.

pub mod service;

pub use service::{InvoiceResult, IssuanceService};
