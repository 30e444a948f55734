//! Shared foundation for the issuance pipeline.
//!
//! This crate contains the error taxonomy and strongly-typed identifiers.
//! It has no knowledge of HTTP, storage, or the provider wire format.

pub mod error;
pub mod id;

pub use error::{AuthFailure, FieldError, IssuanceError, IssuanceResult, ProviderRejection};
pub use id::InvoiceId;
