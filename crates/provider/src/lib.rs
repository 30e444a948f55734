//! Everything that faces the fiscal-invoicing provider.
//!
//! Wire payload construction (the transformer), response shapes, the
//! renewable-token manager, and the authenticated HTTP client.

pub mod client;
pub mod payload;
pub mod response;
pub mod token;

pub use client::{ProviderApi, ProviderClient, ProviderConfig};
pub use payload::{transform, ProviderInvoicePayload};
pub use response::{InvoiceResponse, SendEmailResponse};
pub use token::{ProviderToken, TokenManager};
