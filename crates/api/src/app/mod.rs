//! HTTP application wiring (Axum router + service wiring).
//!
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: response JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};

use factura_core::IssuanceError;
use factura_issuance::IssuanceService;
use factura_provider::{ProviderApi, ProviderClient};
use factura_store::InMemoryInvoiceStore;

use crate::config::ServiceConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;

/// Build the production router (entrypoint used by `main.rs`).
pub fn build_app(config: &ServiceConfig) -> Result<Router, IssuanceError> {
    let provider = Arc::new(ProviderClient::new(config.provider.clone())?);
    Ok(build_app_with(provider, &config.api_key))
}

/// Build the router against an arbitrary provider implementation.
///
/// Tests inject a scripted provider here and get the exact production
/// routing, middleware and error mapping.
pub fn build_app_with(provider: Arc<dyn ProviderApi>, api_key: &str) -> Router {
    let store = Arc::new(InMemoryInvoiceStore::new());
    let service = Arc::new(IssuanceService::new(store, provider));

    let api_key_state = middleware::ApiKeyState {
        api_key: Arc::new(api_key.to_string()),
    };

    // Protected routes: everything except the health probe.
    let protected = routes::router()
        .layer(Extension(service))
        .layer(axum::middleware::from_fn_with_state(
            api_key_state,
            middleware::api_key_middleware,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(protected)
}
