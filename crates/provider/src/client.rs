//! Authenticated HTTP client for the fiscal-invoicing provider.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde_json::json;
use tracing::{info, warn};

use factura_core::{AuthFailure, IssuanceError};

use crate::payload::ProviderInvoicePayload;
use crate::response::{AuthResponse, InvoiceResponse, SendEmailResponse};
use crate::token::{ProviderToken, TokenManager};

/// Fixed timeout for every provider call; the only cancellation primitive.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Expiry format the provider returns, interpreted as UTC.
const EXPIRY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone)]
pub struct ProviderConfig {
    base_url: String,
    email: String,
    password: String,
}

impl ProviderConfig {
    pub fn new(base_url: impl Into<String>, email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Provider operations consumed by the orchestrator.
#[async_trait]
pub trait ProviderApi: Send + Sync {
    /// Submit a document. A provider-level refusal or an authority
    /// rejection both surface as `IssuanceError::Rejected`.
    async fn create_invoice(&self, payload: &ProviderInvoicePayload) -> Result<InvoiceResponse, IssuanceError>;

    /// Fetch the current provider view of `{prefix}-{document_number}`.
    async fn get_invoice(&self, prefix: &str, document_number: &str) -> Result<InvoiceResponse, IssuanceError>;

    /// Ask the provider to re-send the document by email.
    async fn resend_email(&self, prefix: &str, document_number: &str, email: &str) -> Result<(), IssuanceError>;
}

/// `reqwest`-backed client with a renewable cached token.
pub struct ProviderClient {
    http: reqwest::Client,
    config: ProviderConfig,
    token: TokenManager,
}

impl ProviderClient {
    pub fn new(config: ProviderConfig) -> Result<Self, IssuanceError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| IssuanceError::transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            config,
            token: TokenManager::new(),
        })
    }

    async fn login(http: &reqwest::Client, config: &ProviderConfig) -> Result<ProviderToken, IssuanceError> {
        let url = format!("{}/auth/login", config.base_url);
        info!(url = %url, email = %config.email, "authenticating with invoicing provider");

        let response = http
            .post(&url)
            .json(&json!({
                "email": config.email,
                "password": config.password,
                "remember_me": 0,
            }))
            .send()
            .await
            .map_err(|e| AuthFailure::Transport(e.to_string()))?;

        // An HTML page here means the base URL points at a website, not the
        // API; credentials are not the problem.
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if content_type.contains("text/html") {
            return Err(AuthFailure::HtmlResponse { url }.into());
        }

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if body.trim_start().starts_with("<!DOCTYPE") || body.trim_start().starts_with("<html") {
                return Err(AuthFailure::HtmlResponse { url }.into());
            }
            return Err(AuthFailure::Rejected(format!("login returned {status}: {body}")).into());
        }

        let body: AuthResponse = response
            .json()
            .await
            .map_err(|e| AuthFailure::Transport(format!("invalid login response: {e}")))?;

        let bearer = body
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or(AuthFailure::MissingToken)?;
        if !body.success {
            return Err(AuthFailure::Rejected(
                body.message.unwrap_or_else(|| "authentication failed".to_string()),
            )
            .into());
        }

        let expires_at = body.expires_at.as_deref().and_then(parse_expiry);
        let token = ProviderToken::new(bearer, expires_at);
        info!(expires_at = %token.expires_at(), "authenticated with invoicing provider");
        Ok(token)
    }

    async fn bearer(&self) -> Result<String, IssuanceError> {
        self.token
            .acquire(|| Self::login(&self.http, &self.config))
            .await
    }

    /// Send an authenticated request and decode the JSON body.
    ///
    /// A 401 invalidates the cached token so the next call logs in again;
    /// there is no automatic retry.
    async fn execute<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        url: &str,
    ) -> Result<T, IssuanceError> {
        let bearer = self.bearer().await?;
        let response = request
            .bearer_auth(bearer)
            .send()
            .await
            .map_err(|e| IssuanceError::transport(format!("request to {url} failed: {e}")))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            self.token.invalidate().await;
            return Err(AuthFailure::Rejected("provider rejected the bearer token (401)".to_string()).into());
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IssuanceError::transport(format!(
                "provider returned {status} for {url}: {body}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| IssuanceError::transport(format!("invalid provider response from {url}: {e}")))
    }
}

#[async_trait]
impl ProviderApi for ProviderClient {
    async fn create_invoice(&self, payload: &ProviderInvoicePayload) -> Result<InvoiceResponse, IssuanceError> {
        let url = format!("{}/invoice", self.config.base_url);
        info!(
            prefix = %payload.prefix,
            document_number = %payload.document_number,
            "submitting invoice to provider"
        );

        let body: InvoiceResponse = self.execute(self.http.post(&url).json(payload), &url).await?;

        if !body.success {
            return Err(IssuanceError::Rejected(body.rejection()));
        }
        if !body.is_accepted() {
            let rejection = body.rejection();
            warn!(
                cufe = ?body.xml_document_key,
                status_code = ?rejection.status_code,
                status_message = %rejection.status_message,
                "provider accepted the call but the authority rejected the document"
            );
            return Err(IssuanceError::Rejected(rejection));
        }

        info!(
            cufe = ?body.xml_document_key,
            status_code = ?body.response.as_ref().and_then(|r| r.status_code.as_deref()),
            "invoice accepted by provider"
        );
        Ok(body)
    }

    async fn get_invoice(&self, prefix: &str, document_number: &str) -> Result<InvoiceResponse, IssuanceError> {
        let url = format!("{}/invoice/{prefix}-{document_number}", self.config.base_url);
        let body: InvoiceResponse = self.execute(self.http.get(&url), &url).await?;

        if !body.success {
            return Err(IssuanceError::Rejected(body.rejection()));
        }
        Ok(body)
    }

    async fn resend_email(&self, prefix: &str, document_number: &str, email: &str) -> Result<(), IssuanceError> {
        let url = format!(
            "{}/invoice/{prefix}-{document_number}/send-email",
            self.config.base_url
        );
        info!(prefix = %prefix, document_number = %document_number, email = %email, "resending invoice email");

        let body: SendEmailResponse = self
            .execute(self.http.post(&url).json(&json!({ "email": email })), &url)
            .await?;

        if !body.success {
            return Err(IssuanceError::Rejected(factura_core::ProviderRejection {
                status_code: None,
                status_message: body
                    .message
                    .unwrap_or_else(|| "failed to resend invoice email".to_string()),
                detail: None,
            }));
        }
        Ok(())
    }
}

fn parse_expiry(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw, EXPIRY_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slashes_are_trimmed() {
        let config = ProviderConfig::new("https://api.example.com/v1//", "a@b.co", "pw");
        assert_eq!(config.base_url(), "https://api.example.com/v1");
    }

    #[test]
    fn expiry_parses_the_provider_format() {
        let parsed = parse_expiry("2027-08-30 12:30:00").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2027-08-30T12:30:00+00:00");
        assert!(parse_expiry("not a date").is_none());
    }
}
