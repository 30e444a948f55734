//! Cached provider token with serialized renewal.

use std::future::Future;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;

use factura_core::IssuanceError;

/// Renew when the remaining validity drops below this margin.
const RENEWAL_MARGIN_MINUTES: i64 = 5;

/// Validity assumed when the provider omits an expiry.
const DEFAULT_VALIDITY_DAYS: i64 = 365;

/// Opaque bearer plus expiry. Never leaves this crate except as the bare
/// bearer string handed to request builders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderToken {
    bearer: String,
    expires_at: DateTime<Utc>,
}

impl ProviderToken {
    pub fn new(bearer: impl Into<String>, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            bearer: bearer.into(),
            expires_at: expires_at.unwrap_or_else(|| Utc::now() + Duration::days(DEFAULT_VALIDITY_DAYS)),
        }
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    fn needs_renewal(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - now < Duration::minutes(RENEWAL_MARGIN_MINUTES)
    }
}

/// Single cached token shared by every outbound call.
///
/// The slot lock is held across the login future, so concurrent callers that
/// all observe a stale token collapse into one login; the rest await it and
/// reuse the fresh result.
#[derive(Debug, Default)]
pub struct TokenManager {
    slot: Mutex<Option<ProviderToken>>,
}

impl TokenManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a valid bearer, running `login` when the cached token is
    /// missing or within the renewal margin.
    pub async fn acquire<F, Fut>(&self, login: F) -> Result<String, IssuanceError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<ProviderToken, IssuanceError>>,
    {
        let mut slot = self.slot.lock().await;
        if let Some(token) = slot.as_ref() {
            if !token.needs_renewal(Utc::now()) {
                return Ok(token.bearer.clone());
            }
        }

        let fresh = login().await?;
        let bearer = fresh.bearer.clone();
        *slot = Some(fresh);
        Ok(bearer)
    }

    /// Drop the cached token, e.g. after the provider answered 401.
    pub async fn invalidate(&self) {
        *self.slot.lock().await = None;
    }
}
