//! Environment-driven service configuration.

use factura_provider::ProviderConfig;

/// Runtime configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub provider: ProviderConfig,
    pub api_key: String,
    pub bind_addr: String,
}

impl ServiceConfig {
    /// Read configuration from the environment, falling back to insecure
    /// development defaults (with a warning) when a variable is missing.
    pub fn from_env() -> Self {
        Self {
            provider: ProviderConfig::new(
                env_or("PROVIDER_API_URL", "http://localhost:8000/api/ubl2.1"),
                env_or("PROVIDER_EMAIL", "dev@example.com"),
                env_or("PROVIDER_PASSWORD", "dev-password"),
            ),
            api_key: env_or("SERVICE_API_KEY", "dev-api-key"),
            bind_addr: env_or("BIND_ADDR", "0.0.0.0:8080"),
        }
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| {
        tracing::warn!("{name} not set; using insecure dev default");
        default.to_string()
    })
}
