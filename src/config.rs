//! Runtime configuration loaded from the environment (and `.env`).

use crate::taiga::TaigaSettings;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;

/// Process-wide configuration.
#[derive(Clone, Debug, Default)]
pub struct Config {
    /// Taiga API root and service-account credentials
    /// (TAIGA_BASE_URL, TAIGA_USERNAME, TAIGA_PASSWORD).
    pub taiga: TaigaSettings,
    /// Shared secret for the `/actions/*` facade (ACTION_PROXY_API_KEY).
    pub api_key: Option<String>,
    /// Fallback project for epic listing (TAIGA_PROJECT_ID), kept raw so a
    /// malformed value is reported when it is used.
    pub default_project_id: Option<String>,
    /// Fallback project slug for epic listing (TAIGA_PROJECT_SLUG).
    pub default_project_slug: Option<String>,
    /// Bind address for `serve` (MCP_HOST, default 0.0.0.0).
    pub host: String,
    /// Bind port for `serve` (PORT, default 8000).
    pub port: u16,
    pub transport: TransportSecurity,
}

impl Config {
    /// Load `.env` if present, then read the environment.
    pub fn from_env() -> Self {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                tracing::warn!("Failed to load .env file: {}", e);
            }
        }

        Self {
            taiga: TaigaSettings {
                base_url: env_var("TAIGA_BASE_URL"),
                username: env_var("TAIGA_USERNAME"),
                password: env_var("TAIGA_PASSWORD"),
            },
            api_key: env_var("ACTION_PROXY_API_KEY"),
            default_project_id: env_var("TAIGA_PROJECT_ID"),
            default_project_slug: env_var("TAIGA_PROJECT_SLUG"),
            host: env_var("MCP_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: env_var("PORT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            transport: TransportSecurity::from_env(),
        }
    }

    /// Config with an API key and nothing else (for tests).
    pub fn with_api_key(key: impl Into<String>) -> Self {
        Self {
            api_key: Some(key.into()),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            ..Self::default()
        }
    }
}

/// DNS-rebinding protection for the `/mcp` endpoint.
#[derive(Clone, Debug, Default)]
pub struct TransportSecurity {
    pub enabled: bool,
    pub allowed_hosts: Vec<String>,
    pub allowed_origins: Vec<String>,
}

impl TransportSecurity {
    /// Reads MCP_ENABLE_DNS_REBINDING_PROTECTION, MCP_ALLOWED_HOSTS and
    /// MCP_ALLOWED_ORIGINS. Protection stays off unless explicitly enabled
    /// with a non-empty host list.
    pub fn from_env() -> Self {
        Self::from_values(
            env_var("MCP_ENABLE_DNS_REBINDING_PROTECTION").as_deref(),
            env_var("MCP_ALLOWED_HOSTS").as_deref(),
            env_var("MCP_ALLOWED_ORIGINS").as_deref(),
        )
    }

    pub fn from_values(enable: Option<&str>, hosts: Option<&str>, origins: Option<&str>) -> Self {
        if !truthy(enable) {
            return Self::default();
        }

        let allowed_hosts = split_list(hosts);
        if allowed_hosts.is_empty() {
            tracing::warn!(
                "MCP_ENABLE_DNS_REBINDING_PROTECTION is true but MCP_ALLOWED_HOSTS is empty; \
                 disabling DNS rebinding protection"
            );
            return Self::default();
        }

        Self {
            enabled: true,
            allowed_hosts,
            allowed_origins: split_list(origins),
        }
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn truthy(value: Option<&str>) -> bool {
    matches!(
        value.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("1" | "true" | "yes" | "y" | "on")
    )
}

fn split_list(value: Option<&str>) -> Vec<String> {
    value
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
