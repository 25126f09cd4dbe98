//! Participant store configuration.
//!
//! Credentials are injected at runtime, never compiled in.

use reqwest::Url;

pub const DEFAULT_TABLE: &str = "participantes_dksfestival";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Connection settings for the PostgREST participant store
///
/// Custom `Debug` implementation redacts the `api_key` field.
#[derive(Clone)]
pub struct StoreConfig {
    /// Project URL, e.g. `https://<project>.supabase.co`
    pub base_url: Url,
    /// Public (anon) API key, sent as `apikey` and bearer token
    pub api_key: String,
    /// Participant table
    pub table: String,
    /// Per-request transport timeout
    pub timeout_secs: u64,
    /// Use "set if still false" writes instead of plain updates
    pub conditional_commit: bool,
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"[REDACTED]")
            .field("table", &self.table)
            .field("timeout_secs", &self.timeout_secs)
            .field("conditional_commit", &self.conditional_commit)
            .finish()
    }
}

impl StoreConfig {
    /// Config with defaults for everything but the endpoint and key
    pub fn new(base_url: Url, api_key: impl Into<String>) -> Self {
        Self {
            base_url,
            api_key: api_key.into(),
            table: DEFAULT_TABLE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            conditional_commit: false,
        }
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn with_conditional_commit(mut self, conditional: bool) -> Self {
        self.conditional_commit = conditional;
        self
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `DKS_STORE_URL` (required)
    /// - `DKS_STORE_KEY` (required)
    /// - `DKS_STORE_TABLE` (default: `participantes_dksfestival`)
    /// - `DKS_STORE_TIMEOUT_SECS` (default: 10, must be positive)
    /// - `DKS_CONDITIONAL_COMMIT` (default: false)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_url = lookup("DKS_STORE_URL").ok_or(ConfigError::Missing("DKS_STORE_URL"))?;
        let base_url = Url::parse(&raw_url)
            .map_err(|e| ConfigError::InvalidUrl("DKS_STORE_URL".to_string(), e.to_string()))?;
        let api_key = lookup("DKS_STORE_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::Missing("DKS_STORE_KEY"))?;

        let mut config = Self::new(base_url, api_key);

        if let Some(table) = lookup("DKS_STORE_TABLE").filter(|t| !t.trim().is_empty()) {
            config.table = table;
        }
        if let Some(raw) = lookup("DKS_STORE_TIMEOUT_SECS") {
            // A zero timeout fails every request
            config.timeout_secs = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidValue {
                    var: "DKS_STORE_TIMEOUT_SECS",
                    value: raw.clone(),
                })?;
        }
        if let Some(raw) = lookup("DKS_CONDITIONAL_COMMIT") {
            config.conditional_commit = parse_flag(&raw).ok_or(ConfigError::InvalidValue {
                var: "DKS_CONDITIONAL_COMMIT",
                value: raw.clone(),
            })?;
        }

        Ok(config)
    }

    /// `{base_url}/rest/v1/{table}`
    pub fn table_url(&self) -> String {
        format!(
            "{}/rest/v1/{}",
            self.base_url.as_str().trim_end_matches('/'),
            self.table
        )
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),

    #[error("invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },

    #[error("API key is not a valid header value")]
    InvalidKey,

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}
