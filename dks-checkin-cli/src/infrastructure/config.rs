use clap::{Args, ValueEnum};
use dks_checkin_core::SamplingConfig;
use dks_checkin_store::{ConfigError, StoreConfig};
use std::path::PathBuf;

/// Where decoded codes come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CameraBackend {
    /// V4L2 cameras read through a `zbarcam` child process
    Zbar,
    /// Codes typed (or piped) on stdin
    Stdin,
}

/// Store flags. Each one overrides the matching `DKS_*` variable.
#[derive(Debug, Clone, Default, Args)]
pub struct StoreArgs {
    /// Store URL (overrides DKS_STORE_URL)
    #[arg(long = "store-url")]
    pub url: Option<String>,

    /// Store API key (overrides DKS_STORE_KEY)
    #[arg(long = "store-key")]
    pub key: Option<String>,

    /// Participant table (overrides DKS_STORE_TABLE)
    #[arg(long = "store-table")]
    pub table: Option<String>,

    /// Request timeout in seconds (overrides DKS_STORE_TIMEOUT_SECS)
    #[arg(long = "store-timeout")]
    pub timeout_secs: Option<u64>,

    /// Only set the flag if it is still false (overrides DKS_CONDITIONAL_COMMIT)
    #[arg(long)]
    pub conditional_commit: bool,
}

impl StoreArgs {
    pub fn resolve(&self) -> Result<StoreConfig, ConfigError> {
        self.resolve_with(|var| std::env::var(var).ok())
    }

    /// Flags first, then `env`
    pub fn resolve_with<F>(&self, env: F) -> Result<StoreConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        StoreConfig::from_lookup(|var| {
            let flag = match var {
                "DKS_STORE_URL" => self.url.clone(),
                "DKS_STORE_KEY" => self.key.clone(),
                "DKS_STORE_TABLE" => self.table.clone(),
                "DKS_STORE_TIMEOUT_SECS" => self.timeout_secs.map(|secs| secs.to_string()),
                "DKS_CONDITIONAL_COMMIT" => self.conditional_commit.then(|| "true".to_string()),
                _ => None,
            };
            flag.or_else(|| env(var))
        })
    }
}

/// Camera flags
#[derive(Debug, Clone, Args)]
pub struct ScannerArgs {
    /// Camera backend
    #[arg(long, value_enum, env = "DKS_CAMERA_BACKEND", default_value_t = CameraBackend::Zbar)]
    pub backend: CameraBackend,

    /// Path to the zbarcam binary
    #[arg(long, env = "DKS_ZBARCAM", default_value = "zbarcam")]
    pub zbarcam: PathBuf,

    /// Decode attempts per second
    #[arg(long, default_value_t = 10)]
    pub attempts_per_second: u32,
}

impl Default for ScannerArgs {
    fn default() -> Self {
        Self {
            backend: CameraBackend::Zbar,
            zbarcam: PathBuf::from("zbarcam"),
            attempts_per_second: 10,
        }
    }
}

impl ScannerArgs {
    pub fn sampling(&self) -> SamplingConfig {
        SamplingConfig::default().with_attempts_per_second(self.attempts_per_second)
    }
}
