use crate::infrastructure::{CliError, Result};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

/// Workspace crates that get the default level
const WORKSPACE_TARGETS: [&str; 3] = ["dks_checkin_cli", "dks_checkin_core", "dks_checkin_store"];

/// Logging configuration
///
/// Logs always go to stderr (or a file); stdout is reserved for what staff
/// read and for JSON outcomes.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub default_level: tracing::Level,
    pub json_format: bool,
    pub file_output: Option<String>,
    pub show_thread_ids: bool,
    pub show_targets: bool,
    pub show_logs: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            default_level: tracing::Level::WARN,
            json_format: false,
            file_output: None,
            show_thread_ids: false,
            show_targets: true,
            show_logs: true,
        }
    }
}

impl LogConfig {
    /// Development configuration (verbose, human-readable)
    pub fn dev() -> Self {
        Self {
            default_level: tracing::Level::DEBUG,
            show_thread_ids: true,
            ..Default::default()
        }
    }

    pub fn with_level(mut self, level: tracing::Level) -> Self {
        self.default_level = level;
        self
    }

    /// One JSON object per log line
    pub fn with_json(mut self) -> Self {
        self.json_format = true;
        self
    }

    /// Hide logs from stderr (file output still applies)
    pub fn without_logs(mut self) -> Self {
        self.show_logs = false;
        self
    }

    /// Log to file
    pub fn with_file_output(mut self, path: String) -> Self {
        self.file_output = Some(path);
        self
    }

    /// Directives used when `RUST_LOG` is not set
    pub fn default_directives(&self) -> String {
        let level = self.default_level.to_string().to_lowercase();
        WORKSPACE_TARGETS
            .iter()
            .map(|target| format!("{}={}", target, level))
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn init(self) -> Result<()> {
        let env_filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::try_new(self.default_directives())
                .map_err(|e| CliError::Logging(e.to_string()))?,
        };

        let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

        if self.show_logs {
            let layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(self.show_targets)
                .with_thread_ids(self.show_thread_ids);
            layers.push(if self.json_format {
                layer.json().boxed()
            } else {
                layer.boxed()
            });
        }

        if let Some(path) = &self.file_output {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let layer = fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .with_target(self.show_targets);
            layers.push(if self.json_format {
                layer.json().boxed()
            } else {
                layer.boxed()
            });
        }

        tracing_subscriber::registry()
            .with(layers)
            .with(env_filter)
            .try_init()
            .map_err(|e| CliError::Logging(e.to_string()))
    }
}
