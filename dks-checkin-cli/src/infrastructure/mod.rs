pub mod config;
pub mod error;
pub mod observability;

pub use config::{CameraBackend, ScannerArgs, StoreArgs};
pub use error::{CliError, Result};
pub use observability::LogConfig;
