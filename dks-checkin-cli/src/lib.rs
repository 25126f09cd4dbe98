pub mod application;
pub mod camera;
pub mod infrastructure;
pub mod presentation;

pub use application::{RunSummary, StaffConsole};
pub use camera::CliCamera;
pub use infrastructure::{CliError, LogConfig, Result};
