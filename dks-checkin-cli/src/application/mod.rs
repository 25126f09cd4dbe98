pub mod console_app;
pub mod input;

pub use console_app::{RunSummary, StaffConsole};
