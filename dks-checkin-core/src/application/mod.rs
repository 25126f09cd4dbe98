pub mod camera_manager;
pub mod controller;
pub mod engine;
pub mod frame_decoder;
pub mod presenter;
pub mod session;

pub use camera_manager::CameraSourceManager;
pub use controller::{ActivationController, ScanControl, ScanExit};
pub use engine::{CommitPolicy, EngineState, RedemptionEngine, Resolution, Submission};
pub use frame_decoder::{CaptureHandle, FrameDecoder};
pub use presenter::{present, ResultView, Treatment};
pub use session::{ActivationSession, Screen, SessionCommand, SessionError, SessionEvent};
