pub mod camera;
pub mod store;

pub use camera::{CameraPlatform, CaptureControl, DecodeAttempt, FrameSource};
pub use store::{ConditionalWrite, ParticipantStore, StoreError};
