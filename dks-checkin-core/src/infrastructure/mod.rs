pub mod memory_store;
pub mod scripted_camera;

pub use memory_store::MemoryParticipantStore;
pub use scripted_camera::{RecordingCapture, ScriptedCameraPlatform};
