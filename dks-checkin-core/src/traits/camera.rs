use crate::domain::{CameraDevice, CameraError, SamplingConfig};
use async_trait::async_trait;

/// One sampled frame: the decoded text, or `None` when no code was found
pub type DecodeAttempt = Option<String>;

/// Camera platform seam (device enumeration + capture start)
#[async_trait]
pub trait CameraPlatform: Send + Sync {
    /// Snapshot of the devices currently available, in platform order
    async fn enumerate_devices(&self) -> Result<Vec<CameraDevice>, CameraError>;

    /// Open `device_id` and begin producing decode attempts
    async fn start_capture(
        &self,
        device_id: &str,
        config: &SamplingConfig,
    ) -> Result<Box<dyn FrameSource>, CameraError>;
}

/// A running capture bound to one device
#[async_trait]
pub trait FrameSource: Send {
    /// Next decode attempt; `None` once the capture has ended for good
    async fn next_attempt(&mut self) -> Option<DecodeAttempt>;

    /// Release the device
    async fn stop(&mut self) -> Result<(), CameraError>;
}

/// Lets the redemption engine halt capture before talking to the store
#[async_trait]
pub trait CaptureControl: Send + Sync {
    /// Stop the capture. Safe to call on an already stopped capture.
    async fn stop_capture(&self);
}
