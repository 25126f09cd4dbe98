pub mod manual;
pub mod zbar;

pub use manual::{ManualEntryPlatform, MANUAL_DEVICE_ID};
pub use zbar::ZbarCameraPlatform;

use crate::infrastructure::{CameraBackend, ScannerArgs};
use async_trait::async_trait;
use dks_checkin_core::{CameraDevice, CameraError, CameraPlatform, FrameSource, SamplingConfig};

/// The camera backend picked on the command line
#[derive(Debug, Clone)]
pub enum CliCamera {
    Zbar(ZbarCameraPlatform),
    Manual(ManualEntryPlatform),
}

impl CliCamera {
    pub fn from_args(args: &ScannerArgs) -> Self {
        match args.backend {
            CameraBackend::Zbar => CliCamera::Zbar(ZbarCameraPlatform::new(args.zbarcam.clone())),
            CameraBackend::Stdin => CliCamera::Manual(ManualEntryPlatform::new()),
        }
    }

    /// Manual entry reads codes from the console instead of a device
    pub fn manual(&self) -> Option<&ManualEntryPlatform> {
        match self {
            CliCamera::Manual(platform) => Some(platform),
            CliCamera::Zbar(_) => None,
        }
    }
}

#[async_trait]
impl CameraPlatform for CliCamera {
    async fn enumerate_devices(&self) -> Result<Vec<CameraDevice>, CameraError> {
        match self {
            CliCamera::Zbar(platform) => platform.enumerate_devices().await,
            CliCamera::Manual(platform) => platform.enumerate_devices().await,
        }
    }

    async fn start_capture(
        &self,
        device_id: &str,
        config: &SamplingConfig,
    ) -> Result<Box<dyn FrameSource>, CameraError> {
        match self {
            CliCamera::Zbar(platform) => platform.start_capture(device_id, config).await,
            CliCamera::Manual(platform) => platform.start_capture(device_id, config).await,
        }
    }
}
