use crate::application::{CaptureHandle, FrameDecoder};
use crate::domain::{preferred_camera, CameraDevice, CameraError, SamplingConfig};
use crate::traits::CameraPlatform;
use tokio::sync::mpsc;

/// Owns the camera platform and at most one running capture
///
/// Starting a capture always stops the previous one first, so a device is
/// never held twice.
pub struct CameraSourceManager<P: CameraPlatform> {
    platform: P,
    config: SamplingConfig,
    devices: Vec<CameraDevice>,
    active: Option<CaptureHandle>,
}

impl<P: CameraPlatform> CameraSourceManager<P> {
    pub fn new(platform: P) -> Self {
        Self {
            platform,
            config: SamplingConfig::default(),
            devices: Vec::new(),
            active: None,
        }
    }

    pub fn with_config(mut self, config: SamplingConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &SamplingConfig {
        &self.config
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Devices from the last [`list_cameras`](Self::list_cameras); empty after a failed one
    pub fn devices(&self) -> &[CameraDevice] {
        &self.devices
    }

    /// Enumerate devices. An empty platform list is `NoCameraFound`.
    pub async fn list_cameras(&mut self) -> Result<&[CameraDevice], CameraError> {
        self.devices.clear();
        let devices = self.platform.enumerate_devices().await?;
        if devices.is_empty() {
            tracing::warn!("📷 No camera found");
            return Err(CameraError::NoCameraFound);
        }

        tracing::debug!("📷 {} camera(s) available", devices.len());
        self.devices = devices;
        Ok(&self.devices)
    }

    pub fn default_camera(&self) -> Option<&CameraDevice> {
        preferred_camera(&self.devices)
    }

    /// Switching only makes sense with a choice of devices
    pub fn can_switch(&self) -> bool {
        self.devices.len() > 1
    }

    pub fn active_device(&self) -> Option<&str> {
        self.active.as_ref().map(CaptureHandle::device_id)
    }

    pub fn active_capture(&self) -> Option<&CaptureHandle> {
        self.active.as_ref()
    }

    /// Start sampling `device_id`, stopping any running capture first
    pub async fn start(&mut self, device_id: &str) -> Result<mpsc::Receiver<String>, CameraError> {
        self.stop().await;

        let source = self.platform.start_capture(device_id, &self.config).await?;
        let (handle, payloads) = FrameDecoder::spawn(device_id, source, &self.config);

        tracing::info!("📷 Capture started on {}", device_id);
        self.active = Some(handle);
        Ok(payloads)
    }

    pub async fn switch_to(
        &mut self,
        device_id: &str,
    ) -> Result<mpsc::Receiver<String>, CameraError> {
        if let Some(previous) = self.active_device() {
            tracing::info!("📷 Switching camera {} -> {}", previous, device_id);
        }
        self.start(device_id).await
    }

    /// Stop the running capture, if any
    pub async fn stop(&mut self) {
        if let Some(handle) = self.active.take() {
            handle.stop().await;
            tracing::debug!("📷 Capture on {} stopped", handle.device_id());
        }
    }
}
