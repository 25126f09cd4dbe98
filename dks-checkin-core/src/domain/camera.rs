use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Label fragments that identify a rear-facing camera
const REAR_FACING_HINTS: [&str; 4] = ["back", "traseira", "rear", "environment"];

/// A capture device as reported by the camera platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraDevice {
    /// Opaque platform handle
    pub id: String,
    /// Human-readable label
    pub label: String,
}

impl CameraDevice {
    /// Create a device, giving unlabeled devices a generic name
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        let id = id.into();
        let label = label.into();
        let label = if label.trim().is_empty() {
            let short: String = id.chars().take(8).collect();
            format!("Câmera {}", short)
        } else {
            label
        };

        Self { id, label }
    }

    /// Heuristic: true when the label names a rear-facing camera
    pub fn is_rear_facing(&self) -> bool {
        let label = self.label.to_lowercase();
        REAR_FACING_HINTS.iter().any(|hint| label.contains(hint))
    }
}

/// Pick the camera a scanner should open by default.
///
/// The first rear-facing device wins; otherwise the first device in
/// enumeration order. Ambiguous labels fall back to first-in-list.
pub fn preferred_camera(devices: &[CameraDevice]) -> Option<&CameraDevice> {
    devices
        .iter()
        .find(|device| device.is_rear_facing())
        .or_else(|| devices.first())
}

/// Camera acquisition failures. These abort the scanning screen.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum CameraError {
    #[error("Camera permission denied")]
    PermissionDenied,

    #[error("No camera found")]
    NoCameraFound,

    #[error("Camera unavailable: {0}")]
    Unavailable(String),
}

impl CameraError {
    /// Message shown to staff on the scanning screen
    pub fn staff_message(&self) -> &'static str {
        match self {
            CameraError::PermissionDenied => {
                "Permissão de câmera negada. Por favor, permita o acesso à câmera."
            }
            CameraError::NoCameraFound => {
                "Nenhuma câmera encontrada. Verifique se seu dispositivo possui câmera."
            }
            CameraError::Unavailable(_) => {
                "Não foi possível acessar a câmera. Verifique as permissões."
            }
        }
    }
}

/// Region of the frame searched for a code, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionWindow {
    pub width: u32,
    pub height: u32,
}

impl Default for DetectionWindow {
    fn default() -> Self {
        Self {
            width: 250,
            height: 250,
        }
    }
}

/// How often frames are sampled and where codes are searched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplingConfig {
    /// Decode attempts per second
    pub attempts_per_second: u32,

    pub detection_window: DetectionWindow,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            attempts_per_second: 10,
            detection_window: DetectionWindow::default(),
        }
    }
}

impl SamplingConfig {
    pub fn with_attempts_per_second(mut self, attempts: u32) -> Self {
        self.attempts_per_second = attempts;
        self
    }

    /// Time between two decode attempts. The rate is clamped to 1..=1000.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(1) / self.attempts_per_second.clamp(1, 1000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn devices(labels: &[&str]) -> Vec<CameraDevice> {
        labels
            .iter()
            .enumerate()
            .map(|(i, label)| CameraDevice::new(format!("device-{}", i), *label))
            .collect()
    }

    #[test]
    fn test_prefers_back_camera() {
        let cams = devices(&["Front Camera", "Back Camera"]);
        assert_eq!(preferred_camera(&cams).unwrap().id, "device-1");
    }

    #[test]
    fn test_rear_hints_are_case_insensitive() {
        for label in ["REAR lens", "Câmera Traseira", "camera2 0, facing ENVIRONMENT"] {
            let cams = devices(&["Integrated Webcam", label]);
            assert_eq!(
                preferred_camera(&cams).unwrap().id,
                "device-1",
                "label {:?} should be picked",
                label
            );
        }
    }

    #[test]
    fn test_first_rear_camera_wins() {
        let cams = devices(&["front", "back ultra wide", "back main"]);
        assert_eq!(preferred_camera(&cams).unwrap().id, "device-1");
    }

    #[test]
    fn test_falls_back_to_first_device() {
        let cams = devices(&["HD Webcam", "USB Camera"]);
        assert_eq!(preferred_camera(&cams).unwrap().id, "device-0");
    }

    #[test]
    fn test_no_devices() {
        assert!(preferred_camera(&[]).is_none());
    }

    #[test]
    fn test_empty_label_gets_generic_name() {
        let device = CameraDevice::new("a1b2c3d4e5f6", "");
        assert_eq!(device.label, "Câmera a1b2c3d4");
    }

    #[test]
    fn test_default_sampling() {
        let config = SamplingConfig::default();
        assert_eq!(config.attempts_per_second, 10);
        assert_eq!(config.detection_window, DetectionWindow { width: 250, height: 250 });
        assert_eq!(config.interval(), Duration::from_millis(100));
    }

    #[test]
    fn test_rate_is_clamped() {
        let config = SamplingConfig::default().with_attempts_per_second(0);
        assert_eq!(config.interval(), Duration::from_secs(1));

        let config = SamplingConfig::default().with_attempts_per_second(5000);
        assert_eq!(config.interval(), Duration::from_millis(1));
    }

    #[test]
    fn test_staff_messages() {
        assert!(CameraError::PermissionDenied
            .staff_message()
            .contains("Permissão de câmera negada"));
        assert!(CameraError::NoCameraFound
            .staff_message()
            .contains("Nenhuma câmera encontrada"));
    }
}
