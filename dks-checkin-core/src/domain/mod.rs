pub mod activation;
pub mod camera;
pub mod identifier;
pub mod outcome;
pub mod participant;

pub use activation::{ActivationFlag, ActivationType, UnknownActivation};
pub use camera::{preferred_camera, CameraDevice, CameraError, DetectionWindow, SamplingConfig};
pub use identifier::{IdentifierError, ParticipantId};
pub use outcome::{RedemptionFailure, ScanOutcome};
pub use participant::Participant;
