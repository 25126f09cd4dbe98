pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod traits;

pub use application::{
    present, ActivationController, ActivationSession, CameraSourceManager, CaptureHandle,
    CommitPolicy, EngineState, FrameDecoder, RedemptionEngine, Resolution, ResultView, ScanControl,
    ScanExit, Screen, SessionCommand, SessionError, SessionEvent, Submission, Treatment,
};
pub use domain::{
    preferred_camera, ActivationFlag, ActivationType, CameraDevice, CameraError, DetectionWindow,
    IdentifierError, Participant, ParticipantId, RedemptionFailure, SamplingConfig, ScanOutcome,
};
pub use infrastructure::{MemoryParticipantStore, RecordingCapture, ScriptedCameraPlatform};
pub use traits::{
    CameraPlatform, CaptureControl, ConditionalWrite, DecodeAttempt, FrameSource,
    ParticipantStore, StoreError,
};
