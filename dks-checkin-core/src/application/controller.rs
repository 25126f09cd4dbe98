use crate::application::{
    ActivationSession, CameraSourceManager, CommitPolicy, RedemptionEngine, SessionCommand,
    SessionError, SessionEvent, Submission,
};
use crate::domain::{ActivationType, CameraError, SamplingConfig, ScanOutcome};
use crate::traits::{CameraPlatform, ParticipantStore};
use tokio::sync::mpsc;

/// Staff input while the scanning screen is open
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanControl {
    /// Move capture to another device
    SwitchCamera(String),
    /// Leave the scanning screen
    Cancel,
}

/// How a scan ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanExit {
    /// Terminal outcome; the session is now showing it
    Outcome(ScanOutcome),
    /// Staff cancelled; capture is stopped
    Cancelled,
    /// The camera could not be acquired; the session records the error
    CameraFailed(CameraError),
}

/// Drives one staff device: session navigation, camera and engine
///
/// Capture is stopped on every exit from [`run_scan`](Self::run_scan). If the
/// scan future itself is dropped, call [`stop_capture`](Self::stop_capture).
pub struct ActivationController<P: CameraPlatform, S: ParticipantStore> {
    session: ActivationSession,
    cameras: CameraSourceManager<P>,
    engine: RedemptionEngine<S>,
    rejections: Option<mpsc::UnboundedSender<ScanOutcome>>,
}

impl<P: CameraPlatform, S: ParticipantStore> ActivationController<P, S> {
    pub fn new(platform: P, store: S) -> Self {
        Self {
            session: ActivationSession::new(),
            cameras: CameraSourceManager::new(platform),
            engine: RedemptionEngine::new(store),
            rejections: None,
        }
    }

    pub fn with_sampling(mut self, config: SamplingConfig) -> Self {
        self.cameras = self.cameras.with_config(config);
        self
    }

    pub fn with_commit_policy(mut self, policy: CommitPolicy) -> Self {
        self.engine = self.engine.with_commit_policy(policy);
        self
    }

    /// Receive unreadable-code outcomes, which do not end a scan
    pub fn with_rejections(mut self, tx: mpsc::UnboundedSender<ScanOutcome>) -> Self {
        self.rejections = Some(tx);
        self
    }

    pub fn session(&self) -> &ActivationSession {
        &self.session
    }

    pub fn cameras(&self) -> &CameraSourceManager<P> {
        &self.cameras
    }

    pub fn engine(&self) -> &RedemptionEngine<S> {
        &self.engine
    }

    pub fn choose_activation(&mut self, activation: ActivationType) -> SessionEvent {
        self.session
            .handle_command(SessionCommand::ChooseActivation(activation))
    }

    /// "Escanear Próximo"
    pub fn scan_next(&mut self) -> SessionEvent {
        let event = self.session.handle_command(SessionCommand::ScanNext);
        if matches!(event, SessionEvent::ScanningResumed { .. }) {
            self.engine.reset();
        }
        event
    }

    /// "Trocar Ativação" from the result screen, or "Voltar" while scanning
    pub async fn change_activation(&mut self) -> SessionEvent {
        self.cameras.stop().await;
        self.engine.reset();
        self.session.handle_command(SessionCommand::ChangeActivation)
    }

    pub async fn stop_capture(&mut self) {
        self.cameras.stop().await;
    }

    /// Enumerate cameras once and run the scanning screen on the chosen
    /// device. Same as [`select_camera`](Self::select_camera) followed by
    /// [`run_scan`](Self::run_scan).
    pub async fn scan(
        &mut self,
        camera: Option<&str>,
        controls: &mut mpsc::Receiver<ScanControl>,
    ) -> Result<ScanExit, SessionError> {
        match self.select_camera(camera).await? {
            Some(device_id) => self.run_scan(&device_id, controls).await,
            None => Ok(ScanExit::CameraFailed(
                self.session
                    .camera_error()
                    .cloned()
                    .unwrap_or(CameraError::NoCameraFound),
            )),
        }
    }

    /// Take this scan's device snapshot and pick the device to open.
    ///
    /// `camera` picks a device by id; unknown or absent ids fall back to the
    /// default camera. `None` means the camera failed and the session now
    /// holds the error. The snapshot stays in
    /// [`cameras().devices()`](CameraSourceManager::devices) for the scan.
    pub async fn select_camera(
        &mut self,
        camera: Option<&str>,
    ) -> Result<Option<String>, SessionError> {
        self.scanning_activation()?;

        if let Err(e) = self.cameras.list_cameras().await {
            self.camera_failed(e);
            return Ok(None);
        }
        let device_id = camera
            .and_then(|wanted| {
                self.cameras
                    .devices()
                    .iter()
                    .find(|device| device.id == wanted)
            })
            .or_else(|| self.cameras.default_camera())
            .map(|device| device.id.clone());
        if device_id.is_none() {
            self.camera_failed(CameraError::NoCameraFound);
        }
        Ok(device_id)
    }

    /// Run the scanning screen on `device_id` until a terminal outcome, a
    /// cancel, or a camera failure
    pub async fn run_scan(
        &mut self,
        device_id: &str,
        controls: &mut mpsc::Receiver<ScanControl>,
    ) -> Result<ScanExit, SessionError> {
        let activation = self.scanning_activation()?;
        self.engine.reset();

        let mut payloads = match self.cameras.start(device_id).await {
            Ok(payloads) => payloads,
            Err(e) => return Ok(self.camera_failed(e)),
        };

        tracing::info!("🔍 Scanning for {} on {}", activation, device_id);

        let exit = loop {
            tokio::select! {
                payload = payloads.recv() => {
                    let Some(payload) = payload else {
                        break self.camera_failed(CameraError::Unavailable(
                            "capture ended".to_string(),
                        ));
                    };
                    let Some(capture) = self.cameras.active_capture() else {
                        continue;
                    };

                    match self.engine.submit(&payload, activation, capture).await {
                        Submission::Processed(outcome) if outcome.is_terminal() => {
                            self.session
                                .handle_command(SessionCommand::RecordOutcome(outcome.clone()));
                            break ScanExit::Outcome(outcome);
                        }
                        Submission::Processed(outcome) => {
                            if let Some(tx) = &self.rejections {
                                let _ = tx.send(outcome);
                            }
                        }
                        Submission::Busy => {}
                    }
                }

                control = controls.recv() => match control {
                    Some(ScanControl::SwitchCamera(next)) => {
                        if self.engine.state().is_processing() || !self.cameras.can_switch() {
                            tracing::debug!("Ignoring camera switch to {}", next);
                            continue;
                        }
                        match self.cameras.switch_to(&next).await {
                            Ok(next_payloads) => payloads = next_payloads,
                            Err(e) => break self.camera_failed(e),
                        }
                    }
                    Some(ScanControl::Cancel) | None => break ScanExit::Cancelled,
                },
            }
        };

        self.cameras.stop().await;
        Ok(exit)
    }

    fn scanning_activation(&self) -> Result<ActivationType, SessionError> {
        match (self.session.activation(), self.session.camera_error()) {
            (Some(activation), None) if self.session.outcome().is_none() => Ok(activation),
            _ => Err(SessionError::InvalidTransition {
                screen: self.session.screen(),
                action: "scan",
            }),
        }
    }

    fn camera_failed(&mut self, error: CameraError) -> ScanExit {
        tracing::warn!("📷 Camera failed: {}", error);
        self.session
            .handle_command(SessionCommand::CameraFailed(error.clone()));
        ScanExit::CameraFailed(error)
    }
}
