use crate::domain::{ActivationType, CameraError, ScanOutcome};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The staff console's sub-screens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Screen {
    SelectType,
    Scanning,
    ShowingResult,
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Screen::SelectType => write!(f, "select type"),
            Screen::Scanning => write!(f, "scanning"),
            Screen::ShowingResult => write!(f, "showing result"),
        }
    }
}

/// Staff actions on the activation console
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// Pick which activation this device verifies
    ChooseActivation(ActivationType),

    /// The camera could not be acquired while scanning
    CameraFailed(CameraError),

    /// A scan produced a terminal outcome
    RecordOutcome(ScanOutcome),

    /// "Escanear Próximo"
    ScanNext,

    /// "Trocar Ativação" / "Voltar"
    ChangeActivation,
}

impl SessionCommand {
    fn name(&self) -> &'static str {
        match self {
            SessionCommand::ChooseActivation(_) => "ChooseActivation",
            SessionCommand::CameraFailed(_) => "CameraFailed",
            SessionCommand::RecordOutcome(_) => "RecordOutcome",
            SessionCommand::ScanNext => "ScanNext",
            SessionCommand::ChangeActivation => "ChangeActivation",
        }
    }
}

/// Events emitted after handling a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    ActivationChosen { activation: ActivationType },

    CameraFailed { error: CameraError },

    OutcomeRecorded { outcome: ScanOutcome },

    ScanningResumed { activation: ActivationType },

    ActivationCleared,

    /// Command rejected in the current screen
    CommandFailed { command: String, reason: String },
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Cannot {action} while on the {screen} screen")]
    InvalidTransition { screen: Screen, action: &'static str },

    #[error("Outcome does not end the scan: {0}")]
    OutcomeNotTerminal(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Stage {
    SelectType,
    Scanning {
        activation: ActivationType,
        camera_error: Option<CameraError>,
    },
    ShowingResult {
        activation: ActivationType,
        outcome: ScanOutcome,
    },
}

/// Navigation state of one staff device
///
/// An outcome only exists on the result screen and an activation exists
/// everywhere except the selection screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationSession {
    stage: Stage,
}

impl Default for ActivationSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivationSession {
    pub fn new() -> Self {
        Self {
            stage: Stage::SelectType,
        }
    }

    pub fn screen(&self) -> Screen {
        match self.stage {
            Stage::SelectType => Screen::SelectType,
            Stage::Scanning { .. } => Screen::Scanning,
            Stage::ShowingResult { .. } => Screen::ShowingResult,
        }
    }

    pub fn activation(&self) -> Option<ActivationType> {
        match &self.stage {
            Stage::SelectType => None,
            Stage::Scanning { activation, .. } | Stage::ShowingResult { activation, .. } => {
                Some(*activation)
            }
        }
    }

    pub fn outcome(&self) -> Option<&ScanOutcome> {
        match &self.stage {
            Stage::ShowingResult { outcome, .. } => Some(outcome),
            _ => None,
        }
    }

    /// Camera failure shown on the scanning screen
    pub fn camera_error(&self) -> Option<&CameraError> {
        match &self.stage {
            Stage::Scanning { camera_error, .. } => camera_error.as_ref(),
            _ => None,
        }
    }

    /// Apply a command, reporting rejections as `CommandFailed`
    pub fn handle_command(&mut self, command: SessionCommand) -> SessionEvent {
        let name = command.name();
        match self.apply(command) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!("Session rejected {}: {}", name, e);
                SessionEvent::CommandFailed {
                    command: name.to_string(),
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Apply a command, leaving the session untouched on error
    pub fn apply(&mut self, command: SessionCommand) -> Result<SessionEvent, SessionError> {
        let screen = self.screen();

        let (next, event) = match (&self.stage, command) {
            (Stage::SelectType, SessionCommand::ChooseActivation(activation)) => (
                Stage::Scanning {
                    activation,
                    camera_error: None,
                },
                SessionEvent::ActivationChosen { activation },
            ),

            (Stage::Scanning { activation, .. }, SessionCommand::CameraFailed(error)) => (
                Stage::Scanning {
                    activation: *activation,
                    camera_error: Some(error.clone()),
                },
                SessionEvent::CameraFailed { error },
            ),

            (Stage::Scanning { activation, .. }, SessionCommand::RecordOutcome(outcome)) => {
                if !outcome.is_terminal() {
                    return Err(SessionError::OutcomeNotTerminal(outcome.message));
                }
                (
                    Stage::ShowingResult {
                        activation: *activation,
                        outcome: outcome.clone(),
                    },
                    SessionEvent::OutcomeRecorded { outcome },
                )
            }

            (Stage::ShowingResult { activation, .. }, SessionCommand::ScanNext) => (
                Stage::Scanning {
                    activation: *activation,
                    camera_error: None,
                },
                SessionEvent::ScanningResumed {
                    activation: *activation,
                },
            ),

            (
                Stage::Scanning { .. } | Stage::ShowingResult { .. },
                SessionCommand::ChangeActivation,
            ) => (Stage::SelectType, SessionEvent::ActivationCleared),

            (_, command) => {
                return Err(SessionError::InvalidTransition {
                    screen,
                    action: command.name(),
                })
            }
        };

        tracing::debug!("Session {} -> {:?}", screen, next);
        self.stage = next;
        Ok(event)
    }
}
