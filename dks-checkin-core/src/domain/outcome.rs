use crate::domain::{ActivationType, Participant, ParticipantId};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name shown when the scanned code does not resolve to a participant
pub const UNKNOWN_PARTICIPANT: &str = "Desconhecido";

const INVALID_CODE_MESSAGE: &str = "QR Code inválido. Por favor, escaneie um QR Code válido.";
const NOT_FOUND_MESSAGE: &str = "Participante não encontrado no sistema.";
const COMMIT_FAILED_MESSAGE: &str = "Erro ao registrar participação. Tente novamente.";

/// Why a scan did not grant the right to play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RedemptionFailure {
    /// Decoded text is not a participant identifier; scanning continues
    InvalidPayload,
    /// Identifier unknown to the store, or the lookup itself failed
    ParticipantNotFound,
    /// The activation flag was already set
    AlreadyRedeemed,
    /// Writing the flag failed; staff should scan again
    StoreCommunicationFailure,
}

impl fmt::Display for RedemptionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RedemptionFailure::InvalidPayload => write!(f, "invalid payload"),
            RedemptionFailure::ParticipantNotFound => write!(f, "participant not found"),
            RedemptionFailure::AlreadyRedeemed => write!(f, "already redeemed"),
            RedemptionFailure::StoreCommunicationFailure => {
                write!(f, "store communication failure")
            }
        }
    }
}

/// Classification of one scan attempt, shown to staff
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ScanOutcome {
    /// Identifier the scan resolved to (absent for unreadable codes)
    pub participant_id: Option<ParticipantId>,

    /// First name, or "Desconhecido" when unknown
    pub participant_name: String,

    /// Whether the participant may play
    pub eligible: bool,

    /// Staff-facing message
    pub message: String,

    /// Failure class when not eligible
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<RedemptionFailure>,
}

impl ScanOutcome {
    pub fn eligible(participant: &Participant) -> Self {
        Self {
            participant_id: Some(participant.id()),
            participant_name: participant.display_name().to_string(),
            eligible: true,
            message: format!("{} pode jogar!", participant.display_name()),
            failure: None,
        }
    }

    pub fn invalid_payload() -> Self {
        Self {
            participant_id: None,
            participant_name: UNKNOWN_PARTICIPANT.to_string(),
            eligible: false,
            message: INVALID_CODE_MESSAGE.to_string(),
            failure: Some(RedemptionFailure::InvalidPayload),
        }
    }

    pub fn not_found(id: ParticipantId) -> Self {
        Self {
            participant_id: Some(id),
            participant_name: UNKNOWN_PARTICIPANT.to_string(),
            eligible: false,
            message: NOT_FOUND_MESSAGE.to_string(),
            failure: Some(RedemptionFailure::ParticipantNotFound),
        }
    }

    pub fn already_redeemed(participant: &Participant, activation: ActivationType) -> Self {
        Self {
            participant_id: Some(participant.id()),
            participant_name: participant.display_name().to_string(),
            eligible: false,
            message: format!(
                "{} já participou do {}.",
                participant.display_name(),
                activation.label()
            ),
            failure: Some(RedemptionFailure::AlreadyRedeemed),
        }
    }

    pub fn commit_failed(participant: &Participant) -> Self {
        Self {
            participant_id: Some(participant.id()),
            participant_name: participant.display_name().to_string(),
            eligible: false,
            message: COMMIT_FAILED_MESSAGE.to_string(),
            failure: Some(RedemptionFailure::StoreCommunicationFailure),
        }
    }

    /// Whether this outcome ends the scanning screen.
    /// Unreadable codes do not: the camera keeps sampling.
    pub fn is_terminal(&self) -> bool {
        self.failure != Some(RedemptionFailure::InvalidPayload)
    }
}
