use crate::domain::{ActivationType, ScanOutcome};
use serde::Serialize;

pub const SCAN_NEXT_ACTION: &str = "Escanear Próximo";
pub const CHANGE_ACTIVATION_ACTION: &str = "← Trocar Ativação";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Treatment {
    Success,
    Failure,
}

impl Treatment {
    pub fn icon(&self) -> &'static str {
        match self {
            Treatment::Success => "✅",
            Treatment::Failure => "❌",
        }
    }
}

/// Everything the result screen shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultView {
    pub treatment: Treatment,
    pub headline: String,
    pub message: String,
    pub activation_icon: &'static str,
    pub activation_label: &'static str,
    pub actions: [&'static str; 2],
}

/// Build the result screen. The treatment depends only on eligibility.
pub fn present(outcome: &ScanOutcome, activation: ActivationType) -> ResultView {
    let treatment = if outcome.eligible {
        Treatment::Success
    } else {
        Treatment::Failure
    };

    ResultView {
        treatment,
        headline: outcome.participant_name.clone(),
        message: outcome.message.clone(),
        activation_icon: activation.icon(),
        activation_label: activation.label(),
        actions: [SCAN_NEXT_ACTION, CHANGE_ACTIVATION_ACTION],
    }
}
