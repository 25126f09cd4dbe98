//! Row shape of the participant table.

use chrono::{DateTime, Utc};
use dks_checkin_core::{ActivationFlag, ActivationType, Participant, ParticipantId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One row of `participantes_dksfestival`
///
/// Nullable columns default rather than fail; unknown columns are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantRow {
    pub uuid: Uuid,
    pub primeiro_nome: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub telefone: Option<i64>,
    #[serde(default)]
    pub brinde_recebido: Option<bool>,
    #[serde(default)]
    pub jogou_quebra_cabeca: Option<bool>,
    #[serde(default)]
    pub jogou_jogo_dados: Option<bool>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<ParticipantRow> for Participant {
    fn from(row: ParticipantRow) -> Self {
        Participant::new(ParticipantId::from_uuid(row.uuid), row.primeiro_nome)
            .with_contact(row.email, row.telefone)
            .with_prize_claimed(row.brinde_recebido.unwrap_or(false))
            .with_played(
                ActivationType::Puzzle,
                row.jogou_quebra_cabeca.unwrap_or(false),
            )
            .with_played(
                ActivationType::DiceGame,
                row.jogou_jogo_dados.unwrap_or(false),
            )
            .with_registered_at(row.created_at)
    }
}

/// Column backing an activation flag
pub fn flag_column(flag: ActivationFlag) -> &'static str {
    match flag {
        ActivationFlag::HasPlayedDiceGame => "jogou_jogo_dados",
        ActivationFlag::HasPlayedPuzzle => "jogou_quebra_cabeca",
    }
}
