use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A gated single-play game run at the festival
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ActivationType {
    /// Jogo de Dados
    DiceGame,
    /// Quebra-Cabeça
    Puzzle,
}

/// The participant flag consumed by an activation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum ActivationFlag {
    HasPlayedDiceGame,
    HasPlayedPuzzle,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Unknown activation '{0}' (expected 'dice' or 'puzzle')")]
pub struct UnknownActivation(pub String);

impl ActivationType {
    /// Every activation, in the order staff are offered them
    pub const ALL: [ActivationType; 2] = [ActivationType::DiceGame, ActivationType::Puzzle];

    /// Staff-facing label
    pub fn label(&self) -> &'static str {
        match self {
            ActivationType::DiceGame => "Jogo de Dados",
            ActivationType::Puzzle => "Quebra-Cabeça",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            ActivationType::DiceGame => "🎲",
            ActivationType::Puzzle => "🧩",
        }
    }

    pub fn flag(&self) -> ActivationFlag {
        match self {
            ActivationType::DiceGame => ActivationFlag::HasPlayedDiceGame,
            ActivationType::Puzzle => ActivationFlag::HasPlayedPuzzle,
        }
    }
}

impl fmt::Display for ActivationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for ActivationType {
    type Err = UnknownActivation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dice" | "dice_game" | "dice-game" | "dados" => Ok(ActivationType::DiceGame),
            "puzzle" | "quebra_cabeca" | "quebra-cabeca" => Ok(ActivationType::Puzzle),
            other => Err(UnknownActivation(other.to_string())),
        }
    }
}

impl ActivationFlag {
    pub fn activation(&self) -> ActivationType {
        match self {
            ActivationFlag::HasPlayedDiceGame => ActivationType::DiceGame,
            ActivationFlag::HasPlayedPuzzle => ActivationType::Puzzle,
        }
    }
}

impl fmt::Display for ActivationFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivationFlag::HasPlayedDiceGame => write!(f, "hasPlayedDiceGame"),
            ActivationFlag::HasPlayedPuzzle => write!(f, "hasPlayedPuzzle"),
        }
    }
}
