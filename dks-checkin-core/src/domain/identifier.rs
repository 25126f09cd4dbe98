use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Length of the canonical hyphenated form (8-4-4-4-12)
const CANONICAL_LEN: usize = 36;

/// Positions of the hyphens in the canonical form
const HYPHEN_POSITIONS: [usize; 4] = [8, 13, 18, 23];

/// Identifier of a registered participant, as printed on their QR code
///
/// Only the 36-character hyphenated form is accepted. Braced, URN and
/// unhyphenated spellings that `Uuid::parse_str` would take are rejected,
/// since a QR code carrying them was not issued by the registration flow.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct ParticipantId(Uuid);

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum IdentifierError {
    #[error("Expected 36 characters, got {0}")]
    InvalidLength(usize),

    #[error("Expected '-' at position {0}")]
    MissingHyphen(usize),

    #[error("Invalid hex character {found:?} at position {position}")]
    InvalidCharacter { position: usize, found: char },
}

impl ParticipantId {
    /// Validate a decoded payload and turn it into an identifier
    pub fn parse(payload: &str) -> Result<Self, IdentifierError> {
        let chars: Vec<char> = payload.chars().collect();
        if chars.len() != CANONICAL_LEN {
            return Err(IdentifierError::InvalidLength(chars.len()));
        }

        for (position, &c) in chars.iter().enumerate() {
            if HYPHEN_POSITIONS.contains(&position) {
                if c != '-' {
                    return Err(IdentifierError::MissingHyphen(position));
                }
            } else if !c.is_ascii_hexdigit() {
                return Err(IdentifierError::InvalidCharacter { position, found: c });
            }
        }

        // Shape is checked above, so the uuid parser cannot disagree
        Uuid::parse_str(payload)
            .map(ParticipantId)
            .map_err(|_| IdentifierError::InvalidLength(chars.len()))
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        ParticipantId(uuid)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl FromStr for ParticipantId {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Lowercase hyphenated
        write!(f, "{}", self.0.hyphenated())
    }
}

impl From<Uuid> for ParticipantId {
    fn from(uuid: Uuid) -> Self {
        ParticipantId(uuid)
    }
}
