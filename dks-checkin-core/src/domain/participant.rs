use crate::domain::{ActivationType, ParticipantId};
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A registered festival participant, as held by the participant store
///
/// Created by the registration flow. The check-in workflow only reads it
/// and flips one "has played" flag from false to true; the flags are never
/// reset here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Participant {
    /// Identifier printed on the participant's QR code
    id: ParticipantId,
    /// First name shown to staff
    display_name: String,
    /// Contact email (unused by check-in)
    email: Option<String>,
    /// Contact phone (unused by check-in)
    phone: Option<i64>,
    /// Whether the registration gift was handed out (unused by check-in)
    prize_claimed: bool,
    has_played_dice_game: bool,
    has_played_puzzle: bool,
    /// When the participant registered
    registered_at: Option<DateTime<Utc>>,
}

impl Participant {
    /// Create a participant who has not played anything yet
    pub fn new(id: ParticipantId, display_name: impl Into<String>) -> Self {
        Participant {
            id,
            display_name: display_name.into(),
            email: None,
            phone: None,
            prize_claimed: false,
            has_played_dice_game: false,
            has_played_puzzle: false,
            registered_at: None,
        }
    }

    pub fn with_played(mut self, activation: ActivationType, played: bool) -> Self {
        match activation {
            ActivationType::DiceGame => self.has_played_dice_game = played,
            ActivationType::Puzzle => self.has_played_puzzle = played,
        }
        self
    }

    pub fn with_contact(mut self, email: Option<String>, phone: Option<i64>) -> Self {
        self.email = email;
        self.phone = phone;
        self
    }

    pub fn with_prize_claimed(mut self, claimed: bool) -> Self {
        self.prize_claimed = claimed;
        self
    }

    pub fn with_registered_at(mut self, registered_at: Option<DateTime<Utc>>) -> Self {
        self.registered_at = registered_at;
        self
    }

    // Getters

    pub fn id(&self) -> ParticipantId {
        self.id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn phone(&self) -> Option<i64> {
        self.phone
    }

    pub fn prize_claimed(&self) -> bool {
        self.prize_claimed
    }

    pub fn has_played_dice_game(&self) -> bool {
        self.has_played_dice_game
    }

    pub fn has_played_puzzle(&self) -> bool {
        self.has_played_puzzle
    }

    pub fn registered_at(&self) -> Option<DateTime<Utc>> {
        self.registered_at
    }

    /// Whether the right to play `activation` was already consumed
    pub fn has_played(&self, activation: ActivationType) -> bool {
        match activation {
            ActivationType::DiceGame => self.has_played_dice_game,
            ActivationType::Puzzle => self.has_played_puzzle,
        }
    }

    /// Consume the right to play `activation`. Flags only ever go false -> true.
    pub fn mark_played(&mut self, activation: ActivationType) {
        match activation {
            ActivationType::DiceGame => self.has_played_dice_game = true,
            ActivationType::Puzzle => self.has_played_puzzle = true,
        }
    }
}
