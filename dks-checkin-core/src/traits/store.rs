use crate::domain::{ActivationFlag, Participant, ParticipantId};
use async_trait::async_trait;
use std::sync::Arc;

/// Result of a conditional "set flag if still false" write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionalWrite {
    /// The flag was false and is now true
    Applied,
    /// The flag was already true (or the row vanished); nothing changed
    NotApplied,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store request failed: {0}")]
    Transport(String),

    #[error("Store rejected request with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed store response: {0}")]
    Decode(String),

    #[error("Conditional writes are not supported by this store")]
    Unsupported,
}

/// The remote participant record store (implemented by adapters)
#[async_trait]
pub trait ParticipantStore: Send + Sync {
    /// Read one participant; `Ok(None)` when no record has this identifier
    async fn fetch_by_identifier(
        &self,
        id: ParticipantId,
    ) -> Result<Option<Participant>, StoreError>;

    /// Set `flag` to true on the single record with this identifier
    async fn update_flag(&self, id: ParticipantId, flag: ActivationFlag) -> Result<(), StoreError>;

    /// Set `flag` to true only if it is currently false (optional)
    async fn set_flag_if_unset(
        &self,
        id: ParticipantId,
        flag: ActivationFlag,
    ) -> Result<ConditionalWrite, StoreError> {
        let _ = (id, flag);
        Err(StoreError::Unsupported)
    }
}

#[async_trait]
impl<T: ParticipantStore + ?Sized> ParticipantStore for Arc<T> {
    async fn fetch_by_identifier(
        &self,
        id: ParticipantId,
    ) -> Result<Option<Participant>, StoreError> {
        (**self).fetch_by_identifier(id).await
    }

    async fn update_flag(&self, id: ParticipantId, flag: ActivationFlag) -> Result<(), StoreError> {
        (**self).update_flag(id, flag).await
    }

    async fn set_flag_if_unset(
        &self,
        id: ParticipantId,
        flag: ActivationFlag,
    ) -> Result<ConditionalWrite, StoreError> {
        (**self).set_flag_if_unset(id, flag).await
    }
}
