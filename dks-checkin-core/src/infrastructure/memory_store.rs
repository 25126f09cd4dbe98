use crate::domain::{ActivationFlag, Participant, ParticipantId};
use crate::traits::{ConditionalWrite, ParticipantStore, StoreError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::Semaphore;

/// Participant store kept in memory
///
/// Used by tests and offline demos. Counts every call and can be told to
/// fail, or to hold requests until released, to exercise the engine's
/// error and concurrency paths.
#[derive(Debug, Default)]
pub struct MemoryParticipantStore {
    participants: Mutex<HashMap<ParticipantId, Participant>>,
    fetch_calls: AtomicUsize,
    update_calls: AtomicUsize,
    fail_fetches: AtomicBool,
    fail_updates: AtomicBool,
    gate: Mutex<Option<Arc<Semaphore>>>,
}

impl MemoryParticipantStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_participants(participants: impl IntoIterator<Item = Participant>) -> Self {
        let store = Self::new();
        for participant in participants {
            store.insert(participant);
        }
        store
    }

    fn records(&self) -> MutexGuard<'_, HashMap<ParticipantId, Participant>> {
        self.participants.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn insert(&self, participant: Participant) {
        self.records().insert(participant.id(), participant);
    }

    pub fn get(&self, id: ParticipantId) -> Option<Participant> {
        self.records().get(&id).cloned()
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    /// Unconditional and conditional writes combined
    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    /// Simulate transport failures on reads
    pub fn fail_fetches(&self, fail: bool) {
        self.fail_fetches.store(fail, Ordering::SeqCst);
    }

    /// Simulate the store rejecting writes
    pub fn fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }

    /// Park every request until [`release_requests`](Self::release_requests)
    pub fn hold_requests(&self) {
        *self.gate.lock().unwrap_or_else(|e| e.into_inner()) = Some(Arc::new(Semaphore::new(0)));
    }

    /// Let held (and future) requests through
    pub fn release_requests(&self) {
        let gate = self.gate.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(gate) = gate {
            gate.close();
        }
    }

    async fn pass_gate(&self) {
        let gate = self.gate.lock().unwrap_or_else(|e| e.into_inner()).clone();
        if let Some(gate) = gate {
            // Closing the semaphore is what releases waiters
            let _ = gate.acquire().await;
        }
    }

    fn write_flag(&self, id: ParticipantId, flag: ActivationFlag, only_if_unset: bool) -> bool {
        let mut records = self.records();
        match records.get_mut(&id) {
            Some(participant) => {
                let activation = flag.activation();
                if only_if_unset && participant.has_played(activation) {
                    return false;
                }
                participant.mark_played(activation);
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl ParticipantStore for MemoryParticipantStore {
    async fn fetch_by_identifier(
        &self,
        id: ParticipantId,
    ) -> Result<Option<Participant>, StoreError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        // Read on arrival; held lookups answer with what they saw then
        let found = self.get(id);
        self.pass_gate().await;

        if self.fail_fetches.load(Ordering::SeqCst) {
            return Err(StoreError::Transport("connection reset".to_string()));
        }
        Ok(found)
    }

    async fn update_flag(&self, id: ParticipantId, flag: ActivationFlag) -> Result<(), StoreError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        self.pass_gate().await;

        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(StoreError::Status {
                status: 503,
                body: "service unavailable".to_string(),
            });
        }
        // An update matching no row is not an error for a filtered write
        self.write_flag(id, flag, false);
        Ok(())
    }

    async fn set_flag_if_unset(
        &self,
        id: ParticipantId,
        flag: ActivationFlag,
    ) -> Result<ConditionalWrite, StoreError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        self.pass_gate().await;

        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(StoreError::Status {
                status: 503,
                body: "service unavailable".to_string(),
            });
        }
        if self.write_flag(id, flag, true) {
            Ok(ConditionalWrite::Applied)
        } else {
            Ok(ConditionalWrite::NotApplied)
        }
    }
}
