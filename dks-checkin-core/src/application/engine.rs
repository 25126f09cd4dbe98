use crate::domain::{ActivationType, Participant, ParticipantId, ScanOutcome};
use crate::traits::{CaptureControl, ConditionalWrite, ParticipantStore};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Final classification held until the engine is reset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    Eligible,
    Ineligible,
}

/// Redemption state machine
///
/// `Idle -> Validating -> Committing -> Resolved`. Only `Idle` accepts a
/// payload; an unreadable code goes straight back to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineState {
    Idle,
    Validating,
    Committing,
    Resolved(Resolution),
}

impl EngineState {
    /// True while a payload is being verified against the store
    pub fn is_processing(&self) -> bool {
        matches!(self, EngineState::Validating | EngineState::Committing)
    }
}

/// How the activation flag is written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CommitPolicy {
    /// Plain write after the read check
    #[default]
    Unconditional,
    /// "Set if still false" write; a lost race counts as already redeemed
    Conditional,
}

/// Result of handing a payload to the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Processed(ScanOutcome),
    /// Another payload is in flight or awaiting reset; this one was dropped
    Busy,
}

/// Validates scanned payloads and consumes the participant's right to play
pub struct RedemptionEngine<S: ParticipantStore> {
    store: S,
    policy: CommitPolicy,
    state: watch::Sender<EngineState>,
}

impl<S: ParticipantStore> RedemptionEngine<S> {
    pub fn new(store: S) -> Self {
        let (state, _) = watch::channel(EngineState::Idle);
        Self {
            store,
            policy: CommitPolicy::default(),
            state,
        }
    }

    pub fn with_commit_policy(mut self, policy: CommitPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn commit_policy(&self) -> CommitPolicy {
        self.policy
    }

    pub fn state(&self) -> EngineState {
        *self.state.borrow()
    }

    /// Watch state changes (e.g. to show "Verificando participante...")
    pub fn subscribe(&self) -> watch::Receiver<EngineState> {
        self.state.subscribe()
    }

    /// Leave `Resolved` so the next payload is accepted.
    /// Returns false when there was nothing to reset.
    #[tracing::instrument(skip(self))]
    pub fn reset(&self) -> bool {
        self.state.send_if_modified(|state| {
            if matches!(state, EngineState::Resolved(_)) {
                *state = EngineState::Idle;
                true
            } else {
                false
            }
        })
    }

    /// Process one decoded payload for `activation`
    ///
    /// Never fails: store and transport errors become ineligible outcomes.
    /// A well-formed identifier stops `capture` before the store is queried.
    #[tracing::instrument(skip(self, capture))]
    pub async fn submit(
        &self,
        payload: &str,
        activation: ActivationType,
        capture: &dyn CaptureControl,
    ) -> Submission {
        let accepted = self.state.send_if_modified(|state| {
            if *state == EngineState::Idle {
                *state = EngineState::Validating;
                true
            } else {
                false
            }
        });
        if !accepted {
            tracing::debug!("Engine busy ({:?}), dropping payload", self.state());
            return Submission::Busy;
        }

        // Puts the engine back to Idle if this future is dropped mid-flight
        let mut in_flight = InFlight::new(&self.state);

        let id = match ParticipantId::parse(payload) {
            Ok(id) => id,
            Err(e) => {
                tracing::info!("❌ Rejected scanned code: {}", e);
                in_flight.finish(EngineState::Idle);
                return Submission::Processed(ScanOutcome::invalid_payload());
            }
        };

        capture.stop_capture().await;

        let participant = match self.store.fetch_by_identifier(id).await {
            Ok(Some(participant)) => participant,
            Ok(None) => {
                tracing::info!("❌ Participant {} not found", id);
                return self.resolve(in_flight, ScanOutcome::not_found(id));
            }
            Err(e) => {
                tracing::warn!("⚠️ Lookup of {} failed: {}", id, e);
                return self.resolve(in_flight, ScanOutcome::not_found(id));
            }
        };

        if participant.has_played(activation) {
            tracing::info!(
                "❌ {} already played {}",
                participant.display_name(),
                activation
            );
            return self.resolve(
                in_flight,
                ScanOutcome::already_redeemed(&participant, activation),
            );
        }

        self.state.send_replace(EngineState::Committing);
        let outcome = self.commit(&participant, activation).await;
        self.resolve(in_flight, outcome)
    }

    async fn commit(&self, participant: &Participant, activation: ActivationType) -> ScanOutcome {
        let id = participant.id();
        let flag = activation.flag();

        let result = match self.policy {
            CommitPolicy::Unconditional => self
                .store
                .update_flag(id, flag)
                .await
                .map(|_| ConditionalWrite::Applied),
            CommitPolicy::Conditional => self.store.set_flag_if_unset(id, flag).await,
        };

        match result {
            Ok(ConditionalWrite::Applied) => {
                tracing::info!("✅ {} may play {}", participant.display_name(), activation);
                ScanOutcome::eligible(participant)
            }
            Ok(ConditionalWrite::NotApplied) => {
                tracing::info!(
                    "❌ {} redeemed {} concurrently elsewhere",
                    participant.display_name(),
                    activation
                );
                ScanOutcome::already_redeemed(participant, activation)
            }
            Err(e) => {
                tracing::error!("Failed to set {} for {}: {}", flag, id, e);
                ScanOutcome::commit_failed(participant)
            }
        }
    }

    fn resolve(&self, mut in_flight: InFlight<'_>, outcome: ScanOutcome) -> Submission {
        let resolution = if outcome.eligible {
            Resolution::Eligible
        } else {
            Resolution::Ineligible
        };
        in_flight.finish(EngineState::Resolved(resolution));
        Submission::Processed(outcome)
    }
}

struct InFlight<'a> {
    state: &'a watch::Sender<EngineState>,
    finished: bool,
}

impl<'a> InFlight<'a> {
    fn new(state: &'a watch::Sender<EngineState>) -> Self {
        Self {
            state,
            finished: false,
        }
    }

    fn finish(&mut self, next: EngineState) {
        self.finished = true;
        self.state.send_replace(next);
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.finished {
            tracing::debug!("Submission abandoned, engine back to Idle");
            self.state.send_replace(EngineState::Idle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RedemptionFailure;
    use crate::infrastructure::{MemoryParticipantStore, RecordingCapture};
    use std::sync::Arc;
    use std::time::Duration;

    const ANA: &str = "3f2b8c1e-9a4d-4e7b-8c21-5d6f7a8b9c0d";

    fn ana_id() -> ParticipantId {
        ParticipantId::parse(ANA).unwrap()
    }

    fn engine_with(participants: Vec<Participant>) -> RedemptionEngine<Arc<MemoryParticipantStore>> {
        RedemptionEngine::new(Arc::new(MemoryParticipantStore::with_participants(
            participants,
        )))
    }

    async fn submit(
        engine: &RedemptionEngine<Arc<MemoryParticipantStore>>,
        payload: &str,
        activation: ActivationType,
    ) -> ScanOutcome {
        engine.reset();
        match engine
            .submit(payload, activation, &RecordingCapture::new())
            .await
        {
            Submission::Processed(outcome) => outcome,
            Submission::Busy => panic!("engine unexpectedly busy"),
        }
    }

    #[tokio::test]
    async fn test_invalid_payload_keeps_scanning() {
        let engine = engine_with(vec![]);
        let capture = RecordingCapture::new();

        let submission = engine
            .submit("not-a-uuid", ActivationType::Puzzle, &capture)
            .await;

        let Submission::Processed(outcome) = submission else {
            panic!("expected an outcome");
        };
        assert!(!outcome.eligible);
        assert!(outcome.message.contains("inválido"));
        assert_eq!(outcome.failure, Some(RedemptionFailure::InvalidPayload));
        assert_eq!(engine.state(), EngineState::Idle);
        assert_eq!(capture.stop_count(), 0);
        assert_eq!(engine.store().fetch_calls(), 0);
        assert_eq!(engine.store().update_calls(), 0);
    }

    #[tokio::test]
    async fn test_unknown_participant_is_not_found() {
        let engine = engine_with(vec![]);

        let outcome = submit(
            &engine,
            "11111111-1111-1111-1111-111111111111",
            ActivationType::DiceGame,
        )
        .await;

        assert!(!outcome.eligible);
        assert!(outcome.message.contains("não encontrado"));
        assert_eq!(outcome.participant_name, "Desconhecido");
        assert_eq!(engine.store().update_calls(), 0);
        assert_eq!(engine.state(), EngineState::Resolved(Resolution::Ineligible));
    }

    #[tokio::test]
    async fn test_lookup_failure_is_reported_as_not_found() {
        let engine = engine_with(vec![Participant::new(ana_id(), "Ana")]);
        engine.store().fail_fetches(true);

        let outcome = submit(&engine, ANA, ActivationType::Puzzle).await;

        assert_eq!(outcome.failure, Some(RedemptionFailure::ParticipantNotFound));
        assert_eq!(engine.store().update_calls(), 0);
    }

    #[tokio::test]
    async fn test_valid_payload_stops_capture_before_lookup() {
        let engine = engine_with(vec![Participant::new(ana_id(), "Ana")]);
        let capture = RecordingCapture::new();

        engine.submit(ANA, ActivationType::Puzzle, &capture).await;

        assert_eq!(capture.stop_count(), 1);
    }

    #[tokio::test]
    async fn test_first_scan_is_eligible_second_is_already_redeemed() {
        let engine = engine_with(vec![Participant::new(ana_id(), "Ana")]);

        let first = submit(&engine, ANA, ActivationType::Puzzle).await;
        let second = submit(&engine, ANA, ActivationType::Puzzle).await;

        assert!(first.eligible);
        assert!(first.message.contains("Ana"));
        assert!(!second.eligible);
        assert!(second.message.contains("já participou"));
        assert_eq!(engine.store().update_calls(), 1);
        assert!(engine
            .store()
            .get(ana_id())
            .unwrap()
            .has_played(ActivationType::Puzzle));
    }

    #[tokio::test]
    async fn test_flags_are_independent_per_activation() {
        let engine = engine_with(vec![
            Participant::new(ana_id(), "Ana").with_played(ActivationType::DiceGame, true)
        ]);

        let outcome = submit(&engine, ANA, ActivationType::Puzzle).await;

        assert!(outcome.eligible);
    }

    #[tokio::test]
    async fn test_already_played_never_writes() {
        let engine = engine_with(vec![
            Participant::new(ana_id(), "Ana").with_played(ActivationType::DiceGame, true)
        ]);

        let outcome = submit(&engine, ANA, ActivationType::DiceGame).await;

        assert_eq!(outcome.message, "Ana já participou do Jogo de Dados.");
        assert_eq!(engine.store().update_calls(), 0);
    }

    #[tokio::test]
    async fn test_rejected_update_leaves_flag_unchanged() {
        let engine = engine_with(vec![Participant::new(ana_id(), "Ana")]);
        engine.store().fail_updates(true);

        let outcome = submit(&engine, ANA, ActivationType::Puzzle).await;

        assert!(!outcome.eligible);
        assert!(outcome.message.contains("Tente novamente"));
        assert_eq!(
            outcome.failure,
            Some(RedemptionFailure::StoreCommunicationFailure)
        );
        assert!(!engine
            .store()
            .get(ana_id())
            .unwrap()
            .has_played(ActivationType::Puzzle));
    }

    #[tokio::test]
    async fn test_resolved_engine_ignores_payloads_until_reset() {
        let engine = engine_with(vec![Participant::new(ana_id(), "Ana")]);
        let capture = RecordingCapture::new();

        engine.submit(ANA, ActivationType::Puzzle, &capture).await;
        let again = engine.submit(ANA, ActivationType::Puzzle, &capture).await;

        assert_eq!(again, Submission::Busy);
        assert!(engine.reset());
        assert!(!engine.reset());
        assert_eq!(engine.state(), EngineState::Idle);
    }

    #[tokio::test]
    async fn test_payloads_during_validation_are_dropped() {
        let engine = Arc::new(engine_with(vec![Participant::new(ana_id(), "Ana")]));
        let capture = Arc::new(RecordingCapture::new());
        engine.store().hold_requests();

        let mut states = engine.subscribe();
        let first = tokio::spawn({
            let engine = engine.clone();
            let capture = capture.clone();
            async move {
                engine
                    .submit(ANA, ActivationType::Puzzle, capture.as_ref())
                    .await
            }
        });

        tokio::time::timeout(
            Duration::from_secs(1),
            states.wait_for(|state| *state == EngineState::Validating),
        )
        .await
        .unwrap()
        .unwrap();

        let second = engine
            .submit(ANA, ActivationType::Puzzle, capture.as_ref())
            .await;
        assert_eq!(second, Submission::Busy);

        engine.store().release_requests();
        let first = first.await.unwrap();

        assert!(matches!(first, Submission::Processed(ref o) if o.eligible));
        assert_eq!(engine.store().fetch_calls(), 1);
        assert_eq!(engine.store().update_calls(), 1);
    }

    #[tokio::test]
    async fn test_conditional_commit_reports_lost_race() {
        let store = Arc::new(MemoryParticipantStore::with_participants([
            Participant::new(ana_id(), "Ana"),
        ]));
        let engine =
            RedemptionEngine::new(store.clone()).with_commit_policy(CommitPolicy::Conditional);
        let other_device =
            RedemptionEngine::new(store.clone()).with_commit_policy(CommitPolicy::Conditional);

        // Both devices read the flag as false before either writes
        store.hold_requests();
        let capture = Arc::new(RecordingCapture::new());
        let engine = Arc::new(engine);
        let other_device = Arc::new(other_device);
        let a = tokio::spawn({
            let (engine, capture) = (engine.clone(), capture.clone());
            async move {
                engine
                    .submit(ANA, ActivationType::DiceGame, capture.as_ref())
                    .await
            }
        });
        let b = tokio::spawn({
            let (engine, capture) = (other_device.clone(), capture.clone());
            async move {
                engine
                    .submit(ANA, ActivationType::DiceGame, capture.as_ref())
                    .await
            }
        });
        tokio::time::timeout(Duration::from_secs(1), async {
            while store.fetch_calls() < 2 {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();
        store.release_requests();

        let outcomes = [a.await.unwrap(), b.await.unwrap()];
        let eligible = outcomes
            .iter()
            .filter(|s| matches!(s, Submission::Processed(o) if o.eligible))
            .count();

        assert_eq!(eligible, 1);
        assert_eq!(store.update_calls(), 2);
    }

    #[tokio::test]
    async fn test_abandoned_submission_returns_to_idle() {
        let engine = engine_with(vec![Participant::new(ana_id(), "Ana")]);
        engine.store().hold_requests();
        let capture = RecordingCapture::new();

        let result = tokio::time::timeout(
            Duration::from_millis(20),
            engine.submit(ANA, ActivationType::Puzzle, &capture),
        )
        .await;

        assert!(result.is_err());
        assert_eq!(engine.state(), EngineState::Idle);
    }
}
