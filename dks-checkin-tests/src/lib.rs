use cucumber::World;
use dks_checkin_core::{
    ActivationController, ActivationType, CameraDevice, CommitPolicy, MemoryParticipantStore,
    Participant, ParticipantId, RecordingCapture, SamplingConfig, ScanControl, ScanExit,
    ScanOutcome, ScriptedCameraPlatform, SessionEvent, Submission,
};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

pub type TestController = ActivationController<ScriptedCameraPlatform, Arc<MemoryParticipantStore>>;

/// One staff device against an in-memory participant table
#[derive(World)]
#[world(init = Self::new)]
pub struct CheckinWorld {
    /// Shared participant table (the system's store)
    pub store: Arc<MemoryParticipantStore>,

    /// Cameras the device reports
    pub platform: ScriptedCameraPlatform,

    /// Session, cameras and engine (the system under test)
    pub controller: TestController,

    /// Activation used for direct engine submissions
    pub activation: ActivationType,

    pub commit_policy: CommitPolicy,

    /// Participant identifiers by first name
    pub participants: HashMap<String, ParticipantId>,

    pub last_outcome: Option<ScanOutcome>,
    pub last_exit: Option<ScanExit>,
    pub last_event: Option<SessionEvent>,

    /// Outcomes from devices racing on the same participant
    pub race_outcomes: Vec<ScanOutcome>,
}

impl fmt::Debug for CheckinWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckinWorld")
            .field("session", self.controller.session())
            .field("activation", &self.activation)
            .field("participants", &self.participants)
            .field("last_outcome", &self.last_outcome)
            .field("last_exit", &self.last_exit)
            .field("last_event", &self.last_event)
            .finish()
    }
}

impl CheckinWorld {
    pub fn new() -> Self {
        let store = Arc::new(MemoryParticipantStore::new());
        let platform =
            ScriptedCameraPlatform::new(vec![CameraDevice::new("cam-0", "Back Camera")]);
        Self {
            controller: build_controller(&platform, &store, CommitPolicy::Unconditional),
            store,
            platform,
            activation: ActivationType::DiceGame,
            commit_policy: CommitPolicy::Unconditional,
            participants: HashMap::new(),
            last_outcome: None,
            last_exit: None,
            last_event: None,
            race_outcomes: Vec::new(),
        }
    }

    /// Replace the device's cameras. Starts a fresh session.
    pub fn use_cameras(&mut self, devices: Vec<CameraDevice>) {
        self.platform = ScriptedCameraPlatform::new(devices);
        self.rebuild();
    }

    pub fn use_commit_policy(&mut self, policy: CommitPolicy) {
        self.commit_policy = policy;
        self.rebuild();
    }

    fn rebuild(&mut self) {
        self.controller = build_controller(&self.platform, &self.store, self.commit_policy);
    }

    pub fn add_participant(&mut self, name: &str, id: &str) {
        let id = ParticipantId::parse(id).unwrap_or_else(|e| panic!("bad id {}: {}", id, e));
        self.store.insert(Participant::new(id, name));
        self.participants.insert(name.to_string(), id);
    }

    pub fn participant_id(&self, name: &str) -> ParticipantId {
        *self
            .participants
            .get(name)
            .unwrap_or_else(|| panic!("Participant '{}' not found", name))
    }

    pub fn participant(&self, name: &str) -> Participant {
        self.store
            .get(self.participant_id(name))
            .unwrap_or_else(|| panic!("Participant '{}' not in store", name))
    }

    /// Hand one decoded payload straight to the engine
    pub async fn submit(&mut self, payload: &str) -> &ScanOutcome {
        let engine = self.controller.engine();
        engine.reset();

        match engine
            .submit(payload, self.activation, &RecordingCapture::new())
            .await
        {
            Submission::Processed(outcome) => self.last_outcome.insert(outcome),
            Submission::Busy => panic!("Engine busy after reset"),
        }
    }

    /// Run the scanning screen until it ends on its own
    pub async fn run_scan(&mut self) -> &ScanExit {
        let (_controls_tx, mut controls) = mpsc::channel::<ScanControl>(1);
        let exit = tokio::time::timeout(
            Duration::from_secs(5),
            self.controller.scan(None, &mut controls),
        )
        .await
        .expect("Scan did not finish")
        .expect("Scan refused");

        if let ScanExit::Outcome(outcome) = &exit {
            self.last_outcome = Some(outcome.clone());
        }
        self.last_exit.insert(exit)
    }

    /// Two devices submit the same code at the same moment
    pub async fn race(&mut self, payload: &str) {
        let first = build_controller(&self.platform, &self.store, self.commit_policy);
        let second = build_controller(&self.platform, &self.store, self.commit_policy);
        let activation = self.activation;
        let store = self.store.clone();

        store.hold_requests();
        let release = async {
            while store.fetch_calls() < 2 {
                tokio::task::yield_now().await;
            }
            store.release_requests();
        };

        let (a, b, ()) = tokio::join!(
            submit_once(&first, payload, activation),
            submit_once(&second, payload, activation),
            release
        );
        self.race_outcomes = [a, b]
            .into_iter()
            .filter_map(|submission| match submission {
                Submission::Processed(outcome) => Some(outcome),
                Submission::Busy => None,
            })
            .collect();
    }

    pub fn last_outcome(&self) -> &ScanOutcome {
        self.last_outcome.as_ref().expect("No scan outcome yet")
    }
}

impl Default for CheckinWorld {
    fn default() -> Self {
        Self::new()
    }
}

async fn submit_once(
    controller: &TestController,
    payload: &str,
    activation: ActivationType,
) -> Submission {
    let capture = RecordingCapture::new();
    controller.engine().submit(payload, activation, &capture).await
}

/// Activation named in a scenario ("dice", "puzzle")
pub fn activation(name: &str) -> ActivationType {
    name.parse()
        .unwrap_or_else(|e| panic!("Unknown activation '{}': {}", name, e))
}

fn build_controller(
    platform: &ScriptedCameraPlatform,
    store: &Arc<MemoryParticipantStore>,
    policy: CommitPolicy,
) -> TestController {
    ActivationController::new(platform.clone(), store.clone())
        .with_sampling(SamplingConfig::default().with_attempts_per_second(1000))
        .with_commit_policy(policy)
}
