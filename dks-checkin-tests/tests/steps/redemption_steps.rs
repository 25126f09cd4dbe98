use cucumber::{given, then, when};
use dks_checkin_core::CommitPolicy;
use dks_checkin_tests::{activation, CheckinWorld};

// ===== Given Steps =====

#[given(expr = "a participant {string} with identifier {string}")]
async fn participant_exists(world: &mut CheckinWorld, name: String, id: String) {
    world.add_participant(&name, &id);
}

#[given(expr = "staff are checking {string}")]
async fn staff_are_checking(world: &mut CheckinWorld, name: String) {
    world.activation = activation(&name);
}

#[given(expr = "{string} has already played {string}")]
async fn already_played(world: &mut CheckinWorld, name: String, played: String) {
    let participant = world
        .participant(&name)
        .with_played(activation(&played), true);
    world.store.insert(participant);
}

#[given("the store rejects updates")]
async fn store_rejects_updates(world: &mut CheckinWorld) {
    world.store.fail_updates(true);
}

#[given("the store is unreachable")]
async fn store_unreachable(world: &mut CheckinWorld) {
    world.store.fail_fetches(true);
}

#[given("conditional commit is enabled")]
async fn conditional_commit(world: &mut CheckinWorld) {
    world.use_commit_policy(CommitPolicy::Conditional);
}

// ===== When Steps =====

#[when(expr = "the code {string} is scanned")]
async fn code_is_scanned(world: &mut CheckinWorld, code: String) {
    world.submit(&code).await;
}

#[when(expr = "the code of {string} is scanned")]
async fn participant_code_is_scanned(world: &mut CheckinWorld, name: String) {
    let code = world.participant_id(&name).to_string();
    world.submit(&code).await;
}

#[when(expr = "two devices scan the code of {string} at the same time")]
async fn two_devices_scan(world: &mut CheckinWorld, name: String) {
    let code = world.participant_id(&name).to_string();
    world.race(&code).await;
}

// ===== Then Steps =====

#[then("the participant is eligible")]
async fn participant_is_eligible(world: &mut CheckinWorld) {
    let outcome = world.last_outcome();
    assert!(outcome.eligible, "Expected eligible, got {:?}", outcome);
}

#[then("the participant is not eligible")]
async fn participant_is_not_eligible(world: &mut CheckinWorld) {
    let outcome = world.last_outcome();
    assert!(!outcome.eligible, "Expected not eligible, got {:?}", outcome);
}

#[then(expr = "the message contains {string}")]
async fn message_contains(world: &mut CheckinWorld, text: String) {
    let message = &world.last_outcome().message;
    assert!(
        message.contains(&text),
        "Message '{}' should contain '{}'",
        message,
        text
    );
}

#[then("the store was not queried")]
async fn store_not_queried(world: &mut CheckinWorld) {
    assert_eq!(world.store.fetch_calls(), 0);
    assert_eq!(world.store.update_calls(), 0);
}

#[then("no flag was written")]
async fn no_flag_written(world: &mut CheckinWorld) {
    assert_eq!(world.store.update_calls(), 0);
}

#[then(expr = "{int} flag write(s) was/were made")]
async fn flag_writes_made(world: &mut CheckinWorld, count: usize) {
    assert_eq!(world.store.update_calls(), count);
}

#[then(expr = "{string} has played {string}")]
async fn has_played(world: &mut CheckinWorld, name: String, played: String) {
    assert!(world.participant(&name).has_played(activation(&played)));
}

#[then(expr = "{string} has not played {string}")]
async fn has_not_played(world: &mut CheckinWorld, name: String, played: String) {
    assert!(!world.participant(&name).has_played(activation(&played)));
}

#[then(expr = "exactly {int} device(s) grant(s) the play")]
async fn devices_grant(world: &mut CheckinWorld, count: usize) {
    assert_eq!(world.race_outcomes.len(), 2, "Both devices should finish");
    let granted = world
        .race_outcomes
        .iter()
        .filter(|outcome| outcome.eligible)
        .count();
    assert_eq!(granted, count);
}

#[then(expr = "the other device reports {string}")]
async fn other_device_reports(world: &mut CheckinWorld, text: String) {
    let refused = world
        .race_outcomes
        .iter()
        .find(|outcome| !outcome.eligible)
        .expect("No device refused the play");
    assert!(refused.message.contains(&text));
}
