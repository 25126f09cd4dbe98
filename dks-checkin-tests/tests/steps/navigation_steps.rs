use cucumber::{given, then, when};
use dks_checkin_core::{CameraError, ScanExit, Screen, SessionEvent};
use dks_checkin_tests::{activation, CheckinWorld};

fn screen(name: &str) -> Screen {
    match name {
        "select" => Screen::SelectType,
        "scanning" => Screen::Scanning,
        "result" => Screen::ShowingResult,
        other => panic!("Unknown screen '{}'", other),
    }
}

async fn read_code(world: &mut CheckinWorld, name: &str) {
    let code = world.participant_id(name).to_string();
    world.platform.push_payload(&code);
    world.run_scan().await;
}

// ===== Given Steps =====

#[given(expr = "staff chose {string}")]
async fn staff_chose(world: &mut CheckinWorld, name: String) {
    let event = world.controller.choose_activation(activation(&name));
    world.last_event = Some(event);
}

#[given(expr = "the camera reads the code of {string}")]
async fn camera_read_code(world: &mut CheckinWorld, name: String) {
    read_code(world, &name).await;
}

#[given("the device has no camera")]
async fn no_camera(world: &mut CheckinWorld) {
    world.use_cameras(Vec::new());
}

#[given("camera access is denied")]
async fn camera_denied(world: &mut CheckinWorld) {
    world.platform.fail_enumeration(CameraError::PermissionDenied);
}

// ===== When Steps =====

#[when(expr = "staff choose {string}")]
async fn staff_choose(world: &mut CheckinWorld, name: String) {
    staff_chose(world, name).await;
}

#[when(expr = "the camera reads the code of {string}")]
async fn camera_reads_code(world: &mut CheckinWorld, name: String) {
    read_code(world, &name).await;
}

#[when("the scanner starts")]
async fn scanner_starts(world: &mut CheckinWorld) {
    world.run_scan().await;
}

#[when("staff scan the next participant")]
async fn scan_next(world: &mut CheckinWorld) {
    let event = world.controller.scan_next();
    world.last_event = Some(event);
}

#[when("staff change activation")]
async fn change_activation(world: &mut CheckinWorld) {
    let event = world.controller.change_activation().await;
    world.last_event = Some(event);
}

// ===== Then Steps =====

#[then(expr = "the screen is {string}")]
async fn screen_is(world: &mut CheckinWorld, name: String) {
    assert_eq!(world.controller.session().screen(), screen(&name));
}

#[then(expr = "the chosen activation is {string}")]
async fn chosen_activation(world: &mut CheckinWorld, name: String) {
    assert_eq!(
        world.controller.session().activation(),
        Some(activation(&name))
    );
}

#[then("no activation is chosen")]
async fn no_activation(world: &mut CheckinWorld) {
    assert_eq!(world.controller.session().activation(), None);
}

#[then("no outcome is shown")]
async fn no_outcome(world: &mut CheckinWorld) {
    assert!(world.controller.session().outcome().is_none());
}

#[then("the camera is released")]
async fn camera_released(world: &mut CheckinWorld) {
    assert_eq!(world.platform.active_captures(), 0);
    assert!(world.platform.stop_count() >= 1);
    assert!(world.controller.cameras().active_device().is_none());
}

#[then("the command is refused")]
async fn command_refused(world: &mut CheckinWorld) {
    assert!(
        matches!(world.last_event, Some(SessionEvent::CommandFailed { .. })),
        "Expected a refusal, got {:?}",
        world.last_event
    );
}

#[then(expr = "the camera error says {string}")]
async fn camera_error_says(world: &mut CheckinWorld, text: String) {
    assert!(matches!(world.last_exit, Some(ScanExit::CameraFailed(_))));
    let error = world
        .controller
        .session()
        .camera_error()
        .expect("No camera error recorded");
    assert!(error.staff_message().contains(&text));
}
