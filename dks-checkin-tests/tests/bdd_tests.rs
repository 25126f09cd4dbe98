use cucumber::World;
use dks_checkin_tests::CheckinWorld;

mod steps;

const FEATURES: &str = "tests/features";

#[cfg(feature = "output-junit")]
#[tokio::main]
async fn main() {
    let report =
        std::fs::File::create("junit-report.xml").expect("Failed to create JUnit XML file");

    CheckinWorld::cucumber()
        .max_concurrent_scenarios(1)
        .with_writer(cucumber::writer::JUnit::new(report, 0))
        .run(FEATURES)
        .await;
}

#[cfg(not(feature = "output-junit"))]
#[tokio::main]
async fn main() {
    // Scenarios share no state, but scripted cameras rely on timing
    CheckinWorld::cucumber()
        .max_concurrent_scenarios(1)
        .fail_on_skipped()
        .run_and_exit(FEATURES)
        .await;
}
