use action_primitives::{Session, Timeouts};
use cdp_adapter::fake::{Effect, FakeDriver, FakeElement, Interaction};
use cdp_adapter::Locator;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use variant_flows::locators::{
    GERMLINE_CLASSIFICATION_CARD, RESULTS_CONTAINER, SEARCH_BUTTON, SEARCH_INPUT, VERDICT,
};
use variant_flows::{GermlineScenario, ScenarioError, Step};
use verdictprobe_cli::{run_scenario, ArtifactStore, RunOutcome};

fn session(driver: &Arc<FakeDriver>) -> Session {
    Session::new(
        driver.clone(),
        Timeouts::uniform(Duration::from_millis(60), Duration::from_millis(5)),
    )
}

/// Homepage whose search reveals a "Pathogenic" verdict in place.
fn pathogenic_site(background: &str) -> Arc<FakeDriver> {
    let driver = Arc::new(FakeDriver::new("about:blank"));
    driver.add(FakeElement::matching(&SEARCH_INPUT.primary));
    let search = driver.add(FakeElement::matching(&SEARCH_BUTTON.primary).text("Search"));

    let container = driver.add(FakeElement::matching(&RESULTS_CONTAINER).hidden());
    let card = driver.add(FakeElement::matching(&GERMLINE_CLASSIFICATION_CARD).hidden());
    let pill = driver.add(
        FakeElement::matching(&Locator::css("div.ColoredPill"))
            .css("background-color", background)
            .hidden(),
    );
    let verdict = driver.add(
        FakeElement::matching(&VERDICT.primary)
            .text("Pathogenic")
            .child_of(pill)
            .hidden(),
    );
    for revealed in [container, card, pill, verdict] {
        driver.on_click(search, Effect::Show(revealed));
    }
    driver
}

fn png_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|entry| entry.ok())
                .filter_map(|entry| entry.file_name().into_string().ok())
                .filter(|name| name.ends_with(".png"))
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}

#[tokio::test]
async fn passing_run_keeps_verdict_screenshot() {
    let dir = tempfile::tempdir().unwrap();
    let artifacts = ArtifactStore::new(dir.path().join("artifacts"));
    let driver = pathogenic_site("rgb(204, 0, 0)");

    let outcome = run_scenario(
        &session(&driver),
        &GermlineScenario::default(),
        &artifacts,
        true,
    )
    .await;

    assert!(outcome.passed(), "{outcome:?}");
    assert_eq!(outcome.exit_code(), 0);
    let names = png_names(artifacts.dir());
    assert_eq!(names.len(), 1);
    assert!(names[0].starts_with("success_pathogenic_"));
    assert_eq!(outcome.evidence().map(|p| p.exists()), Some(true));
}

#[tokio::test]
async fn passing_run_without_capture_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let artifacts = ArtifactStore::new(dir.path().join("artifacts"));
    let driver = pathogenic_site("rgb(204, 0, 0)");

    let outcome = run_scenario(
        &session(&driver),
        &GermlineScenario::default(),
        &artifacts,
        false,
    )
    .await;

    assert!(outcome.passed());
    assert!(outcome.evidence().is_none());
    assert!(png_names(artifacts.dir()).is_empty());
}

#[tokio::test]
async fn failing_run_exits_non_zero_with_failure_screenshot() {
    let dir = tempfile::tempdir().unwrap();
    let artifacts = ArtifactStore::new(dir.path());
    let driver = Arc::new(FakeDriver::new("about:blank"));

    let outcome = run_scenario(
        &session(&driver),
        &GermlineScenario::default(),
        &artifacts,
        true,
    )
    .await;

    assert_eq!(outcome.exit_code(), 1);
    match &outcome {
        RunOutcome::Failed { error, evidence } => {
            assert!(matches!(
                error,
                ScenarioError::Assertion {
                    step: Step::HomepageLoaded,
                    ..
                }
            ));
            assert!(evidence.is_some());
        }
        other => panic!("expected failure, got {other:?}"),
    }
    let names = png_names(dir.path());
    assert_eq!(names.len(), 1);
    assert!(names[0].starts_with("failure_"));
    assert_eq!(driver.count(|i| matches!(i, Interaction::Screenshot)), 1);
}

#[tokio::test]
async fn colour_mismatch_is_reported_as_failure() {
    let dir = tempfile::tempdir().unwrap();
    let artifacts = ArtifactStore::new(dir.path());
    let driver = pathogenic_site("rgb(0, 128, 0)");

    let outcome = run_scenario(
        &session(&driver),
        &GermlineScenario::default(),
        &artifacts,
        true,
    )
    .await;

    match outcome {
        RunOutcome::Failed { error, .. } => assert_eq!(error.step(), Some(Step::VerdictRed)),
        other => panic!("expected failure, got {other:?}"),
    }
    assert!(png_names(dir.path())[0].starts_with("failure_"));
}
