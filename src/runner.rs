//! Scenario execution with evidence capture

use crate::artifacts::{ArtifactStore, FAILURE_LABEL, SUCCESS_LABEL};
use crate::config::AppConfig;
use action_primitives::Session;
use anyhow::{Context, Result};
use cdp_adapter::ChromiumDriver;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use variant_flows::{GermlineScenario, ScenarioError, ScenarioReport};

#[derive(Debug)]
pub enum RunOutcome {
    Passed {
        report: Box<ScenarioReport>,
        evidence: Option<PathBuf>,
    },
    Failed {
        error: ScenarioError,
        evidence: Option<PathBuf>,
    },
}

impl RunOutcome {
    pub fn passed(&self) -> bool {
        matches!(self, RunOutcome::Passed { .. })
    }

    pub fn exit_code(&self) -> i32 {
        if self.passed() {
            0
        } else {
            1
        }
    }

    pub fn evidence(&self) -> Option<&PathBuf> {
        match self {
            RunOutcome::Passed { evidence, .. } | RunOutcome::Failed { evidence, .. } => {
                evidence.as_ref()
            }
        }
    }
}

/// Runs `scenario` on `session`; screenshots the failure, or the verdict on success.
///
/// Evidence that cannot be captured or written is logged and does not change the
/// outcome.
pub async fn run_scenario(
    session: &Session,
    scenario: &GermlineScenario,
    artifacts: &ArtifactStore,
    capture_on_success: bool,
) -> RunOutcome {
    match scenario.run(session).await {
        Ok(mut report) => {
            let evidence = if capture_on_success {
                let png = match report.evidence.take() {
                    Some(png) => Some(png),
                    None => capture(session).await,
                };
                match png {
                    Some(png) => persist(artifacts, SUCCESS_LABEL, &png).await,
                    None => None,
                }
            } else {
                None
            };
            info!(
                session = %session.id(),
                verdict = report.observation.text.as_deref().unwrap_or_default(),
                "verdict verified"
            );
            RunOutcome::Passed {
                report: Box::new(report),
                evidence,
            }
        }
        Err(error) => {
            error!(session = %session.id(), %error, "scenario failed");
            let evidence = match capture(session).await {
                Some(png) => persist(artifacts, FAILURE_LABEL, &png).await,
                None => None,
            };
            RunOutcome::Failed { error, evidence }
        }
    }
}

/// Launches Chromium from `config` and runs the scenario once.
pub async fn run_with_chromium(config: &AppConfig) -> Result<RunOutcome> {
    let cdp = config.cdp_config();
    let driver = Arc::new(
        ChromiumDriver::launch(&cdp)
            .await
            .context("Failed to launch browser")?,
    );
    let artifacts = ArtifactStore::new(&config.artifacts.dir);
    let scenario = GermlineScenario::new(config.scenario.clone());

    let outcome = {
        let session = Session::new(driver.clone(), config.timeouts());
        run_scenario(
            &session,
            &scenario,
            &artifacts,
            config.artifacts.capture_on_success,
        )
        .await
    };

    match Arc::try_unwrap(driver) {
        Ok(driver) => {
            if let Err(err) = driver.close().await {
                warn!(%err, "browser did not shut down cleanly");
            }
        }
        Err(_) => warn!("browser still referenced; leaving shutdown to drop"),
    }
    Ok(outcome)
}

async fn capture(session: &Session) -> Option<Vec<u8>> {
    match session.screenshot().await {
        Ok(png) => Some(png),
        Err(err) => {
            warn!(session = %session.id(), %err, "screenshot failed");
            None
        }
    }
}

async fn persist(artifacts: &ArtifactStore, label: &str, png: &[u8]) -> Option<PathBuf> {
    match artifacts.save(label, png).await {
        Ok(path) => Some(path),
        Err(err) => {
            warn!(error = %format!("{err:#}"), "evidence not written");
            None
        }
    }
}
