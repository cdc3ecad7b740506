//! VerdictProbe - browser verification of germline variant classification verdicts
//!
//! Library half of the `verdictprobe` binary: configuration loading, evidence storage
//! and the scenario runner. The browser engine and page flows live in the workspace
//! crates `cdp-adapter`, `action-primitives` and `variant-flows`.

pub mod artifacts;
pub mod config;
pub mod runner;

pub use artifacts::ArtifactStore;
pub use config::AppConfig;
pub use runner::{run_scenario, run_with_chromium, RunOutcome};
