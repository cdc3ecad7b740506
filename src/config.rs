//! Configuration management module
//!
//! `AppConfig` is read from YAML. An explicit `--config` path comes first, then
//! `<config_dir>/verdictprobe/config.yaml`, then built-in defaults.

use action_primitives::Timeouts;
use anyhow::{Context, Result};
use cdp_adapter::CdpConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tracing::{info, warn};
use variant_flows::ScenarioData;

pub const BASE_URL_ENV: &str = "VERDICTPROBE_BASE_URL";
pub const VARIANT_ENV: &str = "VERDICTPROBE_VARIANT";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub scenario: ScenarioData,
    pub timeouts: TimeoutSettings,
    pub browser: BrowserSettings,
    pub artifacts: ArtifactSettings,
}

/// Per-profile wait budgets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutSettings {
    pub short_secs: u64,
    pub medium_secs: u64,
    pub long_secs: u64,
    pub extra_long_secs: u64,
    pub poll_interval_ms: u64,
    pub settle_ms: u64,
}

impl Default for TimeoutSettings {
    fn default() -> Self {
        Self {
            short_secs: 5,
            medium_secs: 10,
            long_secs: 20,
            extra_long_secs: 30,
            poll_interval_ms: 250,
            settle_ms: 1000,
        }
    }
}

impl From<&TimeoutSettings> for Timeouts {
    fn from(settings: &TimeoutSettings) -> Self {
        Timeouts {
            short: Duration::from_secs(settings.short_secs),
            medium: Duration::from_secs(settings.medium_secs),
            long: Duration::from_secs(settings.long_secs),
            extra_long: Duration::from_secs(settings.extra_long_secs),
            poll_interval: Duration::from_millis(settings.poll_interval_ms.max(1)),
            settle: Duration::from_millis(settings.settle_ms),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    /// Unset defers to `VERDICTPROBE_HEADLESS`
    pub headless: Option<bool>,
    /// Unset defers to executable discovery
    pub executable: Option<PathBuf>,
    pub window: (u32, u32),
    pub extra_args: Vec<String>,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: None,
            executable: None,
            window: (1440, 900),
            extra_args: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactSettings {
    pub dir: PathBuf,
    pub capture_on_success: bool,
}

impl Default for ArtifactSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("artifacts"),
            capture_on_success: true,
        }
    }
}

impl AppConfig {
    pub async fn load(config_path: Option<&Path>) -> Result<Self> {
        let config_path = match config_path {
            Some(path) => path.to_path_buf(),
            None => match default_config_path() {
                Some(path) => path,
                None => {
                    warn!("No config directory available, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        if !config_path.exists() {
            warn!(
                "Config file not found, using defaults: {}",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)
            .await
            .with_context(|| format!("Failed to read config file {}", config_path.display()))?;
        let config = Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config file {}", config_path.display()))?;
        info!("Loaded configuration from: {}", config_path.display());
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Applies `VERDICTPROBE_BASE_URL` and `VERDICTPROBE_VARIANT` when set and non-empty.
    pub fn apply_env_overrides(&mut self) {
        if let Some(base_url) = non_empty_env(BASE_URL_ENV) {
            info!(%base_url, "base URL overridden from environment");
            self.scenario.base_url = base_url;
        }
        if let Some(variant) = non_empty_env(VARIANT_ENV) {
            info!(%variant, "variant overridden from environment");
            self.scenario.variant = variant;
        }
    }

    pub fn timeouts(&self) -> Timeouts {
        Timeouts::from(&self.timeouts)
    }

    /// Adapter launch settings: environment-derived defaults, then explicit settings.
    pub fn cdp_config(&self) -> CdpConfig {
        let mut cdp = CdpConfig::default();
        if let Some(headless) = self.browser.headless {
            cdp.headless = headless;
        }
        if let Some(executable) = &self.browser.executable {
            cdp.executable = executable.clone();
        }
        cdp.window = self.browser.window;
        cdp.default_deadline_ms = self.timeouts.extra_long_secs.saturating_mul(1000);
        cdp.extra_args.extend(self.browser.extra_args.iter().cloned());
        cdp
    }
}

fn default_config_path() -> Option<PathBuf> {
    let mut path = dirs::config_dir()?;
    path.push("verdictprobe");
    path.push("config.yaml");
    Some(path)
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
