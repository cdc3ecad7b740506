//! Browser capability layer.
//!
//! Exposes the [`BrowserDriver`] interface the wait engine and flows are written against,
//! a Chromium DevTools backend built on `chromiumoxide`, and (behind the `fake` feature)
//! a scripted in-memory document used by tests.

use std::{env, path::PathBuf};
use which::which;

pub mod chromium;
pub mod commands;
pub mod driver;
#[cfg(any(test, feature = "fake"))]
pub mod fake;
mod scripts;

pub use chromium::ChromiumDriver;
pub use commands::{By, Key, Locator};
pub use config::CdpConfig;
pub use driver::{BrowserDriver, ElementRef, ElementState, FrameScope};
pub use error::{AdapterError, AdapterErrorKind};

pub mod error {
    use serde::{Deserialize, Serialize};
    use std::fmt;
    use thiserror::Error;

    /// High-level error categories surfaced by the adapter.
    #[derive(Clone, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
    pub enum AdapterErrorKind {
        #[error("navigation timed out")]
        NavTimeout,
        #[error("cdp i/o failure")]
        CdpIo,
        #[error("element not interactable")]
        NotInteractable,
        #[error("element is not a native select")]
        NotSelectable,
        #[error("option not found")]
        OptionNotFound,
        #[error("stale element handle")]
        StaleElement,
        #[error("no such frame")]
        NoSuchFrame,
        #[error("script evaluation failed")]
        Script,
        #[error("internal error")]
        Internal,
    }

    /// Enriched error metadata passed back to higher layers.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct AdapterError {
        pub kind: AdapterErrorKind,
        pub hint: Option<String>,
        pub retriable: bool,
        pub data: Option<serde_json::Value>,
    }

    impl fmt::Display for AdapterError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.kind)?;
            if let Some(hint) = &self.hint {
                write!(f, ": {}", hint)?;
            }
            Ok(())
        }
    }

    impl std::error::Error for AdapterError {}

    impl AdapterError {
        pub fn new(kind: AdapterErrorKind) -> Self {
            Self {
                kind,
                hint: None,
                retriable: false,
                data: None,
            }
        }

        pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
            self.hint = Some(hint.into());
            self
        }

        pub fn retriable(mut self, flag: bool) -> Self {
            self.retriable = flag;
            self
        }

        pub fn with_data(mut self, data: serde_json::Value) -> Self {
            self.data = Some(data);
            self
        }

        pub fn is(&self, kind: AdapterErrorKind) -> bool {
            self.kind == kind
        }
    }
}

pub mod config {
    use crate::detect_chrome_executable;
    use serde::{Deserialize, Serialize};
    use std::{
        env,
        path::{Path, PathBuf},
    };

    /// Configuration for launching and tuning the Chromium backend.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(default)]
    pub struct CdpConfig {
        pub executable: PathBuf,
        pub user_data_dir: PathBuf,
        pub headless: bool,
        pub default_deadline_ms: u64,
        pub window: (u32, u32),
        pub disable_sandbox: bool,
        pub extra_args: Vec<String>,
    }

    impl Default for CdpConfig {
        fn default() -> Self {
            Self {
                executable: default_chrome_path(),
                user_data_dir: default_profile_dir(),
                headless: resolve_headless_default(),
                default_deadline_ms: 30_000,
                window: (1440, 900),
                disable_sandbox: resolve_disable_sandbox(),
                extra_args: Vec::new(),
            }
        }
    }

    fn resolve_headless_default() -> bool {
        // "0", "false", "no", "off" means headful
        match env::var("VERDICTPROBE_HEADLESS") {
            Ok(value) => {
                let lower = value.to_ascii_lowercase();
                !matches!(lower.as_str(), "0" | "false" | "no" | "off")
            }
            Err(_) => true,
        }
    }

    fn resolve_disable_sandbox() -> bool {
        env::var("VERDICTPROBE_DISABLE_SANDBOX")
            .map(|v| v != "0" && v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    fn default_chrome_path() -> PathBuf {
        detect_chrome_executable().unwrap_or_default()
    }

    fn default_profile_dir() -> PathBuf {
        if let Ok(path) = env::var("VERDICTPROBE_CHROME_PROFILE") {
            return PathBuf::from(path);
        }

        Path::new("./.verdictprobe-profile").into()
    }
}

fn detect_chrome_executable() -> Option<PathBuf> {
    if let Ok(raw) = env::var("VERDICTPROBE_CHROME") {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            let candidate = PathBuf::from(trimmed);
            if candidate.exists() {
                return Some(candidate);
            }
        }
    }

    for name in chrome_executable_names() {
        if let Ok(path) = which(name) {
            return Some(path);
        }
    }

    os_specific_chrome_paths()
        .into_iter()
        .find(|candidate| candidate.exists())
}

fn chrome_executable_names() -> &'static [&'static str] {
    #[cfg(target_os = "windows")]
    {
        &["chrome.exe", "chromium.exe", "msedge.exe"]
    }

    #[cfg(not(target_os = "windows"))]
    {
        &[
            "google-chrome-stable",
            "google-chrome",
            "chromium",
            "chromium-browser",
        ]
    }
}

fn os_specific_chrome_paths() -> Vec<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        vec![
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome"),
            PathBuf::from("/Applications/Chromium.app/Contents/MacOS/Chromium"),
        ]
    }

    #[cfg(target_os = "windows")]
    {
        let mut paths = Vec::new();
        for var in ["PROGRAMFILES", "PROGRAMFILES(X86)", "LOCALAPPDATA"] {
            if let Ok(base) = env::var(var) {
                paths.push(PathBuf::from(base).join("Google/Chrome/Application/chrome.exe"));
            }
        }
        paths
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        vec![
            PathBuf::from("/usr/bin/google-chrome"),
            PathBuf::from("/usr/bin/chromium"),
            PathBuf::from("/usr/bin/chromium-browser"),
            PathBuf::from("/snap/bin/chromium"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_carries_hint() {
        let err = AdapterError::new(AdapterErrorKind::NotInteractable)
            .with_hint("obscured by #onetrust-banner");
        assert_eq!(
            err.to_string(),
            "element not interactable: obscured by #onetrust-banner"
        );
        assert!(err.is(AdapterErrorKind::NotInteractable));
        assert!(!err.retriable);
    }

    #[test]
    fn config_round_trips_through_serde_with_defaults() {
        let parsed: CdpConfig =
            serde_json::from_value(serde_json::json!({ "headless": false })).expect("config");
        assert!(!parsed.headless);
        assert_eq!(parsed.default_deadline_ms, 30_000);
        assert_eq!(parsed.window, (1440, 900));
    }
}
