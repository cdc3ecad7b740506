//! Screenshot evidence written next to a run

use anyhow::{Context, Result};
use chrono::{DateTime, Local, TimeZone};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

pub const FAILURE_LABEL: &str = "failure";
pub const SUCCESS_LABEL: &str = "success_pathogenic";

/// Directory of PNG evidence named `<label>_<YYYYmmdd_HHMMSS>.png`.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn file_name<Tz: TimeZone>(label: &str, at: &DateTime<Tz>) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        format!("{label}_{}.png", at.format("%Y%m%d_%H%M%S"))
    }

    /// Writes `png` under a timestamped name and returns its path.
    pub async fn save(&self, label: &str, png: &[u8]) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;
        let path = self.dir.join(Self::file_name(label, &Local::now()));
        fs::write(&path, png)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!(path = %path.display(), bytes = png.len(), "screenshot saved");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn names_carry_label_and_second_resolution_timestamp() {
        let at = Utc.with_ymd_and_hms(2024, 3, 7, 9, 5, 2).unwrap();
        assert_eq!(
            ArtifactStore::file_name(FAILURE_LABEL, &at),
            "failure_20240307_090502.png"
        );
    }

    #[tokio::test]
    async fn save_creates_missing_directory() {
        let root = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(root.path().join("nested/artifacts"));

        let path = store.save(SUCCESS_LABEL, b"\x89PNG").await.unwrap();
        assert!(path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with("success_pathogenic_") && n.ends_with(".png")));
        assert_eq!(std::fs::read(&path).unwrap(), b"\x89PNG");
    }
}
