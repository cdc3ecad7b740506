//! Scenario inputs

use serde::{Deserialize, Serialize};

/// Optional sample information entered in the post-search modal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleInfo {
    pub phenotype: String,
    pub sex: String,
    pub age: String,
    pub ethnicity: String,
}

impl Default for SampleInfo {
    fn default() -> Self {
        Self {
            phenotype: "Cancer".to_string(),
            sex: "Female".to_string(),
            age: "60".to_string(),
            ethnicity: "East Asian".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioData {
    pub base_url: String,
    /// `GENE:change` notation, e.g. `BRAF:V600E`
    pub variant: String,
    pub genome: String,
    pub sample: SampleInfo,
    pub expected_verdict: String,
}

impl Default for ScenarioData {
    fn default() -> Self {
        Self {
            base_url: "https://varsome.com".to_string(),
            variant: "BRAF:V600E".to_string(),
            genome: "hg38".to_string(),
            sample: SampleInfo::default(),
            expected_verdict: "Pathogenic".to_string(),
        }
    }
}

impl ScenarioData {
    /// Gene symbol part of the variant, lowercased.
    pub fn gene_symbol(&self) -> String {
        self.variant
            .split(':')
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gene_symbol_is_prefix_before_colon() {
        assert_eq!(ScenarioData::default().gene_symbol(), "braf");
        let data = ScenarioData {
            variant: "TP53".into(),
            ..ScenarioData::default()
        };
        assert_eq!(data.gene_symbol(), "tp53");
    }
}
