//! Verdict classification - pill text and background colour

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

static CSS_RGB: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"rgba?\((\d+),\s*(\d+),\s*(\d+)").expect("rgb pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.0, self.1, self.2)
    }
}

/// Parses the leading three channels of a computed `rgb(...)`/`rgba(...)` value.
///
/// Channels outside 0..=255 are rejected.
pub fn parse_css_rgb(value: &str) -> Option<Rgb> {
    let captures = CSS_RGB.captures(value)?;
    let channel = |index: usize| captures.get(index)?.as_str().parse::<u8>().ok();
    Some(Rgb(channel(1)?, channel(2)?, channel(3)?))
}

pub fn is_red(rgb: Rgb) -> bool {
    let Rgb(r, g, b) = rgb;
    r > 150 && g < 50 && b < 50
}

pub fn is_pathogenic_text(text: &str) -> bool {
    text.to_lowercase().contains("pathogenic")
}

/// One reading of the verdict pill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerdictObservation {
    pub text: Option<String>,
    /// Computed background as reported by the page
    pub raw_background: Option<String>,
    pub background: Option<Rgb>,
    pub is_pathogenic: bool,
    pub is_red: bool,
    pub success: bool,
}

impl VerdictObservation {
    pub fn from_parts(text: Option<String>, raw_background: Option<String>) -> Self {
        let background = raw_background.as_deref().and_then(parse_css_rgb);
        let is_pathogenic = text.as_deref().is_some_and(is_pathogenic_text);
        let red = background.is_some_and(is_red);
        Self {
            text,
            raw_background,
            background,
            is_pathogenic,
            is_red: red,
            success: is_pathogenic && red,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn red_threshold_boundaries() {
        assert!(!is_red(Rgb(150, 50, 50)));
        assert!(is_red(Rgb(151, 49, 49)));
        assert!(is_red(Rgb(255, 0, 0)));
        assert!(!is_red(Rgb(200, 100, 20)));
    }

    #[test]
    fn pathogenic_match_ignores_case() {
        assert!(is_pathogenic_text("Pathogenic"));
        assert!(is_pathogenic_text("PATHOGENIC VARIANT"));
        assert!(is_pathogenic_text("pathogenic (likely)"));
        assert!(!is_pathogenic_text("Benign"));
    }

    #[test]
    fn parses_rgb_and_rgba() {
        assert_eq!(parse_css_rgb("rgb(204, 0, 0)"), Some(Rgb(204, 0, 0)));
        assert_eq!(parse_css_rgb("rgba(204,0,0, 0.8)"), Some(Rgb(204, 0, 0)));
        assert_eq!(parse_css_rgb("transparent"), None);
        assert_eq!(parse_css_rgb("rgb(300, 0, 0)"), None);
    }

    #[test]
    fn likely_pathogenic_on_yellow_is_not_success() {
        let obs = VerdictObservation::from_parts(
            Some("Likely Pathogenic".into()),
            Some("rgb(255, 255, 0)".into()),
        );
        assert!(obs.is_pathogenic);
        assert!(!obs.is_red);
        assert!(!obs.success);
        assert_eq!(obs.background, Some(Rgb(255, 255, 0)));
    }

    #[test]
    fn unparseable_background_keeps_raw_value() {
        let obs = VerdictObservation::from_parts(Some("Pathogenic".into()), Some("transparent".into()));
        assert_eq!(obs.raw_background.as_deref(), Some("transparent"));
        assert_eq!(obs.background, None);
        assert!(!obs.success);
    }
}
