//! Results page: load detection, section cards and the classification verdict

use crate::locators::{
    GERMLINE_CLASSIFICATION_CARD, LOADING_OVERLAY, LOADING_SPINNER, RESULTS_CONTAINER,
    SECTION_CARDS, VERDICT, WARNING_UNDERSTAND_BUTTON,
};
use crate::verdict::VerdictObservation;
use action_primitives::{ActionError, Session, TimeoutProfile, WaitCondition};
use serde::Serialize;
use tracing::{debug, info, warn};

const BACKGROUND_COLOR: &str = "background-color";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionStatus {
    pub label: &'static str,
    pub visible: bool,
}

/// Visibility of every result card, in page order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionReport {
    pub sections: Vec<SectionStatus>,
}

impl SectionReport {
    pub fn is_visible(&self, label: &str) -> bool {
        self.sections
            .iter()
            .any(|section| section.label == label && section.visible)
    }

    pub fn germline_present(&self) -> bool {
        self.is_visible("Germline Classification")
    }

    pub fn missing(&self) -> Vec<&'static str> {
        self.sections
            .iter()
            .filter(|section| !section.visible)
            .map(|section| section.label)
            .collect()
    }
}

pub struct ResultsFlow<'a> {
    session: &'a Session,
}

impl<'a> ResultsFlow<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// Results count as loaded when the address mentions a variant or the results
    /// container is visible, whichever happens first. Loading indicators are then
    /// given a short budget to clear.
    pub async fn wait_for_results_page(&self) -> Result<bool, ActionError> {
        let session = self.session;
        let conditions = [
            WaitCondition::UrlContains("variant".to_string()),
            WaitCondition::Visible(RESULTS_CONTAINER),
        ];
        let matched = session
            .wait_for_any(&conditions, TimeoutProfile::Long)
            .await?;

        for indicator in [&LOADING_SPINNER, &LOADING_OVERLAY] {
            if !session
                .wait_until_gone(indicator, TimeoutProfile::Short)
                .await?
            {
                debug!(session = %session.id(), %indicator, "loading indicator still shown");
            }
        }

        match matched {
            Some(index) => {
                info!(session = %session.id(), signal = %conditions[index], "results page loaded");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub async fn is_on_results_page(&self, gene_symbol: &str) -> Result<bool, ActionError> {
        let url = self.session.current_url().await?.to_lowercase();
        let gene = gene_symbol.to_lowercase();
        if url.contains("variant") || (!gene.is_empty() && url.contains(&gene)) {
            return Ok(true);
        }
        self.session
            .is_visible(&RESULTS_CONTAINER, TimeoutProfile::Short)
            .await
    }

    /// Reports every card; only germline classification matters to the caller.
    pub async fn verify_page_sections(&self) -> Result<SectionReport, ActionError> {
        let mut sections = Vec::with_capacity(SECTION_CARDS.len());
        for card in SECTION_CARDS.iter() {
            let visible = self
                .session
                .is_visible(&card.locator, TimeoutProfile::Medium)
                .await?;
            info!(session = %self.session.id(), section = card.label, visible, "result section");
            sections.push(SectionStatus {
                label: card.label,
                visible,
            });
        }

        let report = SectionReport { sections };
        if !report.germline_present() {
            warn!(session = %self.session.id(), "germline classification section not found");
        }
        let missing = report.missing();
        if !missing.is_empty() {
            info!(session = %self.session.id(), missing = ?missing, "some result sections did not load");
        }
        Ok(report)
    }

    pub async fn is_germline_classification_visible(&self) -> Result<bool, ActionError> {
        self.session
            .is_visible(&GERMLINE_CLASSIFICATION_CARD, TimeoutProfile::Medium)
            .await
    }

    /// Scrolls to the collapsed card and opens it with a script click.
    pub async fn expand_germline_classification(&self) -> Result<bool, ActionError> {
        let session = self.session;
        if !session
            .scroll_into_view(&GERMLINE_CLASSIFICATION_CARD, TimeoutProfile::Medium)
            .await?
        {
            return Ok(false);
        }
        if !session
            .script_click(&GERMLINE_CLASSIFICATION_CARD, TimeoutProfile::Short)
            .await?
        {
            return Ok(false);
        }
        self.handle_warning_popup().await?;
        info!(session = %session.id(), "germline classification expanded");
        Ok(true)
    }

    /// Accepts the clinical-interpretation disclaimer if it is shown.
    pub async fn handle_warning_popup(&self) -> Result<bool, ActionError> {
        self.session
            .dismiss_if_present(&WARNING_UNDERSTAND_BUTTON, TimeoutProfile::Short)
            .await
    }

    pub async fn verdict_text(&self) -> Result<Option<String>, ActionError> {
        Ok(self
            .session
            .read_text_with_fallback(&VERDICT)
            .await?
            .filter(|text| !text.is_empty()))
    }

    /// Computed background of the verdict pill's container.
    pub async fn verdict_color(&self) -> Result<Option<String>, ActionError> {
        for locator in [&VERDICT.primary, &VERDICT.fallback] {
            if let Some(color) = self
                .session
                .read_parent_css(locator, BACKGROUND_COLOR, TimeoutProfile::Short)
                .await?
            {
                return Ok(Some(color));
            }
        }
        Ok(None)
    }

    pub async fn verify_classification(&self) -> Result<VerdictObservation, ActionError> {
        let text = self.verdict_text().await?;
        let color = self.verdict_color().await?;
        let observation = VerdictObservation::from_parts(text, color);
        info!(
            session = %self.session.id(),
            text = observation.text.as_deref().unwrap_or("<none>"),
            background = observation.raw_background.as_deref().unwrap_or("<none>"),
            is_pathogenic = observation.is_pathogenic,
            is_red = observation.is_red,
            "verdict observed"
        );
        Ok(observation)
    }

    /// PNG of the viewport with the classification card in view.
    pub async fn capture_verdict_evidence(&self) -> Result<Vec<u8>, ActionError> {
        self.session
            .scroll_into_view(&GERMLINE_CLASSIFICATION_CARD, TimeoutProfile::Short)
            .await?;
        self.session.screenshot().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locators::{GENERAL_INFO_CARD, PUBLICATIONS_CARD};
    use crate::testing::session;
    use cdp_adapter::fake::{Effect, FakeElement, Interaction};
    use cdp_adapter::Locator;

    fn pill() -> Locator {
        Locator::css("div.ColoredPill")
    }

    #[tokio::test]
    async fn container_visibility_alone_counts_as_loaded() {
        let (driver, session) = session("https://varsome.com/search");
        driver.add(FakeElement::matching(&RESULTS_CONTAINER).appears_after_polls(2));
        let flow = ResultsFlow::new(&session);

        assert!(flow.wait_for_results_page().await.unwrap());
    }

    #[tokio::test]
    async fn url_alone_counts_as_loaded_and_waits_for_spinner() {
        let (driver, session) = session("https://varsome.com/variant/hg38/BRAF%3AV600E");
        let spinner = driver.add(FakeElement::matching(&LOADING_SPINNER));
        driver.apply(Effect::Hide(spinner));
        let flow = ResultsFlow::new(&session);

        assert!(flow.wait_for_results_page().await.unwrap());
        assert!(flow.is_on_results_page("BRAF").await.unwrap());
    }

    #[tokio::test]
    async fn neither_signal_means_not_loaded() {
        let (_, session) = session("https://varsome.com/");
        let flow = ResultsFlow::new(&session);
        assert!(!flow.wait_for_results_page().await.unwrap());
        assert!(!flow.is_on_results_page("BRAF").await.unwrap());
    }

    #[tokio::test]
    async fn sections_reported_in_page_order() {
        let (driver, session) = session("https://varsome.com/variant/hg38/BRAF");
        driver.add(FakeElement::matching(&GENERAL_INFO_CARD));
        driver.add(FakeElement::matching(&GERMLINE_CLASSIFICATION_CARD));
        driver.add(FakeElement::matching(&PUBLICATIONS_CARD).hidden());
        let flow = ResultsFlow::new(&session);

        let report = flow.verify_page_sections().await.unwrap();
        let labels: Vec<_> = report.sections.iter().map(|s| s.label).collect();
        assert_eq!(
            labels,
            ["General Information", "Germline Classification", "PharmGKB", "ClinVar", "LOVD", "Publications"]
        );
        assert!(report.germline_present());
        assert_eq!(report.missing(), ["PharmGKB", "ClinVar", "LOVD", "Publications"]);
    }

    #[tokio::test]
    async fn expansion_accepts_disclaimer() {
        let (driver, session) = session("https://varsome.com/variant/hg38/BRAF");
        let card = driver.add(FakeElement::matching(&GERMLINE_CLASSIFICATION_CARD).below_fold());
        let warning = driver.add(FakeElement::matching(&WARNING_UNDERSTAND_BUTTON).hidden());
        driver.on_click(card, Effect::Show(warning));
        driver.on_click(warning, Effect::Hide(warning));
        let flow = ResultsFlow::new(&session);

        assert!(flow.expand_germline_classification().await.unwrap());
        assert_eq!(
            driver.count(|i| matches!(i, Interaction::ScriptClick(id) if *id == card)),
            1
        );
        assert!(!driver.is_displayed(warning));
    }

    #[tokio::test]
    async fn verdict_color_read_from_fallback_parent() {
        let (driver, session) = session("https://varsome.com/variant/hg38/BRAF");
        let container = driver.add(FakeElement::matching(&pill()).css(BACKGROUND_COLOR, "rgb(204, 0, 0)"));
        driver.add(
            FakeElement::matching(&VERDICT.fallback)
                .text("Pathogenic")
                .child_of(container),
        );
        let flow = ResultsFlow::new(&session);

        let observation = flow.verify_classification().await.unwrap();
        assert_eq!(observation.text.as_deref(), Some("Pathogenic"));
        assert!(observation.is_red);
        assert!(observation.success);
    }

    #[tokio::test]
    async fn missing_verdict_yields_empty_observation() {
        let (_, session) = session("https://varsome.com/variant/hg38/BRAF");
        let flow = ResultsFlow::new(&session);

        let observation = flow.verify_classification().await.unwrap();
        assert_eq!(observation, VerdictObservation::from_parts(None, None));
        assert!(!observation.success);
    }

    #[tokio::test]
    async fn evidence_is_a_png() {
        let (driver, session) = session("https://varsome.com/variant/hg38/BRAF");
        driver.add(FakeElement::matching(&GERMLINE_CLASSIFICATION_CARD));
        let flow = ResultsFlow::new(&session);

        let png = flow.capture_verdict_evidence().await.unwrap();
        assert!(png.starts_with(b"\x89PNG"));
        assert_eq!(driver.interactions().last(), Some(&Interaction::Screenshot));
    }

    #[tokio::test]
    async fn empty_primary_verdict_reads_from_fallback() {
        let (driver, session) = session("https://varsome.com/variant/hg38/BRAF");
        driver.add(FakeElement::matching(&VERDICT.primary).text(""));
        driver.add(FakeElement::matching(&VERDICT.fallback).text("Pathogenic"));
        let flow = ResultsFlow::new(&session);

        assert_eq!(flow.verdict_text().await.unwrap().as_deref(), Some("Pathogenic"));
    }
}
