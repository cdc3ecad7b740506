//! Locator catalog for the variant search site.
//!
//! Every lookup the flows perform is declared here. Entries with a known alternate
//! markup are [`ResilientPair`]s; the rest are single locators.

use action_primitives::ResilientPair;
use cdp_adapter::Locator;
use serde::Serialize;

// Homepage search
pub const SEARCH_INPUT: ResilientPair = ResilientPair::new(
    Locator::xpath("//input[contains(@placeholder, 'Enter gene') or contains(@placeholder, 'variant')]"),
    Locator::css("input[type='text']:not([type='hidden'])"),
);
pub const GENOME_DROPDOWN: ResilientPair = ResilientPair::new(
    Locator::xpath("//select[@name='genome' or @id='genome']"),
    Locator::css("select.genome-select, select[data-testid='genome']"),
);
pub const GENOME_HG38_OPTION: Locator =
    Locator::xpath("//option[@value='hg38' or contains(text(), 'hg38')]");
pub const SEARCH_BUTTON: ResilientPair = ResilientPair::new(
    Locator::xpath("//button[contains(text(), 'Search') or contains(@aria-label, 'Search')]"),
    Locator::css("button[type='submit'], button.search-btn"),
);

// Sample information modal
pub const MODAL_CONTAINER: Locator = Locator::xpath("//form[@tabindex='-1']");
pub const GERMLINE_TAB: Locator = Locator::xpath(
    "//div[@data-testid='twoStateToggle-left' and contains(text(), 'Germline')]",
);
pub const GERMLINE_TAB_ACTIVE: Locator = Locator::xpath(
    "//div[@data-testid='twoStateToggle-left' and contains(@class, 'tw-bg-primary')]",
);
pub const PHENOTYPE_INPUT: Locator = Locator::id("react-select-2-input");
pub const SEX_DROPDOWN: Locator = Locator::id("react-select-6-input");
pub const AGE_INPUT: ResilientPair = ResilientPair::new(
    Locator::xpath("//div[@id='germline-modal-onset-age']//input[@placeholder]"),
    Locator::css("input[name*='age'], input[placeholder*='age']"),
);
pub const ETHNICITY_DROPDOWN: ResilientPair = ResilientPair::new(
    Locator::id("react-select-7-input"),
    Locator::css("select[name='ethnicity'], select[data-field='ethnicity']"),
);
pub const MODAL_SEARCH_BUTTON: ResilientPair = ResilientPair::new(
    Locator::xpath("//form//button[2]"),
    Locator::css(".modal-footer button.btn-primary, .modal button[type='submit']"),
);

// Interstitials
pub const SECURITY_PROCEED_BUTTON: Locator = Locator::id("proceedBtn");
pub const WARNING_UNDERSTAND_BUTTON: Locator =
    Locator::xpath("//button[contains(text(), 'I understand')]");
pub const COOKIE_ACCEPT_BUTTON: Locator = Locator::id("onetrust-accept-btn-handler");
/// Lives inside an embedded document.
pub const VERSION_POPUP_CLOSE: Locator = Locator::id("interactive-close-button");

// Results page
pub const RESULTS_CONTAINER: Locator = Locator::css(".results-container, .variant-page, main");
pub const LOADING_SPINNER: Locator = Locator::css(".spinner, .loading, .loader, [class*='load']");
pub const LOADING_OVERLAY: Locator = Locator::css(".loading-overlay, .busy-indicator");

pub const GENERAL_INFO_CARD: Locator = Locator::id("variantDetails");
pub const GERMLINE_CLASSIFICATION_CARD: Locator = Locator::id("acmg");
pub const PHARMGKB_CARD: Locator = Locator::id("pharmGKB");
pub const CLINVAR_CARD: Locator = Locator::id("clinVar");
pub const LOVD_CARD: Locator = Locator::id("lovd");
pub const PUBLICATIONS_CARD: Locator = Locator::id("publications");

/// Verdict pill text; the colour lives on the parent element.
pub const VERDICT: ResilientPair = ResilientPair::new(
    Locator::xpath("//div[contains(@class, 'ColoredPill')]//span[text()='Pathogenic']"),
    Locator::xpath("//span[text()='Pathogenic']"),
);

/// Result card as listed on the page.
#[derive(Debug, Clone)]
pub struct SectionCard {
    pub label: &'static str,
    pub locator: Locator,
}

/// Cards in page order.
pub const SECTION_CARDS: [SectionCard; 6] = [
    SectionCard {
        label: "General Information",
        locator: GENERAL_INFO_CARD,
    },
    SectionCard {
        label: "Germline Classification",
        locator: GERMLINE_CLASSIFICATION_CARD,
    },
    SectionCard {
        label: "PharmGKB",
        locator: PHARMGKB_CARD,
    },
    SectionCard {
        label: "ClinVar",
        locator: CLINVAR_CARD,
    },
    SectionCard {
        label: "LOVD",
        locator: LOVD_CARD,
    },
    SectionCard {
        label: "Publications",
        locator: PUBLICATIONS_CARD,
    },
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub name: &'static str,
    pub primary: Locator,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<Locator>,
}

impl CatalogEntry {
    fn single(name: &'static str, locator: Locator) -> Self {
        Self {
            name,
            primary: locator,
            fallback: None,
        }
    }

    fn pair(name: &'static str, pair: ResilientPair) -> Self {
        Self {
            name,
            primary: pair.primary,
            fallback: Some(pair.fallback),
        }
    }
}

/// Every declared locator, for listing and inspection.
pub fn catalog() -> Vec<CatalogEntry> {
    vec![
        CatalogEntry::pair("search_input", SEARCH_INPUT),
        CatalogEntry::pair("genome_dropdown", GENOME_DROPDOWN),
        CatalogEntry::single("genome_hg38_option", GENOME_HG38_OPTION),
        CatalogEntry::pair("search_button", SEARCH_BUTTON),
        CatalogEntry::single("modal_container", MODAL_CONTAINER),
        CatalogEntry::single("germline_tab", GERMLINE_TAB),
        CatalogEntry::single("germline_tab_active", GERMLINE_TAB_ACTIVE),
        CatalogEntry::single("phenotype_input", PHENOTYPE_INPUT),
        CatalogEntry::single("sex_dropdown", SEX_DROPDOWN),
        CatalogEntry::pair("age_input", AGE_INPUT),
        CatalogEntry::pair("ethnicity_dropdown", ETHNICITY_DROPDOWN),
        CatalogEntry::pair("modal_search_button", MODAL_SEARCH_BUTTON),
        CatalogEntry::single("security_proceed_button", SECURITY_PROCEED_BUTTON),
        CatalogEntry::single("results_container", RESULTS_CONTAINER),
        CatalogEntry::single("general_info_card", GENERAL_INFO_CARD),
        CatalogEntry::single("germline_classification_card", GERMLINE_CLASSIFICATION_CARD),
        CatalogEntry::single("pharmgkb_card", PHARMGKB_CARD),
        CatalogEntry::single("clinvar_card", CLINVAR_CARD),
        CatalogEntry::single("lovd_card", LOVD_CARD),
        CatalogEntry::single("publications_card", PUBLICATIONS_CARD),
        CatalogEntry::single("warning_understand_button", WARNING_UNDERSTAND_BUTTON),
        CatalogEntry::pair("verdict", VERDICT),
        CatalogEntry::single("loading_spinner", LOADING_SPINNER),
        CatalogEntry::single("loading_overlay", LOADING_OVERLAY),
        CatalogEntry::single("cookie_accept_button", COOKIE_ACCEPT_BUTTON),
        CatalogEntry::single("version_popup_close", VERSION_POPUP_CLOSE),
    ]
}
