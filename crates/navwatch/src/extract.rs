//! Best-effort NAV price and change extraction from rendered HTML.
//!
//! Both heuristics are plain text scans over the flattened document. They
//! never fail: a figure that cannot be located is left as `None`.

use regex::Regex;
use scraper::Html;
use tracing::{debug, info};

use crate::dom::{self, Candidate};
use crate::types::{timestamp_now, ExtractionResult, NavResult};

/// Labels matched against an element's full text.
const PRICE_LABELS: &[&str] = &["nav price", "nav", "net asset value"];

/// Label matched against an element's direct text only.
const PRICE_DIRECT_LABEL: &str = "price";

/// Tags a price candidate widens to before its text is searched.
const AREA_TAGS: &[&str] = &["div", "section", "article", "table", "tr", "td"];

const CHANGE_LABEL: &str = "change";

const PREVIEW_CHARS: usize = 100;

/// Tunables for the extraction heuristics.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractConfig {
    /// Symbol that prefixes price figures on the page.
    pub currency_symbol: String,
    /// A price must be strictly greater than this to be accepted. Skips
    /// small figures such as fee percentages quoted in pounds.
    pub min_price: f64,
    /// Whether a change figure needs a leading `+` or `-`.
    pub require_change_sign: bool,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            currency_symbol: "£".to_string(),
            min_price: 1.0,
            require_change_sign: true,
        }
    }
}

/// Runs the price and change heuristics over a document.
#[derive(Debug, Clone)]
pub struct Extractor {
    config: ExtractConfig,
    price_re: Regex,
    change_re: Regex,
}

impl Extractor {
    /// Compile the patterns for the given configuration.
    pub fn new(config: ExtractConfig) -> NavResult<Self> {
        let symbol = regex::escape(&config.currency_symbol);
        let price_re = Regex::new(&format!(r"{symbol}([0-9]+\.?[0-9]*)"))?;
        let sign = if config.require_change_sign {
            "[+-]"
        } else {
            "[+-]?"
        };
        let change_re = Regex::new(&format!(r"({sign}(?:{symbol})?[0-9]+\.?[0-9]*)"))?;
        Ok(Self {
            config,
            price_re,
            change_re,
        })
    }

    pub fn config(&self) -> &ExtractConfig {
        &self.config
    }

    /// Extract from raw HTML, stamping the result with the current time.
    pub fn extract(&self, html: &str) -> ExtractionResult {
        self.extract_at(html, timestamp_now())
    }

    /// Extract from raw HTML with an explicit timestamp.
    pub fn extract_at(&self, html: &str, last_updated: impl Into<String>) -> ExtractionResult {
        let mut result = ExtractionResult::empty(last_updated);
        let doc = Html::parse_document(html);

        info!("Starting HTML parsing for NAV price");
        result.nav_price = self.find_nav_price(&doc);
        result.change = self.find_change(&doc);

        info!(
            nav_price = ?result.nav_price,
            change = ?result.change,
            "Extraction complete"
        );
        result
    }

    /// First currency figure above the threshold near a NAV/price label.
    pub fn find_nav_price(&self, doc: &Html) -> Option<String> {
        let candidates: Vec<Candidate<'_>> =
            dom::flatten(doc).filter(is_price_candidate).collect();
        info!(
            "Found {} candidate elements containing NAV/price",
            candidates.len()
        );

        for candidate in &candidates {
            debug!(
                "Checking candidate: {}",
                dom::preview(&candidate.text, PREVIEW_CHARS)
            );

            let area = dom::closest(candidate.element, AREA_TAGS).unwrap_or(candidate.element);
            let area_text = dom::text_content(area);

            let matches: Vec<&str> = self
                .price_re
                .captures_iter(&area_text)
                .filter_map(|caps| caps.get(1))
                .map(|m| m.as_str())
                .collect();
            if matches.is_empty() {
                continue;
            }
            debug!("Found price matches in area: {matches:?}");

            for value in matches {
                match value.parse::<f64>() {
                    Ok(price) if price > self.config.min_price => {
                        info!("Selected NAV price: {value}");
                        return Some(value.to_string());
                    }
                    _ => {}
                }
            }
        }

        None
    }

    /// Signed figure in, or after, the first node mentioning "change".
    pub fn find_change(&self, doc: &Html) -> Option<String> {
        let label = dom::walk(dom::body(doc))
            .find(|node| node.text().to_lowercase().contains(CHANGE_LABEL))?;
        info!(
            "Found {CHANGE_LABEL} label: {}",
            dom::preview(&label.text(), PREVIEW_CHARS)
        );

        let element = label.enclosing_element()?;

        let own = dom::text_content(element);
        if let Some(value) = self.match_change(&own) {
            info!("Found change value: {value}");
            return Some(value);
        }

        for sibling in dom::next_element_siblings(element) {
            if let Some(value) = self.match_change(&dom::text_content(sibling)) {
                info!("Found change value in sibling: {value}");
                return Some(value);
            }
        }

        debug!("No change value near label");
        None
    }

    fn match_change(&self, text: &str) -> Option<String> {
        self.change_re
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }
}

impl Default for Extractor {
    fn default() -> Self {
        // The default symbol escapes to a valid pattern.
        Self::new(ExtractConfig::default()).expect("default extractor patterns are valid")
    }
}

fn is_price_candidate(candidate: &Candidate<'_>) -> bool {
    let text = candidate.text.to_lowercase();
    PRICE_LABELS.iter().any(|label| text.contains(label))
        || candidate
            .direct_text
            .to_lowercase()
            .contains(PRICE_DIRECT_LABEL)
}
