//! Core data types for a single extraction pass.

use serde::{Deserialize, Serialize};

/// Currency tag written into every result.
pub const CURRENCY: &str = "GBP";

/// The record produced by one extraction pass and written to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Best-guess NAV price, without the currency symbol.
    #[serde(alias = "nav_price_gbp")]
    pub nav_price: Option<String>,
    /// Signed change figure as it appeared on the page, e.g. `-£1.23`.
    pub change: Option<String>,
    /// Reserved. Nothing populates it.
    pub change_percentage: Option<String>,
    pub currency: String,
    /// RFC 3339 timestamp taken when extraction started.
    pub last_updated: String,
}

impl ExtractionResult {
    /// An empty result stamped with the given time.
    pub fn empty(last_updated: impl Into<String>) -> Self {
        Self {
            nav_price: None,
            change: None,
            change_percentage: None,
            currency: CURRENCY.to_string(),
            last_updated: last_updated.into(),
        }
    }

    /// An empty result stamped with the current UTC time.
    pub fn started_now() -> Self {
        Self::empty(timestamp_now())
    }

    /// Whether neither heuristic found anything.
    pub fn is_blank(&self) -> bool {
        self.nav_price.is_none() && self.change.is_none()
    }
}

/// Current UTC time in the `2026-10-19T08:15:02.123Z` form.
pub fn timestamp_now() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Errors that can occur in the extraction library.
#[derive(thiserror::Error, Debug)]
pub enum NavError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Convenience result type.
pub type NavResult<T> = Result<T, NavError>;
