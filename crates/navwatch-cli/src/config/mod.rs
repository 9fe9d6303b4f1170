//! Run settings and their resolution.

use std::path::PathBuf;
use std::time::Duration;

use navwatch::{ExtractConfig, OUTPUT_FILE};

/// The fund overview page. Not configurable.
pub const TARGET_URL: &str = "https://www.vanguardinvestor.co.uk/investments/vanguard-lifestrategy-100-equity-fund-accumulation-shares/overview";

/// Desktop user agent presented by the headless browser.
pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

pub const VIEWPORT_WIDTH: u32 = 1366;
pub const VIEWPORT_HEIGHT: u32 = 768;

/// Env var overriding the price threshold.
pub const MIN_PRICE_ENV: &str = "NAVWATCH_MIN_PRICE";

/// Everything one scrape run needs.
#[derive(Debug, Clone)]
pub struct Settings {
    pub url: String,
    pub output_path: PathBuf,
    /// Upper bound for navigation plus the network-idle wait.
    pub navigation_timeout: Duration,
    /// Pause after a consent button was clicked.
    pub consent_settle: Duration,
    /// Pause before the page HTML is captured.
    pub render_settle: Duration,
    pub extract: ExtractConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            url: TARGET_URL.to_string(),
            output_path: PathBuf::from(OUTPUT_FILE),
            navigation_timeout: Duration::from_secs(30),
            consent_settle: Duration::from_secs(2),
            render_settle: Duration::from_secs(3),
            extract: ExtractConfig::default(),
        }
    }
}

impl Settings {
    /// Defaults, with the price threshold taken from the flag or env.
    pub fn resolve(min_price: Option<f64>) -> Self {
        let env_value = std::env::var(MIN_PRICE_ENV).ok();
        let mut settings = Self::default();
        settings.extract.min_price = resolve_min_price(min_price, env_value.as_deref());
        settings
    }
}

/// Flag beats env beats default. A malformed env value is ignored.
pub fn resolve_min_price(explicit: Option<f64>, env_value: Option<&str>) -> f64 {
    if let Some(value) = explicit {
        return value;
    }

    if let Some(raw) = env_value {
        match raw.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => return value,
            _ => tracing::warn!("Ignoring invalid {MIN_PRICE_ENV}={raw:?}"),
        }
    }

    ExtractConfig::default().min_price
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.url, TARGET_URL);
        assert_eq!(s.output_path, PathBuf::from("vanguard_fund_data.json"));
        assert_eq!(s.navigation_timeout, Duration::from_secs(30));
        assert_eq!(s.extract.min_price, 1.0);
    }

    #[test]
    fn test_min_price_precedence() {
        assert_eq!(resolve_min_price(Some(5.0), Some("9")), 5.0);
        assert_eq!(resolve_min_price(None, Some(" 9.5 ")), 9.5);
        assert_eq!(resolve_min_price(None, None), 1.0);
    }

    #[test]
    fn test_min_price_bad_env_falls_back() {
        assert_eq!(resolve_min_price(None, Some("lots")), 1.0);
        assert_eq!(resolve_min_price(None, Some("NaN")), 1.0);
    }
}
