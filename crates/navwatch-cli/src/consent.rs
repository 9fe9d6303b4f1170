//! Cookie-consent dismissal as an ordered list of click strategies.

use tracing::{debug, info};

use crate::renderer::RenderContext;

/// One way of finding and clicking a consent button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsentStrategy {
    /// Click the first element matching a CSS selector.
    Selector(&'static str),
    /// Click the first `<button>` whose text contains this, case-insensitively.
    ButtonText(&'static str),
}

/// Strategies tried in order until one clicks something.
pub const CONSENT_STRATEGIES: &[ConsentStrategy] = &[
    ConsentStrategy::Selector(r#"button[id*="accept"]"#),
    ConsentStrategy::Selector(r#"button[class*="accept"]"#),
    ConsentStrategy::Selector(r#"button[data-testid*="accept"]"#),
    ConsentStrategy::Selector(r#"[data-cy="accept-all-cookies"]"#),
    ConsentStrategy::Selector("#accept-cookies"),
    ConsentStrategy::Selector(".accept-cookies"),
    ConsentStrategy::Selector(r#"button[aria-label*="accept"]"#),
    ConsentStrategy::ButtonText("accept"),
];

impl ConsentStrategy {
    async fn try_click(&self, ctx: &dyn RenderContext) -> anyhow::Result<bool> {
        match self {
            ConsentStrategy::Selector(selector) => ctx.click(selector).await,
            ConsentStrategy::ButtonText(needle) => ctx.click_button_containing(needle).await,
        }
    }
}

/// Try each strategy in turn. Returns the one that clicked, if any.
///
/// Never fails: a strategy that errors is logged and skipped.
pub async fn dismiss_cookie_consent(
    ctx: &dyn RenderContext,
    strategies: &[ConsentStrategy],
) -> Option<ConsentStrategy> {
    for strategy in strategies {
        match strategy.try_click(ctx).await {
            Ok(true) => {
                info!("Found cookie consent button: {strategy:?}");
                return Some(*strategy);
            }
            Ok(false) => {}
            Err(e) => debug!("Consent strategy {strategy:?} failed: {e:#}"),
        }
    }

    info!("No cookie consent found or already handled");
    None
}
