//! Renderer abstraction for browser-based page loading.
//!
//! Defines the `Renderer` and `RenderContext` traits that abstract over
//! the browser engine (Chromium via chromiumoxide). The scrape pipeline
//! only talks to these traits.

pub mod chromium;

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

/// Result of navigating to a URL.
#[derive(Debug, Clone)]
pub struct NavigationResult {
    /// The final URL after any redirects.
    pub final_url: String,
    /// Time until the network went idle, in milliseconds.
    pub load_time_ms: u64,
}

/// A browser engine that can create rendering contexts.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Create a new browser context (tab).
    async fn new_context(&self) -> Result<Box<dyn RenderContext>>;
    /// Shut down the browser engine. Calls after the first are no-ops.
    async fn shutdown(&self) -> Result<()>;
}

/// A single browser context (tab) for rendering pages.
#[async_trait]
pub trait RenderContext: Send + Sync {
    /// Navigate to a URL and wait for the network to go idle, failing if
    /// both do not complete within `timeout`.
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<NavigationResult>;
    /// Click the first element matching a CSS selector. `Ok(false)` when
    /// nothing matches.
    async fn click(&self, selector: &str) -> Result<bool>;
    /// Click the first `<button>` whose text contains `needle`,
    /// case-insensitively. `Ok(false)` when none does.
    async fn click_button_containing(&self, needle: &str) -> Result<bool>;
    /// Get the full rendered page HTML.
    async fn get_html(&self) -> Result<String>;
    /// Close this context.
    async fn close(self: Box<Self>) -> Result<()>;
}
