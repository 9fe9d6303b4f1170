//! Chromium-based renderer using chromiumoxide.

use super::{NavigationResult, RenderContext, Renderer};
use crate::config::{USER_AGENT, VIEWPORT_HEIGHT, VIEWPORT_WIDTH};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Env var pointing at a specific Chrome/Chromium binary.
pub const CHROMIUM_PATH_ENV: &str = "NAVWATCH_CHROMIUM_PATH";

/// Quiet period after which the network counts as idle.
const NETWORK_IDLE_MS: u64 = 500;

/// Find the Chromium binary path.
///
/// `None` leaves discovery to chromiumoxide.
pub fn find_chromium() -> Option<PathBuf> {
    if let Ok(p) = std::env::var(CHROMIUM_PATH_ENV) {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }

    for name in ["google-chrome", "chromium", "chromium-browser"] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    if cfg!(target_os = "macos") {
        let common =
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    None
}

/// Chromium-based renderer owning one headless browser process.
pub struct ChromiumRenderer {
    browser: Mutex<Option<Browser>>,
    handler: Mutex<Option<JoinHandle<()>>>,
}

impl ChromiumRenderer {
    /// Launch a headless Chromium instance.
    pub async fn launch() -> Result<Self> {
        let mut builder = BrowserConfig::builder();
        if let Some(path) = find_chromium() {
            debug!("Using Chromium at {}", path.display());
            builder = builder.chrome_executable(path);
        }

        let config = builder
            .arg("--headless=new")
            .arg("--no-sandbox")
            .arg("--disable-setuid-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-accelerated-2d-canvas")
            .arg("--no-first-run")
            .arg("--no-zygote")
            .arg("--disable-gpu")
            .arg(format!("--user-agent={USER_AGENT}"))
            .window_size(VIEWPORT_WIDTH, VIEWPORT_HEIGHT)
            .viewport(Viewport {
                width: VIEWPORT_WIDTH,
                height: VIEWPORT_HEIGHT,
                ..Default::default()
            })
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build browser config: {e}"))?;

        info!("Launching browser");
        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("failed to launch Chromium")?;

        let handle = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("browser handler error: {e}");
                }
            }
        });

        Ok(Self {
            browser: Mutex::new(Some(browser)),
            handler: Mutex::new(Some(handle)),
        })
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    async fn new_context(&self) -> Result<Box<dyn RenderContext>> {
        let guard = self.browser.lock().await;
        let browser = guard.as_ref().context("browser already shut down")?;
        let page = browser
            .new_page("about:blank")
            .await
            .context("failed to create new page")?;

        Ok(Box::new(ChromiumContext { page }))
    }

    async fn shutdown(&self) -> Result<()> {
        let Some(mut browser) = self.browser.lock().await.take() else {
            return Ok(());
        };

        info!("Closing browser");
        let closed = browser.close().await;
        let _ = browser.wait().await;

        if let Some(handle) = self.handler.lock().await.take() {
            handle.abort();
        }

        closed.context("failed to close browser")?;
        Ok(())
    }
}

/// A single Chromium page context.
pub struct ChromiumContext {
    page: Page,
}

#[async_trait]
impl RenderContext for ChromiumContext {
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<NavigationResult> {
        let start = Instant::now();
        let timeout_ms = timeout.as_millis().min(u128::from(u64::MAX)) as u64;

        let load = async {
            self.page.goto(url).await.context("navigation failed")?;
            wait_for_network_idle(&self.page, timeout_ms).await
        };

        match tokio::time::timeout(timeout, load).await {
            Ok(Ok(())) => {
                let final_url = self
                    .page
                    .url()
                    .await
                    .unwrap_or_default()
                    .map(|u| u.to_string())
                    .unwrap_or_else(|| url.to_string());

                Ok(NavigationResult {
                    final_url,
                    load_time_ms: start.elapsed().as_millis() as u64,
                })
            }
            Ok(Err(e)) => Err(e),
            Err(_) => bail!("navigation timed out after {timeout_ms}ms"),
        }
    }

    async fn click(&self, selector: &str) -> Result<bool> {
        let element = match self.page.find_element(selector).await {
            Ok(el) => el,
            Err(e) => {
                debug!("no element for {selector}: {e}");
                return Ok(false);
            }
        };
        element
            .click()
            .await
            .with_context(|| format!("failed to click {selector}"))?;
        Ok(true)
    }

    async fn click_button_containing(&self, needle: &str) -> Result<bool> {
        let needle = serde_json::to_string(&needle.to_lowercase())?;
        let script = format!(
            r#"(() => {{
                for (const button of document.querySelectorAll('button')) {{
                    if ((button.textContent || '').toLowerCase().includes({needle})) {{
                        button.click();
                        return true;
                    }}
                }}
                return false;
            }})()"#
        );

        let result = self
            .page
            .evaluate(script)
            .await
            .context("button scan failed")?;

        result
            .into_value::<bool>()
            .map_err(|e| anyhow::anyhow!("failed to convert button scan result: {e:?}"))
    }

    async fn get_html(&self) -> Result<String> {
        let result = self
            .page
            .evaluate("document.documentElement.outerHTML")
            .await
            .context("failed to get HTML")?;

        let html: String = result
            .into_value()
            .map_err(|e| anyhow::anyhow!("failed to convert HTML result: {e:?}"))?;

        Ok(html)
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.page.close().await.context("failed to close page")?;
        Ok(())
    }
}

/// Poll resource timing entries until the count holds still for
/// `NETWORK_IDLE_MS` with the document complete.
async fn wait_for_network_idle(page: &Page, timeout_ms: u64) -> Result<()> {
    let script = format!(
        r#"(async () => {{
            const timeoutMs = {timeout_ms};
            const idleMs = {NETWORK_IDLE_MS};
            const interval = 100;
            const start = Date.now();
            let last = performance.getEntriesByType('resource').length;
            let stable = 0;
            while (Date.now() - start < timeoutMs) {{
                await new Promise(r => setTimeout(r, interval));
                const count = performance.getEntriesByType('resource').length;
                if (document.readyState === 'complete' && count === last) {{
                    stable += interval;
                    if (stable >= idleMs) {{
                        return {{ ok: true, resources: count, waitedMs: Date.now() - start }};
                    }}
                }} else {{
                    stable = 0;
                }}
                last = count;
            }}
            return {{ ok: false, resources: last, waitedMs: Date.now() - start }};
        }})()"#
    );

    let info: serde_json::Value = page
        .evaluate(script)
        .await
        .context("network idle check failed")?
        .into_value()
        .map_err(|e| anyhow::anyhow!("failed to convert idle check result: {e:?}"))?;

    let resources = info["resources"].as_u64().unwrap_or(0);
    let waited = info["waitedMs"].as_u64().unwrap_or(0);
    if info["ok"].as_bool().unwrap_or(false) {
        debug!(resources, waited_ms = waited, "network idle");
        Ok(())
    } else {
        bail!("network did not go idle within {timeout_ms}ms ({resources} resources)")
    }
}
