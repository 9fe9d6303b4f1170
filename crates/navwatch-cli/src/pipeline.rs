//! The scrape pipeline: load the page, extract, write the result.

use anyhow::{Context, Result};
use navwatch::{format_report, report_timestamp, ExtractionResult, Extractor, ResultWriter};
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::consent::{dismiss_cookie_consent, CONSENT_STRATEGIES};
use crate::renderer::chromium::ChromiumRenderer;
use crate::renderer::{RenderContext, Renderer};

/// Launch Chromium, scrape, print the report and write the result file.
pub async fn run(settings: &Settings) -> Result<ExtractionResult> {
    let renderer = ChromiumRenderer::launch().await?;
    let result = scrape(&renderer, settings).await?;
    write_output(&result, settings)?;
    Ok(result)
}

/// Load the page through `renderer` and extract from it.
///
/// The renderer is shut down exactly once before this returns, whether
/// loading succeeded or not.
pub async fn scrape(renderer: &dyn Renderer, settings: &Settings) -> Result<ExtractionResult> {
    let loaded = load_page(renderer, settings).await;
    if let Err(e) = renderer.shutdown().await {
        warn!("Failed to shut down browser: {e:#}");
    }
    let html = loaded?;

    info!("Extracting fund data");
    let extractor = Extractor::new(settings.extract.clone())?;
    let result = extractor.extract(&html);
    info!("Fund data extracted: {result:?}");
    Ok(result)
}

/// Print the report and write the result file. Write errors propagate.
pub fn write_output(result: &ExtractionResult, settings: &Settings) -> Result<()> {
    println!("{}", format_report(result, &report_timestamp()));

    ResultWriter::write_to_file(result, &settings.output_path)
        .with_context(|| format!("failed to write {}", settings.output_path.display()))?;
    println!("\nData saved to {}", settings.output_path.display());
    Ok(())
}

async fn load_page(renderer: &dyn Renderer, settings: &Settings) -> Result<String> {
    let mut ctx = renderer.new_context().await?;
    let html = visit(ctx.as_mut(), settings).await;
    if let Err(e) = ctx.close().await {
        debug!("Failed to close page: {e:#}");
    }
    html
}

async fn visit(ctx: &mut dyn RenderContext, settings: &Settings) -> Result<String> {
    info!("Navigating to: {}", settings.url);
    let nav = ctx.navigate(&settings.url, settings.navigation_timeout).await?;
    info!(
        final_url = %nav.final_url,
        load_time_ms = nav.load_time_ms,
        "Page loaded"
    );

    if dismiss_cookie_consent(&*ctx, CONSENT_STRATEGIES).await.is_some() {
        tokio::time::sleep(settings.consent_settle).await;
    }

    // late widgets render after network idle
    tokio::time::sleep(settings.render_settle).await;

    ctx.get_html().await
}
