//! JSON result file writer/reader and the console report.

use std::io::{Read, Write};
use std::path::Path;

use crate::types::{ExtractionResult, NavResult};

/// File the scrape pipeline writes into the working directory.
pub const OUTPUT_FILE: &str = "vanguard_fund_data.json";

/// Heading printed above every report.
pub const FUND_TITLE: &str = "VANGUARD LIFESTRATEGY 100 EQUITY FUND";

const RULE_WIDTH: usize = 50;

/// Writer for result files.
pub struct ResultWriter;

/// Reader for result files.
pub struct ResultReader;

impl ResultWriter {
    /// Write a result as indented JSON, replacing any existing file.
    pub fn write_to_file(result: &ExtractionResult, path: &Path) -> NavResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut file = std::fs::File::create(path)?;
        Self::write_to(result, &mut file)
    }

    /// Write a result as indented JSON to any writer.
    pub fn write_to<W: Write>(result: &ExtractionResult, writer: &mut W) -> NavResult<()> {
        serde_json::to_writer_pretty(&mut *writer, result)?;
        writer.flush()?;
        Ok(())
    }
}

impl ResultReader {
    /// Read a result file back.
    pub fn read_from_file(path: &Path) -> NavResult<ExtractionResult> {
        let mut file = std::fs::File::open(path)?;
        Self::read_from(&mut file)
    }

    pub fn read_from<R: Read>(reader: &mut R) -> NavResult<ExtractionResult> {
        Ok(serde_json::from_reader(reader)?)
    }
}

/// Local wall-clock time as shown in the report, e.g. `19/10/2026, 09:15:02`.
pub fn report_timestamp() -> String {
    chrono::Local::now().format("%d/%m/%Y, %H:%M:%S").to_string()
}

/// Human-readable banner report. `printed_at` is shown as the update time.
pub fn format_report(result: &ExtractionResult, printed_at: &str) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut lines = vec![
        String::new(),
        rule.clone(),
        FUND_TITLE.to_string(),
        rule.clone(),
    ];

    match &result.nav_price {
        Some(price) => lines.push(format!("NAV Price (GBP): £{price}")),
        None => lines.push("NAV Price (GBP): Not found".to_string()),
    }
    match &result.change {
        Some(change) => lines.push(format!("Change: {change}")),
        None => lines.push("Change: Not found".to_string()),
    }
    if let Some(pct) = &result.change_percentage {
        lines.push(format!("Change %: {pct}"));
    }

    lines.push(format!("Last Updated: {printed_at}"));
    lines.push(rule);
    lines.join("\n")
}
