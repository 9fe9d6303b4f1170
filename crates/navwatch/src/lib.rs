//! navwatch: heuristic extraction of a fund's NAV price and daily change
//! from rendered HTML, plus the JSON result file and console report.

pub mod dom;
pub mod extract;
pub mod output;
pub mod types;

pub use extract::{ExtractConfig, Extractor};
pub use output::{format_report, report_timestamp, ResultReader, ResultWriter, OUTPUT_FILE};
pub use types::*;
