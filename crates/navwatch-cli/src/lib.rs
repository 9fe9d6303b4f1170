//! navwatch CLI: headless-browser loading, cookie-consent handling, the
//! scrape pipeline and the SMTP test utility.

pub mod config;
pub mod consent;
pub mod mail;
pub mod pipeline;
pub mod renderer;

pub use config::Settings;
pub use renderer::{RenderContext, Renderer};
