//! Utilities shared by the WFE forms crates.

pub mod config;
pub mod html;
mod path_processing;

pub use config::{ConfigError, FormsConfig};
pub use html::{escape_html, escape_html_text};
pub use path_processing::expand_tilde;
