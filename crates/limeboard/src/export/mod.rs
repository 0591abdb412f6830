//! Leaderboard renderers.

mod format;
mod html;
mod json;
mod text;

pub use format::ExportFormat;
pub use html::HtmlExporter;
pub use json::{JsonExporter, format_json_entry};
pub use text::TextExporter;
