//! Portable HTML export for the Vellum engine.
//!
//! Turns editor-authored HTML, styled through classes and attached style
//! sheets, into a self-contained fragment: matched declarations are baked
//! into inline `style` attributes, style elements are removed, and every
//! container holds only block or only inline content.
//!
//! # Scope
//!
//! - **Document host** - injectable rendering context ([`DocumentHost`]),
//!   with an in-process implementation ([`HeadlessHost`])
//! - **Render sandbox** - scoped host document with a bounded, async wait for
//!   style sheets ([`Sandbox`])
//! - **Structural normalizer** - block/inline content-model repair ([`normalize`])
//! - **Pipeline** - the whole export, total from the caller's side ([`Exporter`])
//!
//! ```rust,ignore
//! let exporter = Exporter::new(HeadlessHost::new());
//! let html = exporter
//!     .render_with_stylesheets(r#"<div class="red">Hi</div>"#, &[".red { color: red }"])
//!     .await;
//! ```

pub mod config;
pub mod error;
pub mod host;
pub mod normalize;
pub mod pipeline;
pub mod sandbox;

pub use config::{ConfigError, ExportConfig, Viewport};
pub use error::ExportError;
pub use host::{DocumentHost, HeadlessHost, HostDocument, StylesheetResolver};
pub use normalize::{BLOCK_TAGS, ContentClass, classify, is_block_element, normalize};
pub use pipeline::{ExportReport, Exporter, wrapper_style};
pub use sandbox::{Readiness, Sandbox};

/// Export `html` with the default host and configuration.
///
/// Never fails: if the export cannot be completed the input is returned
/// unchanged.
pub async fn render(html: &str) -> String {
    Exporter::new(HeadlessHost::new()).render(html).await
}
