//! The export pipeline.
//!
//! ```text
//! HTML string
//!     ↓  Sandbox::create
//! host document (DOM + style sheets)
//!     ↓  wait_until_stylable (bounded poll)
//!     ↓  RuleSet::from_sheets → inline_rule_set → extract_body_style
//!     ↓  strip <style> / <link rel=stylesheet>
//!     ↓  normalize(body)
//! <div style="{body style}; {suffix}">{body content}</div>
//! ```
//!
//! Any failure along the way yields the input unchanged.

use std::borrow::Cow;

use log::{debug, warn};
use serde::Serialize;
use vellum_css::{CascadeStats, RuleSet, extract_body_style, inline_rule_set, is_stylesheet_link};
use vellum_dom::{AttributesMap, DomTree, NodeId};
use vellum_html::serialize_node;

use crate::config::ExportConfig;
use crate::error::{ExportError, catch_panic};
use crate::host::{DocumentHost, HostDocument};
use crate::normalize::normalize;
use crate::sandbox::Sandbox;

/// Result of one export, with counters from every step.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ExportReport {
    /// The exported fragment, or the input when `fell_back` is set.
    pub html: String,
    /// Processing failed and `html` is the untouched input.
    pub fell_back: bool,
    /// Some sheet had a readable rule before the wait ended.
    pub stylable: bool,
    /// Layout passes spent waiting.
    pub poll_attempts: u32,
    /// Style sheets attached to the document.
    pub sheets: usize,
    /// Style rules indexed from readable sheets.
    pub rules_indexed: usize,
    /// Inliner counters.
    #[serde(flatten)]
    pub cascade: CascadeStats,
    /// `<style>` and stylesheet `<link>` elements removed.
    pub style_elements_removed: usize,
    /// Paragraphs made by the normalizer.
    pub paragraphs_synthesized: usize,
}

impl ExportReport {
    fn fallback(html: &str) -> Self {
        Self {
            html: html.to_string(),
            fell_back: true,
            ..Self::default()
        }
    }
}

/// Runs exports against one [`DocumentHost`].
///
/// Each call creates and owns its own sandbox; an `Exporter` holds no
/// per-export state and can serve concurrent calls.
#[derive(Debug, Clone, Default)]
pub struct Exporter<H: DocumentHost> {
    host: H,
    config: ExportConfig,
}

impl<H: DocumentHost> Exporter<H> {
    /// An exporter with the default configuration.
    pub fn new(host: H) -> Self {
        Self {
            host,
            config: ExportConfig::default(),
        }
    }

    /// Replace the configuration.
    ///
    /// # Errors
    ///
    /// [`ExportError::Config`] if `config` fails validation.
    pub fn with_config(mut self, config: ExportConfig) -> Result<Self, ExportError> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// The host.
    pub const fn host(&self) -> &H {
        &self.host
    }

    /// The configuration.
    pub const fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Export `html`, or return it unchanged if that is not possible.
    pub async fn render(&self, html: &str) -> String {
        self.render_detailed(html, &[]).await.html
    }

    /// Export `html` styled by `stylesheets` in addition to any sheets it
    /// carries itself.
    pub async fn render_with_stylesheets(&self, html: &str, stylesheets: &[&str]) -> String {
        self.render_detailed(html, stylesheets).await.html
    }

    /// [`Exporter::render_with_stylesheets`], with counters.
    ///
    /// The extra sheets come first in cascade order. On failure the report
    /// carries the original `html`, without the extra sheets.
    pub async fn render_detailed(&self, html: &str, stylesheets: &[&str]) -> ExportReport {
        let source = with_stylesheets(html, stylesheets);
        match self.try_render(&source).await {
            Ok(report) => report,
            Err(err) => {
                warn!("export failed, returning input unchanged: {err}");
                ExportReport::fallback(html)
            }
        }
    }

    /// Export `html`, surfacing the error instead of falling back.
    ///
    /// # Errors
    ///
    /// [`ExportError::SandboxUnavailable`] if the host provides no document,
    /// [`ExportError::Processing`] if any later step fails or panics.
    pub async fn try_render(&self, html: &str) -> Result<ExportReport, ExportError> {
        let config = &self.config;

        // STEP 1: Acquire the sandbox. From here on, every return path drops
        //         it, which destroys the host document exactly once.
        let mut sandbox = Sandbox::create(&self.host, html, config.viewport)?;

        // STEP 2: Wait (bounded) for style sheets. Not becoming stylable is
        //         not an error; the export proceeds with what is there.
        let readiness = sandbox
            .wait_until_stylable(
                config.max_attempts,
                config.poll_interval(),
                config.settle_when_idle,
            )
            .await?;

        // STEP 3-7: Index, inline, extract, strip, normalize, serialize.
        let mut report = catch_panic("export", || process(sandbox.document_mut(), config))?;
        report.stylable = readiness.ready;
        report.poll_attempts = readiness.attempts;
        debug!(
            "exported {} bytes: {} properties inlined, {} paragraphs synthesized",
            report.html.len(),
            report.cascade.properties_written,
            report.paragraphs_synthesized
        );
        Ok(report)
    }
}

/// Put `stylesheets` in `<style>` elements ahead of `html`.
fn with_stylesheets<'a>(html: &'a str, stylesheets: &[&str]) -> Cow<'a, str> {
    if stylesheets.is_empty() {
        return Cow::Borrowed(html);
    }
    let mut source = String::new();
    for css in stylesheets {
        source.push_str("<style>");
        source.push_str(css);
        source.push_str("</style>");
    }
    source.push_str(html);
    Cow::Owned(source)
}

fn process(document: &mut HostDocument, config: &ExportConfig) -> Result<ExportReport, ExportError> {
    let rule_set = RuleSet::from_sheets(&document.sheets);
    let tree = &mut document.tree;

    let cascade = inline_rule_set(tree, &rule_set);
    let body_style = extract_body_style(tree, &rule_set);
    let style_elements_removed = strip_style_elements(tree);

    let body = tree
        .body()
        .ok_or_else(|| ExportError::Processing("document has no body".to_string()))?;
    let paragraphs_synthesized = normalize(tree, body, &config.paragraph_style);
    let html = wrap_body(tree, body, &wrapper_style(&body_style, &config.wrapper_suffix));

    Ok(ExportReport {
        html,
        sheets: document.sheets.len(),
        rules_indexed: rule_set.len(),
        cascade,
        style_elements_removed,
        paragraphs_synthesized,
        ..ExportReport::default()
    })
}

/// Detach every `<style>` and stylesheet `<link>`, returning how many.
fn strip_style_elements(tree: &mut DomTree) -> usize {
    let doomed: Vec<NodeId> = tree
        .descendants(tree.root())
        .filter(|&id| {
            tree.as_element(id)
                .is_some_and(|e| e.is("style") || (e.is("link") && is_stylesheet_link(e)))
        })
        .collect();
    for &id in &doomed {
        tree.detach(id);
    }
    doomed.len()
}

/// The wrapper's `style`: the body declarations, then `suffix`.
#[must_use]
pub fn wrapper_style(body_style: &str, suffix: &str) -> String {
    let body = body_style.trim().trim_end_matches(';').trim_end();
    let suffix = suffix.trim();
    match (body.is_empty(), suffix.is_empty()) {
        (true, _) => suffix.to_string(),
        (false, true) => format!("{body};"),
        (false, false) => format!("{body}; {suffix}"),
    }
}

/// Move the body's children into a styled `<div>` and serialize it.
fn wrap_body(tree: &mut DomTree, body: NodeId, style: &str) -> String {
    let wrapper = tree.create_element("div", AttributesMap::new());
    if let Some(element) = tree.as_element_mut(wrapper) {
        element.set_style(style.to_string());
    }
    tree.move_children(body, wrapper);
    serialize_node(tree, wrapper)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapper_style() {
        let suffix = "width:100%; min-height:100%; box-sizing:border-box;";
        assert_eq!(
            wrapper_style("color: red; padding: 8px;", suffix),
            "color: red; padding: 8px; width:100%; min-height:100%; box-sizing:border-box;"
        );
        assert_eq!(wrapper_style("", suffix), suffix);
        assert_eq!(wrapper_style("color: red", ""), "color: red;");
    }

    #[test]
    fn test_with_stylesheets_prepends_style_elements() {
        assert_eq!(with_stylesheets("<p>x</p>", &[]), "<p>x</p>");
        assert_eq!(
            with_stylesheets("<p>x</p>", &[".a{}", "p{}"]),
            "<style>.a{}</style><style>p{}</style><p>x</p>"
        );
    }
}
