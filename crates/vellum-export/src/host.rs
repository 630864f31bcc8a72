//! The rendering context the sandbox runs in.
//!
//! [`DocumentHost`] is the seam between the pipeline and whatever actually
//! parses and lays out documents. [`HeadlessHost`] is the in-process
//! implementation built on the Vellum HTML and CSS crates.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, trace};
use vellum_css::{
    SheetOrigin, SheetState, StyleSheet, StylesheetSource, collect_stylesheet_sources,
    parse_stylesheet,
};
use vellum_dom::{DomTree, NodeId};
use vellum_html::parse_document;

use crate::config::Viewport;
use crate::error::ExportError;
use crate::normalize::is_block_element;

/// A parsed document owned by a host, with its style sheets in document order.
#[derive(Debug, Clone)]
pub struct HostDocument {
    /// The DOM.
    pub tree: DomTree,
    /// [CSSOM § 6.2.1](https://www.w3.org/TR/cssom-1/#the-stylesheet-interface)
    /// "the document or shadow root CSS style sheets"
    pub sheets: Vec<StyleSheet>,
    /// Render context size.
    pub viewport: Viewport,
    /// Layout passes run so far.
    pub layout_passes: u32,
}

impl HostDocument {
    /// Wrap `tree`, registering one sheet per `<style>` and stylesheet
    /// `<link>`. `<style>` sheets are parsed now; linked sheets start pending.
    #[must_use]
    pub fn new(tree: DomTree, viewport: Viewport) -> Self {
        let sheets = collect_stylesheet_sources(&tree)
            .into_iter()
            .map(|source| match source {
                StylesheetSource::Inline { node, css } => {
                    StyleSheet::inline(node, parse_stylesheet(&css))
                }
                StylesheetSource::External { node, href } => StyleSheet {
                    origin: SheetOrigin::Link { node, href },
                    state: SheetState::Pending,
                },
            })
            .collect();
        Self {
            tree,
            sheets,
            viewport,
            layout_passes: 0,
        }
    }

    /// At least one sheet exists and at least one has a readable rule.
    #[must_use]
    pub fn is_stylable(&self) -> bool {
        self.sheets.iter().any(StyleSheet::has_readable_rule)
    }

    /// Some sheet is still loading.
    #[must_use]
    pub fn has_pending_sheets(&self) -> bool {
        self.sheets
            .iter()
            .any(|sheet| matches!(sheet.state, SheetState::Pending))
    }
}

/// An isolated rendering context.
///
/// Every document returned by [`DocumentHost::create`] must be passed to
/// [`DocumentHost::destroy`] exactly once; [`crate::Sandbox`] guarantees this.
pub trait DocumentHost {
    /// Parse `html` into a fresh, off-screen document.
    ///
    /// # Errors
    ///
    /// [`ExportError::SandboxUnavailable`] if the host cannot provide one.
    fn create(&self, html: &str, viewport: Viewport) -> Result<HostDocument, ExportError>;

    /// Run a layout pass and return the document height in CSS pixels.
    ///
    /// Pending stylesheet loads may complete as a side effect.
    fn force_layout(&self, document: &mut HostDocument) -> f32;

    /// Release the document's resources.
    fn destroy(&self, document: &mut HostDocument);
}

/// Where linked stylesheets are loaded from.
#[derive(Debug, Clone, Default)]
pub enum StylesheetResolver {
    /// Nothing can be fetched; every linked sheet fails to load.
    #[default]
    Offline,
    /// Exact `href` to CSS text.
    Memory(HashMap<String, String>),
    /// Relative `href`s (and `file:` URLs) are read from disk under this directory.
    Directory(PathBuf),
}

impl StylesheetResolver {
    /// Load `href`: [`SheetState::Loaded`] on success, [`SheetState::Opaque`]
    /// for cross-origin URLs and failed loads.
    #[must_use]
    pub fn resolve(&self, href: &str) -> SheetState {
        match self.fetch(href) {
            Some(css) => SheetState::Loaded(parse_stylesheet(&css)),
            None => SheetState::Opaque,
        }
    }

    fn fetch(&self, href: &str) -> Option<String> {
        match self {
            Self::Offline => None,
            Self::Memory(sheets) => sheets.get(href).cloned(),
            Self::Directory(base) => {
                let path = local_path(href)?;
                let path = if path.is_absolute() {
                    path.to_path_buf()
                } else {
                    base.join(path)
                };
                fs::read_to_string(&path)
                    .inspect_err(|err| debug!("failed to read {}: {err}", path.display()))
                    .ok()
            }
        }
    }
}

/// The filesystem path an `href` names, or `None` if it has any scheme other
/// than `file:` (or is protocol-relative).
fn local_path(href: &str) -> Option<&Path> {
    if let Some(rest) = href.strip_prefix("file://") {
        return Some(Path::new(rest));
    }
    if href.starts_with("//") {
        return None;
    }
    // [URL § 4.4](https://url.spec.whatwg.org/#scheme-state)
    // A scheme is an ASCII alpha followed by alphanumerics, '+', '-' or '.', then ':'.
    let has_scheme = href.split_once(':').is_some_and(|(scheme, _)| {
        scheme.len() > 1
            && scheme.starts_with(|c: char| c.is_ascii_alphabetic())
            && scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    });
    let path = href.split(['?', '#']).next().unwrap_or_default();
    (!has_scheme && !path.is_empty()).then(|| Path::new(path))
}

/// Height of one line box in the layout estimate.
const LINE_HEIGHT: f32 = 18.0;
/// Average glyph advance in the layout estimate.
const GLYPH_WIDTH: u32 = 8;

/// The in-process host.
///
/// Layout is an estimate: every block-level element takes one line box, plus
/// one per viewport-width of direct text, so the height is deterministic and
/// grows with the content.
#[derive(Debug, Clone, Default)]
pub struct HeadlessHost {
    resolver: StylesheetResolver,
    load_delay: u32,
    refuse_access: bool,
}

impl HeadlessHost {
    /// A host that cannot fetch linked sheets.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load linked sheets through `resolver`.
    #[must_use]
    pub fn with_resolver(mut self, resolver: StylesheetResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Serve `css` for `href`, switching to an in-memory resolver if needed.
    #[must_use]
    pub fn with_stylesheet(mut self, href: &str, css: &str) -> Self {
        if !matches!(self.resolver, StylesheetResolver::Memory(_)) {
            self.resolver = StylesheetResolver::Memory(HashMap::new());
        }
        if let StylesheetResolver::Memory(sheets) = &mut self.resolver {
            let _ = sheets.insert(href.to_string(), css.to_string());
        }
        self
    }

    /// Resolve linked sheets only from the given layout pass on (1-based).
    #[must_use]
    pub const fn with_load_delay(mut self, passes: u32) -> Self {
        self.load_delay = passes;
        self
    }

    /// Refuse every [`DocumentHost::create`].
    #[must_use]
    pub const fn refusing_access(mut self) -> Self {
        self.refuse_access = true;
        self
    }

    fn load_pending_sheets(&self, document: &mut HostDocument) {
        for sheet in &mut document.sheets {
            let SheetOrigin::Link { href, .. } = &sheet.origin else {
                continue;
            };
            if !matches!(sheet.state, SheetState::Pending) {
                continue;
            }
            sheet.state = self.resolver.resolve(href);
            trace!(
                "linked sheet `{href}` {}",
                if matches!(sheet.state, SheetState::Opaque) {
                    "is opaque"
                } else {
                    "loaded"
                }
            );
        }
    }
}

impl DocumentHost for HeadlessHost {
    fn create(&self, html: &str, viewport: Viewport) -> Result<HostDocument, ExportError> {
        if self.refuse_access {
            return Err(ExportError::SandboxUnavailable(
                "host refused access to the document".to_string(),
            ));
        }
        let document = HostDocument::new(parse_document(html), viewport);
        debug!(
            "created {}x{} document with {} nodes and {} sheets",
            viewport.width,
            viewport.height,
            document.tree.len(),
            document.sheets.len()
        );
        Ok(document)
    }

    fn force_layout(&self, document: &mut HostDocument) -> f32 {
        document.layout_passes += 1;
        if document.layout_passes >= self.load_delay {
            self.load_pending_sheets(document);
        }
        estimate_height(document)
    }

    fn destroy(&self, document: &mut HostDocument) {
        document.tree = DomTree::new();
        document.sheets.clear();
    }
}

#[allow(clippy::cast_precision_loss)]
fn estimate_height(document: &HostDocument) -> f32 {
    let tree = &document.tree;
    let Some(body) = tree.body() else {
        return 0.0;
    };
    let chars_per_line =
        usize::try_from((document.viewport.width / GLYPH_WIDTH).max(1)).unwrap_or(usize::MAX);
    let lines: usize = tree
        .descendants(body)
        .chain([body])
        .filter(|&id| is_block_element(tree, id))
        .map(|id| 1 + direct_text_len(tree, id) / chars_per_line)
        .sum();
    lines as f32 * LINE_HEIGHT
}

fn direct_text_len(tree: &DomTree, id: NodeId) -> usize {
    tree.children(id)
        .iter()
        .filter_map(|&child| tree.as_text(child))
        .map(|text| text.chars().count())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_path() {
        assert_eq!(local_path("css/a.css"), Some(Path::new("css/a.css")));
        assert_eq!(local_path("a.css?v=2#x"), Some(Path::new("a.css")));
        assert_eq!(local_path("file:///tmp/a.css"), Some(Path::new("/tmp/a.css")));
        assert_eq!(local_path("https://cdn.example/a.css"), None);
        assert_eq!(local_path("//cdn.example/a.css"), None);
        assert_eq!(local_path("data:text/css,p{}"), None);
        assert_eq!(local_path("C:/styles/a.css"), Some(Path::new("C:/styles/a.css")));
    }

    #[test]
    fn test_height_grows_with_content() {
        let host = HeadlessHost::new();
        let mut short = host.create("<p>a</p>", Viewport::default()).unwrap();
        let mut long = host
            .create("<p>a</p><p>b</p><div>c</div>", Viewport::default())
            .unwrap();
        assert!(host.force_layout(&mut long) > host.force_layout(&mut short));
    }
}
