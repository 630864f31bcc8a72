//! Style sheets attached to a document and the ordered rule index built from them.
//!
//! [CSSOM § 6.1 CSS Style Sheets](https://www.w3.org/TR/cssom-1/#css-style-sheets)

use log::{debug, trace};
use thiserror::Error;
use vellum_common::warning::warn_once;
use vellum_dom::{DomTree, ElementData, NodeId};

use crate::declarations::DeclarationBlock;
use crate::parser::Stylesheet;

/// Where a sheet came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetOrigin {
    /// [§ 4.2.6 The style element](https://html.spec.whatwg.org/multipage/semantics.html#the-style-element)
    StyleElement {
        /// The `<style>` node.
        node: NodeId,
    },
    /// [§ 4.2.4 The link element](https://html.spec.whatwg.org/multipage/semantics.html#the-link-element)
    Link {
        /// The `<link>` node.
        node: NodeId,
        /// Its `href`, as written.
        href: String,
    },
}

/// Whether a sheet's rules can be read yet.
#[derive(Debug, Clone, PartialEq)]
pub enum SheetState {
    /// Still loading.
    Pending,
    /// Parsed and readable.
    Loaded(Stylesheet),
    /// [CSSOM § 6.1.1](https://www.w3.org/TR/cssom-1/#dom-cssstylesheet-cssrules)
    /// Accessing `cssRules` would throw a `SecurityError` (cross-origin or failed load).
    Opaque,
}

/// Why a sheet's rules could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SheetReadError {
    /// The sheet is cross-origin or failed to load.
    #[error("rules of {origin} are not readable")]
    Opaque {
        /// Human-readable origin.
        origin: String,
    },
    /// The sheet has not finished loading.
    #[error("{origin} has not finished loading")]
    Pending {
        /// Human-readable origin.
        origin: String,
    },
}

/// A style sheet in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleSheet {
    /// Owner node and location.
    pub origin: SheetOrigin,
    /// Load state.
    pub state: SheetState,
}

impl StyleSheet {
    /// A `<style>` sheet, readable immediately.
    #[must_use]
    pub const fn inline(node: NodeId, stylesheet: Stylesheet) -> Self {
        Self {
            origin: SheetOrigin::StyleElement { node },
            state: SheetState::Loaded(stylesheet),
        }
    }

    /// The parsed rules.
    ///
    /// # Errors
    ///
    /// [`SheetReadError`] if the sheet is pending or opaque.
    pub fn rules(&self) -> Result<&Stylesheet, SheetReadError> {
        match &self.state {
            SheetState::Loaded(sheet) => Ok(sheet),
            SheetState::Pending => Err(SheetReadError::Pending {
                origin: self.describe(),
            }),
            SheetState::Opaque => Err(SheetReadError::Opaque {
                origin: self.describe(),
            }),
        }
    }

    /// Has at least one readable style rule.
    #[must_use]
    pub fn has_readable_rule(&self) -> bool {
        self.rules().is_ok_and(|sheet| !sheet.rules.is_empty())
    }

    fn describe(&self) -> String {
        match &self.origin {
            SheetOrigin::StyleElement { node } => format!("<style> sheet (node {})", node.0),
            SheetOrigin::Link { href, .. } => format!("linked sheet `{href}`"),
        }
    }
}

/// One indexed style rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleRule {
    /// Selector list text as written, whitespace collapsed.
    pub selector: String,
    /// Declarations in order, with importance.
    pub declarations: DeclarationBlock,
    /// Position in the whole rule set.
    pub source_order: usize,
}

/// Style rules ordered by sheet order, then rule order within each sheet.
///
/// This order, together with `!important`, is the only tie-breaker the
/// inliner uses. There is no specificity.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RuleSet {
    /// Rules in cascade order.
    pub rules: Vec<StyleRule>,
}

impl RuleSet {
    /// Index every readable sheet.
    ///
    /// At-rules (`@media`, `@font-face`, `@keyframes`, ...) and rules with an
    /// empty declaration block are skipped. Unreadable sheets contribute no
    /// rules and are reported once.
    #[must_use]
    pub fn from_sheets(sheets: &[StyleSheet]) -> Self {
        let mut rules = Vec::new();
        for sheet in sheets {
            let parsed = match sheet.rules() {
                Ok(parsed) => parsed,
                Err(err) => {
                    warn_once("css-rules", &err.to_string());
                    continue;
                }
            };
            for qualified in parsed.qualified_rules() {
                let declarations = DeclarationBlock::from_declarations(&qualified.declarations);
                if declarations.is_empty() {
                    continue;
                }
                let selector = qualified.selector_text();
                trace!("indexed rule #{} `{selector}`", rules.len());
                rules.push(StyleRule {
                    selector,
                    declarations,
                    source_order: rules.len(),
                });
            }
        }
        debug!("indexed {} style rules from {} sheets", rules.len(), sheets.len());
        Self { rules }
    }

    /// Number of rules.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.rules.len()
    }

    /// No rules.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterate in cascade order.
    pub fn iter(&self) -> std::slice::Iter<'_, StyleRule> {
        self.rules.iter()
    }
}

/// A `<style>` or stylesheet `<link>` element found in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StylesheetSource {
    /// `<style>` with its text.
    Inline {
        /// The element.
        node: NodeId,
        /// Concatenated text children.
        css: String,
    },
    /// `<link rel="stylesheet" href>`.
    External {
        /// The element.
        node: NodeId,
        /// Trimmed `href`.
        href: String,
    },
}

/// [§ 6.1 Cascade Sorting Order](https://www.w3.org/TR/css-cascade-4/#cascade-sort)
/// "Declarations from style sheets independently linked by the originating
/// document are treated as if they were concatenated in linking order."
///
/// Stylesheet-bearing elements in document order.
#[must_use]
pub fn collect_stylesheet_sources(tree: &DomTree) -> Vec<StylesheetSource> {
    tree.descendants(tree.root())
        .filter_map(|id| {
            let element = tree.as_element(id)?;
            if element.is("style") {
                let css = tree
                    .children(id)
                    .iter()
                    .filter_map(|&c| tree.as_text(c))
                    .collect();
                Some(StylesheetSource::Inline { node: id, css })
            } else if element.is("link") && is_stylesheet_link(element) {
                // "The href attribute gives the address (a valid non-empty URL
                // potentially surrounded by spaces) of the linked resource."
                let href = element.attrs.get("href")?.trim();
                (!href.is_empty()).then(|| StylesheetSource::External {
                    node: id,
                    href: href.to_string(),
                })
            } else {
                None
            }
        })
        .collect()
}

/// [§ 4.2.4](https://html.spec.whatwg.org/multipage/semantics.html#the-link-element)
/// "If the rel attribute's value contains the token stylesheet ..."
/// Token comparison is ASCII case-insensitive.
#[must_use]
pub fn is_stylesheet_link(element: &ElementData) -> bool {
    element.attrs.get("rel").is_some_and(|rel| {
        rel.split_ascii_whitespace()
            .any(|token| token.eq_ignore_ascii_case("stylesheet"))
    })
}
