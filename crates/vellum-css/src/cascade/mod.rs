//! Cascade inlining
//!
//! Copies the declarations of every indexed rule onto the inline `style` of
//! the elements its selector matches. This is a reduced cascade: rules apply in
//! source order, the first value written for a property stays, and only an
//! important declaration can replace a value that is not important. Selector
//! specificity plays no part, and nothing is inherited.
//!
//! Rules that target the page itself (`body`, `html`, `:root`) are not inlined
//! here. [`extract_body_style`] collects them for the export wrapper instead.

use std::collections::HashSet;

use log::{debug, trace};
use serde::Serialize;
use vellum_common::warning::warn_once;
use vellum_dom::{DomTree, NodeId};

use crate::inline_style::InlineStyle;
use crate::rule_set::{RuleSet, StyleRule};
use crate::selector::query_selector_all;

/// Counters from one inlining pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CascadeStats {
    /// Rules that matched at least one element.
    pub rules_matched: usize,
    /// Rules skipped because their selector did not parse.
    pub selectors_skipped: usize,
    /// Elements whose `style` attribute changed.
    pub elements_styled: usize,
    /// Individual property writes.
    pub properties_written: usize,
}

/// Inline every rule of `rule_set` into `tree`.
///
/// The `<html>` and `<body>` elements are never written; see [`extract_body_style`].
pub fn inline_rule_set(tree: &mut DomTree, rule_set: &RuleSet) -> CascadeStats {
    let mut stats = CascadeStats::default();
    let page_elements = [tree.document_element(), tree.body()];
    let mut styled: HashSet<NodeId> = HashSet::new();

    for rule in rule_set.iter() {
        let Some(matched) = resolve(tree, rule, &mut stats) else {
            continue;
        };
        let targets: Vec<NodeId> = matched
            .into_iter()
            .filter(|id| !page_elements.contains(&Some(*id)))
            .collect();
        if targets.is_empty() {
            continue;
        }
        stats.rules_matched += 1;

        for id in targets {
            let written = apply_rule(tree, id, rule);
            if written > 0 {
                stats.properties_written += written;
                let _ = styled.insert(id);
            }
        }
    }

    stats.elements_styled = styled.len();
    debug!(
        "inlined {} properties onto {} elements from {} rules ({} skipped)",
        stats.properties_written, stats.elements_styled, stats.rules_matched, stats.selectors_skipped
    );
    stats
}

/// Apply the page-level rules to `<body>` and return its resulting `style`
/// attribute, or an empty string when there is no body or nothing is set.
///
/// A rule counts as page-level when every item of its selector list is
/// `body`, `html` or `:root` (ASCII case-insensitive). Any `style` the body
/// already carried is kept and takes precedence by the usual write rule.
pub fn extract_body_style(tree: &mut DomTree, rule_set: &RuleSet) -> String {
    let Some(body) = tree.body() else {
        return String::new();
    };
    for rule in rule_set.iter().filter(|r| is_page_selector(&r.selector)) {
        let written = apply_rule(tree, body, rule);
        trace!("body rule `{}` wrote {written} properties", rule.selector);
    }
    tree.as_element(body)
        .and_then(|e| e.style())
        .unwrap_or_default()
        .to_string()
}

/// Is `selector` made only of `body`, `html` and `:root` items?
#[must_use]
pub fn is_page_selector(selector: &str) -> bool {
    selector.split(',').all(|item| {
        let item = item.trim();
        ["body", "html", ":root"]
            .iter()
            .any(|page| item.eq_ignore_ascii_case(page))
    })
}

fn resolve(tree: &DomTree, rule: &StyleRule, stats: &mut CascadeStats) -> Option<Vec<NodeId>> {
    match query_selector_all(tree, tree.root(), &rule.selector) {
        Ok(matched) => Some(matched),
        Err(err) => {
            // [§ 3.1](https://www.w3.org/TR/selectors-4/#invalid)
            // "An invalid selector represents, and therefore matches, nothing."
            warn_once("css-cascade", &err.to_string());
            stats.selectors_skipped += 1;
            None
        }
    }
}

/// Write one rule onto one element, returning the number of properties written.
fn apply_rule(tree: &mut DomTree, id: NodeId, rule: &StyleRule) -> usize {
    let Some(element) = tree.as_element_mut(id) else {
        return 0;
    };
    let mut style = InlineStyle::of_element(element);
    let written = style.apply_block(&rule.declarations);
    if written > 0 {
        style.write_to(element);
    }
    written
}
