//! Integration tests for rule indexing, cascade inlining and body-style extraction.

use vellum_css::{
    CascadeStats, RuleSet, SheetOrigin, SheetReadError, SheetState, StyleSheet, StylesheetSource,
    collect_stylesheet_sources, extract_body_style, inline_rule_set, is_page_selector,
    parse_stylesheet,
};
use vellum_dom::{DomTree, NodeId};
use vellum_html::parse_document;

/// Index the given CSS texts as `<style>` sheets, in order.
fn rules(sheets: &[&str]) -> RuleSet {
    let sheets: Vec<StyleSheet> = sheets
        .iter()
        .map(|css| StyleSheet::inline(NodeId::ROOT, parse_stylesheet(css)))
        .collect();
    RuleSet::from_sheets(&sheets)
}

fn style_of(tree: &DomTree, id: &str) -> Option<String> {
    tree.descendants(NodeId::ROOT)
        .filter_map(|n| tree.as_element(n))
        .find(|e| e.id().is_some_and(|own| own == id))
        .and_then(|e| e.style().map(str::to_string))
}

fn inline(html: &str, css: &[&str]) -> (DomTree, CascadeStats) {
    let mut tree = parse_document(html);
    let stats = inline_rule_set(&mut tree, &rules(css));
    (tree, stats)
}

#[test]
fn test_rule_order_across_sheets() {
    let set = rules(&[".a { color: red } .b { margin: 0 }", "p { padding: 1px }"]);
    let selectors: Vec<&str> = set.iter().map(|r| r.selector.as_str()).collect();
    assert_eq!(selectors, [".a", ".b", "p"]);
    let orders: Vec<usize> = set.iter().map(|r| r.source_order).collect();
    assert_eq!(orders, [0, 1, 2]);
}

#[test]
fn test_at_rules_and_empty_rules_are_not_indexed() {
    let set = rules(&[
        "@font-face { font-family: X; src: url(x.woff) } @media (min-width: 1px) { p { color: red } } \
         @keyframes spin { from { opacity: 0 } } p {} div { color: blue }",
    ]);
    assert_eq!(set.len(), 1);
    assert_eq!(set.rules[0].selector, "div");
}

#[test]
fn test_unreadable_sheets_contribute_nothing() {
    let sheets = vec![
        StyleSheet {
            origin: SheetOrigin::Link {
                node: NodeId(1),
                href: "https://cdn.example/x.css".to_string(),
            },
            state: SheetState::Opaque,
        },
        StyleSheet {
            origin: SheetOrigin::Link {
                node: NodeId(2),
                href: "late.css".to_string(),
            },
            state: SheetState::Pending,
        },
        StyleSheet::inline(NodeId(3), parse_stylesheet("p { color: red }")),
    ];
    assert!(matches!(sheets[0].rules(), Err(SheetReadError::Opaque { .. })));
    assert!(matches!(sheets[1].rules(), Err(SheetReadError::Pending { .. })));
    assert!(!sheets[0].has_readable_rule());
    assert!(sheets[2].has_readable_rule());
    assert_eq!(RuleSet::from_sheets(&sheets).len(), 1);
}

#[test]
fn test_class_rule_is_inlined() {
    let (tree, stats) = inline(
        r#"<div id="d" class="red">Hello</div>"#,
        &[".red { color: red; font-weight: bold }"],
    );
    assert_eq!(style_of(&tree, "d").as_deref(), Some("color: red; font-weight: bold;"));
    assert_eq!(stats.rules_matched, 1);
    assert_eq!(stats.elements_styled, 1);
    assert_eq!(stats.properties_written, 2);
}

#[test]
fn test_only_matched_element_receives_properties() {
    let (tree, _) = inline(
        r#"<div id="d" class="red">Hello <i id="i">World</i></div>"#,
        &[".red { color: red }"],
    );
    assert_eq!(style_of(&tree, "i"), None);
}

#[test]
fn test_first_writer_wins() {
    let (tree, _) = inline(
        r#"<p id="p" class="a b">x</p>"#,
        &[".a { color: red }", ".b { color: blue; margin: 0 }"],
    );
    assert_eq!(style_of(&tree, "p").as_deref(), Some("color: red; margin: 0;"));
}

#[test]
fn test_existing_inline_style_is_kept() {
    let (tree, _) = inline(
        r#"<p id="p" class="a" style="color: green">x</p>"#,
        &[".a { color: red; padding: 2px }"],
    );
    assert_eq!(style_of(&tree, "p").as_deref(), Some("color: green; padding: 2px;"));
}

#[test]
fn test_important_overrides_normal_but_not_important() {
    let (tree, _) = inline(
        r#"<p id="p" class="a" style="color: green; margin: 1px !important">x</p>"#,
        &[".a { color: red !important; margin: 9px !important }"],
    );
    assert_eq!(
        style_of(&tree, "p").as_deref(),
        Some("color: red !important; margin: 1px !important;")
    );
}

#[test]
fn test_specificity_is_ignored() {
    let (tree, _) = inline(
        r#"<p id="p" class="a">x</p>"#,
        &["p { color: red }", "#p.a { color: blue }"],
    );
    assert_eq!(style_of(&tree, "p").as_deref(), Some("color: red;"));
}

#[test]
fn test_invalid_selector_is_skipped() {
    let (tree, stats) = inline(
        r#"<p id="p" class="a">x</p>"#,
        &[".a:unknown-state { color: red } .a { color: blue }"],
    );
    assert_eq!(stats.selectors_skipped, 1);
    assert_eq!(style_of(&tree, "p").as_deref(), Some("color: blue;"));
}

#[test]
fn test_body_is_not_inlined() {
    let (tree, stats) = inline(
        r#"<body id="b"><p id="p">x</p></body>"#,
        &["body { background: #eee } * { margin: 0 }"],
    );
    assert_eq!(style_of(&tree, "b"), None);
    assert_eq!(style_of(&tree, "p").as_deref(), Some("margin: 0;"));
    assert_eq!(stats.rules_matched, 1);
}

#[test]
fn test_extract_body_style() {
    let mut tree = parse_document(r#"<body style="color: #111"><p class="a">x</p></body>"#);
    let set = rules(&[
        "BODY { color: red; padding: 8px } html { font-family: serif } .a { margin: 0 } body, p { border: 0 }",
    ]);
    let _ = inline_rule_set(&mut tree, &set);
    let style = extract_body_style(&mut tree, &set);
    assert_eq!(style, "color: #111; padding: 8px; font-family: serif;");
}

#[test]
fn test_extract_body_style_empty_when_nothing_matches() {
    let mut tree = parse_document("<p>x</p>");
    assert_eq!(extract_body_style(&mut tree, &rules(&["p { color: red }"])), "");
}

#[test]
fn test_page_selector_detection() {
    assert!(is_page_selector("body"));
    assert!(is_page_selector(" Body "));
    assert!(is_page_selector("html, :root"));
    assert!(!is_page_selector("body p"));
    assert!(!is_page_selector("body, p"));
}

#[test]
fn test_collect_stylesheet_sources_in_document_order() {
    let tree = parse_document(
        r#"<head><link rel="Alternate STYLESHEET" href=" a.css "><style>p{}</style>
           <link rel="icon" href="i.png"></head><body><style>b{}</style></body>"#,
    );
    let sources = collect_stylesheet_sources(&tree);
    assert_eq!(sources.len(), 3);
    assert!(matches!(&sources[0], StylesheetSource::External { href, .. } if href == "a.css"));
    assert!(matches!(&sources[1], StylesheetSource::Inline { css, .. } if css == "p{}"));
    assert!(matches!(&sources[2], StylesheetSource::Inline { css, .. } if css == "b{}"));
}
