//! Integration tests for the HTML tree builder.

use vellum_dom::{DomTree, NodeId, NodeType};
use vellum_html::{HTMLParser, Tokenizer, parse_document};

/// Helper to get element by tag name (first match, tree order)
fn find_element(tree: &DomTree, tag: &str) -> Option<NodeId> {
    tree.descendants(NodeId::ROOT)
        .find(|&id| tree.is_element_named(id, tag))
}

/// Tag names of the element children of `id`.
fn child_tags(tree: &DomTree, id: NodeId) -> Vec<String> {
    tree.children(id)
        .iter()
        .filter_map(|&child| tree.as_element(child))
        .map(|e| e.tag_name.clone())
        .collect()
}

#[test]
fn test_document_structure() {
    let tree = parse_document("<!DOCTYPE html><html><head></head><body></body></html>");

    let root_children = tree.children(NodeId::ROOT);
    assert_eq!(root_children.len(), 2);
    assert!(matches!(
        tree.get(root_children[0]).map(|n| &n.node_type),
        Some(NodeType::Doctype(name)) if name == "html"
    ));
    let Some(html) = tree.document_element() else {
        panic!("expected html element");
    };
    assert_eq!(child_tags(&tree, html), ["head", "body"]);
}

#[test]
fn test_implied_html_head_body() {
    let tree = parse_document("Hello World");
    assert!(tree.head().is_some());
    let Some(body) = tree.body() else {
        panic!("expected body");
    };
    assert_eq!(tree.text_content(body), "Hello World");
}

#[test]
fn test_empty_input_builds_skeleton() {
    let tree = parse_document("");
    assert!(tree.head().is_some());
    assert!(tree.body().is_some());
}

#[test]
fn test_head_keeps_style_and_link() {
    let tree = parse_document(
        "<head><style>p { color: red; }</style><link rel=\"stylesheet\" href=\"a.css\"></head><p>x</p>",
    );
    let Some(head) = tree.head() else {
        panic!("expected head");
    };
    assert_eq!(child_tags(&tree, head), ["style", "link"]);
    let Some(style) = find_element(&tree, "style") else {
        panic!("expected style");
    };
    assert_eq!(tree.text_content(style), "p { color: red; }");
    let Some(link) = find_element(&tree, "link") else {
        panic!("expected link");
    };
    assert!(tree.children(link).is_empty());
    assert_eq!(
        tree.as_element(link).and_then(|e| e.attrs.get("href")).map(String::as_str),
        Some("a.css")
    );
}

#[test]
fn test_style_in_body_stays_in_body() {
    let tree = parse_document("<body><style>p{}</style><p>x</p></body>");
    let Some(body) = tree.body() else {
        panic!("expected body");
    };
    assert_eq!(child_tags(&tree, body), ["style", "p"]);
}

#[test]
fn test_block_start_tag_closes_paragraph() {
    let tree = parse_document("<p>one<div>two</div>");
    let Some(body) = tree.body() else {
        panic!("expected body");
    };
    assert_eq!(child_tags(&tree, body), ["p", "div"]);
}

#[test]
fn test_list_items_close_each_other() {
    let tree = parse_document("<ul><li>a<li>b</ul>");
    let Some(ul) = find_element(&tree, "ul") else {
        panic!("expected ul");
    };
    assert_eq!(child_tags(&tree, ul), ["li", "li"]);
    assert_eq!(tree.text_content(ul), "ab");
}

#[test]
fn test_headings_do_not_nest() {
    let tree = parse_document("<h1>a<h2>b");
    let Some(body) = tree.body() else {
        panic!("expected body");
    };
    assert_eq!(child_tags(&tree, body), ["h1", "h2"]);
}

#[test]
fn test_newline_after_pre_is_dropped() {
    let tree = parse_document("<pre>\nfoo</pre>");
    let Some(pre) = find_element(&tree, "pre") else {
        panic!("expected pre");
    };
    assert_eq!(tree.text_content(pre), "foo");
}

#[test]
fn test_comments_are_preserved() {
    let tree = parse_document("<body><!--note--><p>x</p></body>");
    let Some(body) = tree.body() else {
        panic!("expected body");
    };
    let first = tree.children(body)[0];
    assert!(matches!(
        tree.get(first).map(|n| &n.node_type),
        Some(NodeType::Comment(data)) if data == "note"
    ));
}

#[test]
fn test_body_attributes_are_kept() {
    let tree = parse_document("<body class=\"main\" style=\"margin: 0\"><p>x</p></body>");
    let Some(body) = tree.body().and_then(|id| tree.as_element(id)) else {
        panic!("expected body");
    };
    assert_eq!(body.style(), Some("margin: 0"));
    assert!(body.classes().contains("main"));
}

#[test]
fn test_unmatched_end_tag_is_reported() {
    let mut tokenizer = Tokenizer::new("<body></span><p>x</p></body>".to_string());
    tokenizer.run();
    let (tree, issues) = HTMLParser::new(tokenizer.into_tokens()).run_with_issues();
    assert!(!issues.is_empty());
    assert!(find_element(&tree, "p").is_some());
}

#[test]
fn test_deep_nesting_parses_in_linear_time() {
    let depth = 100_000;
    let html = format!("{}x{}", "<div>".repeat(depth), "</div>".repeat(depth));
    let tree = parse_document(&html);

    let Some(body) = tree.body() else {
        panic!("expected body");
    };
    let deepest = tree.descendants(body).filter(|&id| tree.is_element_named(id, "div")).last();
    let Some(deepest) = deepest else {
        panic!("expected divs");
    };
    // The enclosing divs, then body, html and the document node.
    assert_eq!(tree.ancestors(deepest).count(), depth + 2);
    assert_eq!(tree.children(deepest).len(), 1);
}

#[test]
fn test_scope_checks_still_close_open_paragraphs() {
    let tree = parse_document("<div><p>a<div>b</div><p>c<ul><li>d<li>e</ul></div>");
    let Some(outer) = find_element(&tree, "div") else {
        panic!("expected div");
    };
    assert_eq!(child_tags(&tree, outer), ["p", "div", "p", "ul"]);
    let Some(list) = find_element(&tree, "ul") else {
        panic!("expected ul");
    };
    assert_eq!(child_tags(&tree, list), ["li", "li"]);
}
