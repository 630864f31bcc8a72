//! Integration tests for CSS selector parsing and matching.

use vellum_css::selector::{
    AttributeOperator, Combinator, PseudoClass, SelectorError, SimpleSelector, parse_selector,
    parse_selector_list, query_selector_all,
};
use vellum_dom::{DomTree, NodeId};
use vellum_html::parse_document;

/// The `id` attributes of every element matched by `selector`, in tree order.
fn matched_ids(tree: &DomTree, selector: &str) -> Vec<String> {
    query_selector_all(tree, NodeId::ROOT, selector)
        .unwrap()
        .into_iter()
        .filter_map(|id| tree.as_element(id).and_then(|e| e.id().cloned()))
        .collect()
}

fn list_tree() -> DomTree {
    parse_document(
        r#"<div id="outer" class="card wide">
             <ul id="list">
               <li id="a" class="item">A</li>
               <li id="b" class="item active" data-kind="primary-x">B</li>
               <li id="c" class="item">C</li>
             </ul>
             <p id="p1">x</p><span id="s1"></span><p id="p2"></p>
           </div>"#,
    )
}

#[test]
fn test_parse_compound_selector() {
    let selector = parse_selector("li.item#b").unwrap();
    assert!(selector.combinators.is_empty());
    assert_eq!(
        selector.subject.simple_selectors,
        vec![
            SimpleSelector::Type("li".to_string()),
            SimpleSelector::Class("item".to_string()),
            SimpleSelector::Id("b".to_string()),
        ]
    );
}

#[test]
fn test_type_selector_is_lowercased() {
    let selector = parse_selector("DIV").unwrap();
    assert_eq!(
        selector.subject.simple_selectors,
        vec![SimpleSelector::Type("div".to_string())]
    );
}

#[test]
fn test_parse_combinators() {
    let selector = parse_selector("h1 + p ~ span").unwrap();
    let kinds: Vec<Combinator> = selector.combinators.iter().map(|(c, _)| *c).collect();
    assert_eq!(kinds, [Combinator::SubsequentSibling, Combinator::NextSibling]);
}

#[test]
fn test_parse_attribute_selector() {
    let selector = parse_selector("[data-kind |= \"primary\" i]").unwrap();
    let SimpleSelector::Attribute(attr) = &selector.subject.simple_selectors[0] else {
        panic!("expected attribute selector");
    };
    assert_eq!(attr.name, "data-kind");
    assert_eq!(
        attr.matcher,
        Some((AttributeOperator::DashMatch, "primary".to_string()))
    );
    assert!(attr.case_insensitive);
}

#[test]
fn test_first_child_is_nth() {
    let selector = parse_selector("li:first-child").unwrap();
    assert!(matches!(
        selector.subject.simple_selectors[1],
        SimpleSelector::PseudoClass(PseudoClass::Nth { a: 0, b: 1, of_type: false, from_end: false })
    ));
}

#[test]
fn test_invalid_selectors() {
    for bad in ["", "> p", "p >", "a..b", "[href", ":nope", "p:nth-child(x)", "a, ", "#1a", "p)"] {
        assert!(
            matches!(parse_selector_list(bad), Err(SelectorError::Invalid { .. })),
            "`{bad}` should be invalid"
        );
    }
}

#[test]
fn test_invalid_item_invalidates_list() {
    assert!(parse_selector_list(".ok, :unknown-thing").is_err());
}

#[test]
fn test_query_class_and_descendant() {
    let tree = list_tree();
    assert_eq!(matched_ids(&tree, ".item"), ["a", "b", "c"]);
    assert_eq!(matched_ids(&tree, ".card li.active"), ["b"]);
    assert_eq!(matched_ids(&tree, "div > li"), Vec::<String>::new());
    assert_eq!(matched_ids(&tree, "div > ul > li:last-child"), ["c"]);
}

#[test]
fn test_query_list_is_union_in_tree_order() {
    let tree = list_tree();
    assert_eq!(matched_ids(&tree, "#p2, #list, #a"), ["list", "a", "p2"]);
}

#[test]
fn test_sibling_combinators_skip_text() {
    let tree = list_tree();
    assert_eq!(matched_ids(&tree, "#a + li"), ["b"]);
    assert_eq!(matched_ids(&tree, "#a ~ li"), ["b", "c"]);
    assert_eq!(matched_ids(&tree, "ul + p"), ["p1"]);
}

#[test]
fn test_descendant_backtracks_past_nearest_ancestor() {
    let tree = parse_document(
        r#"<section class="x"><div><div class="y"><b id="t"></b></div></div></section>"#,
    );
    // The nearest div is not a child of .x; the outer one is.
    assert_eq!(matched_ids(&tree, ".x > div b"), ["t"]);
}

#[test]
fn test_attribute_operators() {
    let tree = list_tree();
    assert_eq!(matched_ids(&tree, "[data-kind]"), ["b"]);
    assert_eq!(matched_ids(&tree, "[class~=active]"), ["b"]);
    assert_eq!(matched_ids(&tree, "[data-kind|=primary]"), ["b"]);
    assert_eq!(matched_ids(&tree, "[data-kind^=prim]"), ["b"]);
    assert_eq!(matched_ids(&tree, "[data-kind$=\"-x\"]"), ["b"]);
    assert_eq!(matched_ids(&tree, "[data-kind*=ARY i]"), ["b"]);
    assert_eq!(matched_ids(&tree, "[data-kind*=ARY]"), Vec::<String>::new());
    assert_eq!(matched_ids(&tree, "[id^='']"), Vec::<String>::new());
}

#[test]
fn test_structural_pseudo_classes() {
    let tree = list_tree();
    assert_eq!(matched_ids(&tree, "li:nth-child(odd)"), ["a", "c"]);
    assert_eq!(matched_ids(&tree, "li:nth-last-child(1)"), ["c"]);
    assert_eq!(matched_ids(&tree, "p:first-of-type"), ["p1"]);
    assert_eq!(matched_ids(&tree, "p:last-of-type"), ["p2"]);
    assert_eq!(matched_ids(&tree, "span:only-of-type"), ["s1"]);
    assert_eq!(matched_ids(&tree, "#outer :empty"), ["s1", "p2"]);
}

#[test]
fn test_extreme_nth_offsets_do_not_overflow() {
    let tree = list_tree();
    assert_eq!(matched_ids(&tree, "li:nth-child(-2147483648)"), Vec::<String>::new());
    assert_eq!(matched_ids(&tree, "li:nth-child(n-2147483648)"), ["a", "b", "c"]);
    assert_eq!(matched_ids(&tree, "li:nth-child(2n-2147483648)"), ["b"]);
    assert_eq!(
        matched_ids(&tree, "li:nth-last-child(-n+2147483647)"),
        ["a", "b", "c"]
    );
}

#[test]
fn test_not_and_is() {
    let tree = list_tree();
    assert_eq!(matched_ids(&tree, "li:not(.active)"), ["a", "c"]);
    assert_eq!(matched_ids(&tree, ":is(#a, #c)"), ["a", "c"]);
    assert_eq!(matched_ids(&tree, "li:where(.active)"), ["b"]);
}

#[test]
fn test_root_matches_html() {
    let tree = list_tree();
    let html = query_selector_all(&tree, NodeId::ROOT, ":root").unwrap();
    assert_eq!(html, vec![tree.document_element().unwrap()]);
}

#[test]
fn test_interactive_states_never_match() {
    let tree = list_tree();
    assert!(matched_ids(&tree, "li:hover, p::before, a:visited").is_empty());
}

#[test]
fn test_query_excludes_scope() {
    let tree = list_tree();
    let list = query_selector_all(&tree, NodeId::ROOT, "#list").unwrap()[0];
    let inside = query_selector_all(&tree, list, "ul, li").unwrap();
    assert_eq!(inside.len(), 3);
}
