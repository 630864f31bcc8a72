//! Content-model normalization.
//!
//! After this pass every container reached from the root holds either only
//! block children or only inline children (ignoring inert nodes). Inline runs
//! that sit next to blocks are moved into synthesized paragraphs; nothing is
//! dropped and sibling order is kept.
//!
//! An inline element with a block-level element somewhere inside it counts
//! as block-level itself ([CSS 2 § 9.2.1.1](https://www.w3.org/TR/CSS2/visuren.html#anonymous-block-level),
//! "When an inline box contains an in-flow block-level box, the inline box
//! ... [is] broken around the block-level box"). Elements classified inline
//! therefore never contain blocks.
//!
//! For each container:
//!
//! 1. No inline children: recurse into the block children.
//! 2. Only inline children: if the container is a wrapper (`div`, `body`, or
//!    the root itself), move them all into one paragraph. Other containers
//!    are left as they are.
//! 3. Both: every run of non-block children between blocks becomes one
//!    paragraph, then recurse into the original block children.
//!
//! Synthesized paragraphs are never split again, so the pass is idempotent.

use std::collections::HashSet;

use log::debug;
use vellum_dom::{AttributesMap, DomTree, NodeId, NodeType};

/// [§ 3.2.5.2 Kinds of content](https://html.spec.whatwg.org/multipage/dom.html#kinds-of-content)
/// reduced to what the export format cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentClass {
    /// A block-level element, or any element holding one.
    Block,
    /// Any other element, or text with non-whitespace content.
    Inline,
    /// Whitespace-only text, comments and doctypes. Kept, never classified.
    Inert,
}

/// Elements that count as block-level.
pub const BLOCK_TAGS: &[&str] = &[
    "div", "p", "h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol", "blockquote", "table", "hr",
    "pre", "body",
];

/// Containers whose inline-only content gets a paragraph of its own.
const WRAPPER_TAGS: &[&str] = &["div", "body"];

/// Classify one node.
///
/// Walks the subtree of an inline-tagged element to look for blocks; use
/// [`normalize`] for whole trees.
#[must_use]
pub fn classify(tree: &DomTree, id: NodeId) -> ContentClass {
    if is_inline_tagged(tree, id) && tree.descendants(id).any(|d| is_block_element(tree, d)) {
        return ContentClass::Block;
    }
    classify_by_tag(tree, id)
}

/// Does `id` carry one of [`BLOCK_TAGS`]?
#[must_use]
pub fn is_block_element(tree: &DomTree, id: NodeId) -> bool {
    tree.as_element(id)
        .is_some_and(|element| BLOCK_TAGS.iter().any(|tag| element.is(tag)))
}

fn is_inline_tagged(tree: &DomTree, id: NodeId) -> bool {
    tree.as_element(id).is_some() && !is_block_element(tree, id)
}

fn classify_by_tag(tree: &DomTree, id: NodeId) -> ContentClass {
    match tree.get(id).map(|node| &node.node_type) {
        Some(NodeType::Element(_)) if is_block_element(tree, id) => ContentClass::Block,
        Some(NodeType::Element(_)) => ContentClass::Inline,
        // [§ 3.2.5.2](https://html.spec.whatwg.org/multipage/dom.html#inter-element-whitespace)
        // "Inter-element whitespace ... is ignored when establishing whether an
        // element's contents match the element's content model or not"
        Some(NodeType::Text(text)) if !is_inter_element_whitespace(text) => ContentClass::Inline,
        _ => ContentClass::Inert,
    }
}

/// Elements under the root with a block-level element somewhere inside.
///
/// Built once per pass. Wrapping only moves nodes that hold no blocks into a
/// new paragraph, so the set stays accurate while the pass runs.
struct BlockHolders(HashSet<NodeId>);

impl BlockHolders {
    fn scan(tree: &DomTree, root: NodeId) -> Self {
        let mut holders = HashSet::new();
        for id in tree.descendants(root) {
            if !is_block_element(tree, id) {
                continue;
            }
            for ancestor in tree.ancestors(id) {
                if ancestor == root || !holders.insert(ancestor) {
                    break;
                }
            }
        }
        Self(holders)
    }

    fn classify(&self, tree: &DomTree, id: NodeId) -> ContentClass {
        if self.0.contains(&id) && is_inline_tagged(tree, id) {
            ContentClass::Block
        } else {
            classify_by_tag(tree, id)
        }
    }
}

/// "ASCII whitespace" only: a non-breaking space is content.
fn is_inter_element_whitespace(text: &str) -> bool {
    text.bytes().all(|b| b.is_ascii_whitespace())
}

/// Normalize the subtree under `root`, returning the number of paragraphs made.
///
/// New paragraphs get `paragraph_style` as their `style` attribute (none when
/// empty).
pub fn normalize(tree: &mut DomTree, root: NodeId, paragraph_style: &str) -> usize {
    let holders = BlockHolders::scan(tree, root);
    let mut made = 0;
    let mut pending = vec![root];
    while let Some(container) = pending.pop() {
        let (count, blocks) = normalize_container(tree, &holders, container, root, paragraph_style);
        made += count;
        pending.extend(blocks.into_iter().rev());
    }
    debug!("normalization synthesized {made} paragraphs");
    made
}

/// Restructure one container. Returns the paragraphs made and the block
/// children to visit next.
fn normalize_container(
    tree: &mut DomTree,
    holders: &BlockHolders,
    container: NodeId,
    root: NodeId,
    paragraph_style: &str,
) -> (usize, Vec<NodeId>) {
    let children: Vec<(NodeId, ContentClass)> = tree
        .children(container)
        .iter()
        .map(|&child| (child, holders.classify(tree, child)))
        .collect();
    let has_block = children.iter().any(|(_, c)| *c == ContentClass::Block);
    let has_inline = children.iter().any(|(_, c)| *c == ContentClass::Inline);

    match (has_block, has_inline) {
        // Case 1
        (_, false) => {
            let blocks = children
                .into_iter()
                .filter(|(_, c)| *c == ContentClass::Block)
                .map(|(id, _)| id)
                .collect();
            (0, blocks)
        }
        // Case 2
        (false, true) => {
            if !is_wrapper(tree, container, root) {
                return (0, Vec::new());
            }
            let paragraph = make_paragraph(tree, paragraph_style);
            tree.move_children(container, paragraph);
            tree.append_child(container, paragraph);
            (1, Vec::new())
        }
        // Case 3
        (true, true) => {
            let mut made = 0;
            let mut blocks = Vec::new();
            let mut run: Vec<NodeId> = Vec::new();
            for (child, class) in children {
                if class != ContentClass::Block {
                    run.push(child);
                    continue;
                }
                if !run.is_empty() {
                    wrap_run(tree, container, &run, Some(child), paragraph_style);
                    made += 1;
                    run.clear();
                }
                blocks.push(child);
            }
            if !run.is_empty() {
                wrap_run(tree, container, &run, None, paragraph_style);
                made += 1;
            }
            (made, blocks)
        }
    }
}

fn is_wrapper(tree: &DomTree, container: NodeId, root: NodeId) -> bool {
    container == root
        || tree
            .as_element(container)
            .is_some_and(|e| WRAPPER_TAGS.iter().any(|tag| e.is(tag)))
}

fn make_paragraph(tree: &mut DomTree, style: &str) -> NodeId {
    let mut attrs = AttributesMap::new();
    if !style.is_empty() {
        let _ = attrs.insert("style".to_string(), style.to_string());
    }
    tree.create_element("p", attrs)
}

/// Move `run` into a new paragraph placed before `before`, or at the end.
///
/// Whitespace-only runs are wrapped too rather than dropped.
fn wrap_run(
    tree: &mut DomTree,
    container: NodeId,
    run: &[NodeId],
    before: Option<NodeId>,
    style: &str,
) {
    let paragraph = make_paragraph(tree, style);
    match before {
        Some(reference) => tree.insert_before(container, paragraph, reference),
        None => tree.append_child(container, paragraph),
    }
    for &node in run {
        tree.append_child(paragraph, node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_html::{parse_document, serialize_children};

    const STYLE: &str = "margin:0;display:contents;";

    fn normalized(html: &str) -> (String, usize) {
        let mut tree = parse_document(html);
        let body = tree.body().unwrap();
        let made = normalize(&mut tree, body, STYLE);
        (serialize_children(&tree, body), made)
    }

    #[test]
    fn test_classify() {
        let tree = parse_document("<div> </div><span>x</span><!--c-->\u{a0}");
        let body = tree.body().unwrap();
        let classes: Vec<ContentClass> =
            tree.children(body).iter().map(|&id| classify(&tree, id)).collect();
        assert_eq!(
            classes,
            [
                ContentClass::Block,
                ContentClass::Inline,
                ContentClass::Inert,
                ContentClass::Inline
            ]
        );
        assert_eq!(classify(&tree, tree.children(tree.children(body)[0])[0]), ContentClass::Inert);
    }

    #[test]
    fn test_blocks_only_are_untouched() {
        let (html, made) = normalized("<div><p>a</p>\n<h2>b</h2></div>");
        assert_eq!(html, "<div><p>a</p>\n<h2>b</h2></div>");
        assert_eq!(made, 0);
    }

    #[test]
    fn test_non_wrapper_inline_container_is_left_alone() {
        let (html, made) = normalized("<h1>Title <em>here</em></h1><ul><li>x</li></ul>");
        assert_eq!(html, "<h1>Title <em>here</em></h1><ul><li>x</li></ul>");
        assert_eq!(made, 0);
    }

    #[test]
    fn test_trailing_run_is_wrapped() {
        let (html, made) = normalized("<div><p>a</p> <b>x</b></div>");
        assert_eq!(
            html,
            format!(r#"<div><p>a</p><p style="{STYLE}"> <b>x</b></p></div>"#)
        );
        assert_eq!(made, 1);
    }

    #[test]
    fn test_whitespace_only_run_is_kept_in_a_paragraph() {
        let (html, made) = normalized("<div>\n<p>a</p><b>x</b></div>");
        assert_eq!(
            html,
            format!("<div><p style=\"{STYLE}\">\n</p><p>a</p><p style=\"{STYLE}\"><b>x</b></p></div>")
        );
        assert_eq!(made, 2);
    }

    #[test]
    fn test_inline_holding_a_block_is_block_level() {
        let tree = parse_document("<span>a<div>b</div></span><em>c<b>d</b></em>");
        let body = tree.body().unwrap();
        let children = tree.children(body);
        assert_eq!(classify(&tree, children[0]), ContentClass::Block);
        assert_eq!(classify(&tree, children[1]), ContentClass::Inline);
    }

    #[test]
    fn test_block_inside_inline_is_split_out() {
        let (html, made) = normalized("<div><span>a<div>b</div></span></div>");
        assert_eq!(
            html,
            format!(
                r#"<div><span><p style="{STYLE}">a</p><div><p style="{STYLE}">b</p></div></span></div>"#
            )
        );
        assert_eq!(made, 2);
    }

    #[test]
    fn test_list_item_with_mixed_content_is_split() {
        let (html, made) = normalized("<ul><li>a<p>b</p></li></ul>");
        assert_eq!(
            html,
            format!(r#"<ul><li><p style="{STYLE}">a</p><p>b</p></li></ul>"#)
        );
        assert_eq!(made, 1);
    }

    #[test]
    fn test_link_around_a_block_is_split() {
        let (html, made) = normalized("<a href=x>link<div>block</div></a>");
        assert_eq!(
            html,
            format!(
                r#"<a href="x"><p style="{STYLE}">link</p><div><p style="{STYLE}">block</p></div></a>"#
            )
        );
        assert_eq!(made, 2);
    }

    #[test]
    fn test_empty_root() {
        let (html, made) = normalized("");
        assert_eq!(html, "");
        assert_eq!(made, 0);
    }
}
