//! [§ 13.3 Serializing HTML fragments](https://html.spec.whatwg.org/multipage/parsing.html#serialising-html-fragments)
//!
//! Produces markup from a [`DomTree`]. Attribute order follows the element's
//! attribute list, so output is deterministic.

use vellum_dom::{DomTree, NodeId, NodeType};

/// [§ 13.1.2 Void elements](https://html.spec.whatwg.org/multipage/syntax.html#void-elements)
///
/// "If current node is an area, base, basefont, bgsound, br, col, embed, frame,
/// hr, img, input, keygen, link, meta, param, source, track or wbr element,
/// then continue on to the next child node at this point."
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "basefont", "bgsound", "br", "col", "embed", "frame", "hr", "img", "input",
    "keygen", "link", "meta", "param", "source", "track", "wbr",
];

/// "If the parent of current node is a style, script, xmp, iframe, noembed,
/// noframes, or plaintext element ... then append the value of current node's
/// data literally."
const RAW_TEXT_PARENTS: &[&str] = &[
    "style", "script", "xmp", "iframe", "noembed", "noframes", "plaintext",
];

/// "Escaping a string ... consists of running the following steps:"
///
/// STEP 1: "Replace any occurrence of the "&" character by the string "&amp;"."
/// STEP 2: "Replace any occurrences of the U+00A0 NO-BREAK SPACE character by
///          the string "&nbsp;"."
/// STEP 3: "If the algorithm was invoked in the attribute mode, then replace any
///          occurrences of the """ character by the string "&quot;"."
/// STEP 4: "If the algorithm was not invoked in the attribute mode, then replace
///          any occurrences of the "<" character by the string "&lt;", and any
///          occurrences of the ">" character by the string "&gt;"."
fn escape(text: &str, attribute_mode: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\u{00A0}' => out.push_str("&nbsp;"),
            '"' if attribute_mode => out.push_str("&quot;"),
            '<' if !attribute_mode => out.push_str("&lt;"),
            '>' if !attribute_mode => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
}

/// One step of the serialization walk.
enum Step {
    /// Emit a node, queueing its children.
    Open(NodeId),
    /// Emit the end tag of an element whose children are done.
    Close(NodeId),
}

/// Serialize with an explicit work stack, so nesting depth is bounded only
/// by memory.
fn serialize_steps(tree: &DomTree, mut stack: Vec<Step>, out: &mut String) {
    while let Some(step) = stack.pop() {
        let id = match step {
            Step::Close(id) => {
                if let Some(data) = tree.as_element(id) {
                    out.push_str("</");
                    out.push_str(&data.tag_name);
                    out.push('>');
                }
                continue;
            }
            Step::Open(id) => id,
        };
        let Some(node) = tree.get(id) else {
            continue;
        };
        match &node.node_type {
            NodeType::Document => push_children(tree, id, &mut stack),
            NodeType::Doctype(name) => {
                out.push_str("<!DOCTYPE ");
                out.push_str(name);
                out.push('>');
            }
            NodeType::Element(data) => {
                out.push('<');
                out.push_str(&data.tag_name);
                for (name, value) in data.attrs.iter() {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    escape(value, true, out);
                    out.push('"');
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&data.tag_name.as_str()) {
                    continue;
                }
                stack.push(Step::Close(id));
                push_children(tree, id, &mut stack);
            }
            NodeType::Text(text) => {
                let raw_parent = node
                    .parent
                    .and_then(|parent| tree.as_element(parent))
                    .is_some_and(|parent| RAW_TEXT_PARENTS.contains(&parent.tag_name.as_str()));
                if raw_parent {
                    out.push_str(text);
                } else {
                    escape(text, false, out);
                }
            }
            NodeType::Comment(data) => {
                out.push_str("<!--");
                out.push_str(data);
                out.push_str("-->");
            }
        }
    }
}

/// Queue the children of `id` so the first child is popped first.
fn push_children(tree: &DomTree, id: NodeId, stack: &mut Vec<Step>) {
    stack.extend(tree.children(id).iter().rev().map(|&child| Step::Open(child)));
}

/// The HTML fragment serialization of the children of `id` (`innerHTML`).
#[must_use]
pub fn serialize_children(tree: &DomTree, id: NodeId) -> String {
    let mut out = String::new();
    let mut stack = Vec::new();
    push_children(tree, id, &mut stack);
    serialize_steps(tree, stack, &mut out);
    out
}

/// The serialization of `id` itself (`outerHTML`).
#[must_use]
pub fn serialize_node(tree: &DomTree, id: NodeId) -> String {
    let mut out = String::new();
    serialize_steps(tree, vec![Step::Open(id)], &mut out);
    out
}

/// Serialize a whole document, DOCTYPE included.
#[must_use]
pub fn serialize_document(tree: &DomTree) -> String {
    serialize_children(tree, NodeId::ROOT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_text_and_attribute_modes() {
        let mut text = String::new();
        escape("a < b & \"c\"", false, &mut text);
        assert_eq!(text, "a &lt; b &amp; \"c\"");

        let mut attr = String::new();
        escape("say \"hi\" <now>", true, &mut attr);
        assert_eq!(attr, "say &quot;hi&quot; <now>");
    }
}
