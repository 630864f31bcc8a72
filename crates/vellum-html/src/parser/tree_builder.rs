use std::collections::HashMap;

use strum_macros::Display;

use vellum_common::warning::warn_once;
use vellum_dom::{AttributesMap, DomTree, NodeId, NodeType};

use crate::tokenizer::{Attribute, Token};

/// [§ 13.2.4.1 The insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-insertion-mode)
///
/// "The insertion mode is a state variable that controls the primary operation
/// of the tree construction stage."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum InsertionMode {
    /// [§ 13.2.6.4.1 The "initial" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode)
    Initial,
    /// [§ 13.2.6.4.2 The "before html" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-html-insertion-mode)
    BeforeHtml,
    /// [§ 13.2.6.4.3 The "before head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-head-insertion-mode)
    BeforeHead,
    /// [§ 13.2.6.4.4 The "in head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inhead)
    InHead,
    /// [§ 13.2.6.4.6 The "after head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-head-insertion-mode)
    AfterHead,
    /// [§ 13.2.6.4.7 The "in body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
    InBody,
    /// [§ 13.2.6.4.8 The "text" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incdata)
    Text,
    /// [§ 13.2.6.4.19 The "after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterbody)
    AfterBody,
    /// [§ 13.2.6.4.22 The "after after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-body-insertion-mode)
    AfterAfterBody,
}

/// [§ 13.2.2 Parse errors](https://html.spec.whatwg.org/multipage/parsing.html#parse-errors)
#[derive(Debug, Clone)]
pub struct ParseIssue {
    /// Description of the parse error.
    pub message: String,
    /// Index into the token stream where this error was encountered.
    pub token_index: usize,
}

/// Elements whose start tag closes an open `p` element and opens a block.
///
/// [§ 13.2.6.4.7](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody):
/// "A start tag whose tag name is one of: "address", "article", "aside", ..."
const CLOSES_P_CONTAINERS: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "center",
    "details",
    "dialog",
    "dir",
    "div",
    "dl",
    "fieldset",
    "figcaption",
    "figure",
    "footer",
    "header",
    "hgroup",
    "main",
    "menu",
    "nav",
    "ol",
    "p",
    "search",
    "section",
    "summary",
    "ul",
    "table",
];

const HEADINGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

/// [§ 13.1.2 Void elements](https://html.spec.whatwg.org/multipage/syntax.html#void-elements)
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr", "param", "keygen", "basefont", "bgsound",
];

/// [§ 13.2.4.3 special category](https://html.spec.whatwg.org/multipage/parsing.html#special)
const SPECIAL_ELEMENTS: &[&str] = &[
    "address",
    "applet",
    "area",
    "article",
    "aside",
    "base",
    "basefont",
    "bgsound",
    "blockquote",
    "body",
    "br",
    "button",
    "caption",
    "center",
    "col",
    "colgroup",
    "dd",
    "details",
    "dir",
    "div",
    "dl",
    "dt",
    "embed",
    "fieldset",
    "figcaption",
    "figure",
    "footer",
    "form",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "head",
    "header",
    "hgroup",
    "hr",
    "html",
    "iframe",
    "img",
    "input",
    "li",
    "link",
    "listing",
    "main",
    "marquee",
    "menu",
    "meta",
    "nav",
    "noembed",
    "noframes",
    "object",
    "ol",
    "p",
    "pre",
    "script",
    "search",
    "section",
    "select",
    "source",
    "style",
    "summary",
    "table",
    "tbody",
    "td",
    "template",
    "textarea",
    "tfoot",
    "th",
    "thead",
    "title",
    "tr",
    "track",
    "ul",
    "wbr",
    "xmp",
];

/// [§ 13.2.4.2 has an element in scope](https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-the-specific-scope)
const DEFAULT_SCOPE: &[&str] = &[
    "applet", "caption", "html", "table", "td", "th", "marquee", "object", "template",
];

/// [§ 13.2.6.3 Closing elements that have implied end tags](https://html.spec.whatwg.org/multipage/parsing.html#generate-implied-end-tags)
const IMPLIED_END_TAGS: &[&str] = &[
    "dd", "dt", "li", "optgroup", "option", "p", "rb", "rp", "rt", "rtc",
];

/// Element types that extend the default scope boundary set.
#[derive(Debug, Clone, Copy)]
enum Scope {
    Default,
    Button,
    ListItem,
}

/// [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)
///
/// The HTML parser builds a DOM tree from a stream of tokens.
pub struct HTMLParser {
    insertion_mode: InsertionMode,

    /// [§ 13.2.4.2 The original insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#original-insertion-mode)
    original_insertion_mode: Option<InsertionMode>,

    /// [§ 13.2.4.3 The stack of open elements](https://html.spec.whatwg.org/multipage/parsing.html#the-stack-of-open-elements)
    stack_of_open_elements: Vec<NodeId>,

    /// How many elements of each tag name are on the stack of open elements.
    /// Scope checks for a tag with no open element return without a scan.
    open_tag_counts: HashMap<String, usize>,

    /// [§ 13.2.4.4 The element pointers](https://html.spec.whatwg.org/multipage/parsing.html#the-element-pointers)
    head_element_pointer: Option<NodeId>,

    tree: DomTree,
    tokens: Vec<Token>,
    token_index: usize,
    stopped: bool,
    issues: Vec<ParseIssue>,

    /// Set after a `pre`, `listing` or `textarea` start tag: "If the next
    /// token is a U+000A LINE FEED (LF) character token, then ignore that
    /// token and move on to the next one."
    skip_next_newline: bool,
}

impl HTMLParser {
    /// Create a new parser from a token stream.
    #[must_use]
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            insertion_mode: InsertionMode::Initial,
            original_insertion_mode: None,
            stack_of_open_elements: Vec::new(),
            open_tag_counts: HashMap::new(),
            head_element_pointer: None,
            tree: DomTree::new(),
            tokens,
            token_index: 0,
            stopped: false,
            issues: Vec::new(),
            skip_next_newline: false,
        }
    }

    /// Run the parser and return the DOM tree.
    #[must_use]
    pub fn run(self) -> DomTree {
        self.run_with_issues().0
    }

    /// Run the parser and return both the `DomTree` and any parse issues.
    #[must_use]
    pub fn run_with_issues(mut self) -> (DomTree, Vec<ParseIssue>) {
        while !self.stopped && self.token_index < self.tokens.len() {
            let token = self.tokens[self.token_index].clone();
            if std::mem::take(&mut self.skip_next_newline)
                && matches!(token, Token::Character { data: '\n' })
            {
                self.token_index += 1;
                continue;
            }
            self.process_token(&token);
            self.token_index += 1;
        }
        // A token stream without an EOF token still yields a complete tree.
        if !self.stopped {
            self.process_token(&Token::EndOfFile);
        }
        (self.tree, self.issues)
    }

    /// Record a recoverable parse error.
    fn parse_error(&mut self, message: &str) {
        warn_once("html-parser", message);
        self.issues.push(ParseIssue {
            message: message.to_string(),
            token_index: self.token_index,
        });
    }

    /// [§ 13.2.6 Tree construction dispatcher](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction-dispatcher)
    fn process_token(&mut self, token: &Token) {
        match self.insertion_mode {
            InsertionMode::Initial => self.handle_initial_mode(token),
            InsertionMode::BeforeHtml => self.handle_before_html_mode(token),
            InsertionMode::BeforeHead => self.handle_before_head_mode(token),
            InsertionMode::InHead => self.handle_in_head_mode(token),
            InsertionMode::AfterHead => self.handle_after_head_mode(token),
            InsertionMode::InBody => self.handle_in_body_mode(token),
            InsertionMode::Text => self.handle_text_mode(token),
            InsertionMode::AfterBody => self.handle_after_body_mode(token),
            InsertionMode::AfterAfterBody => self.handle_after_after_body_mode(token),
        }
    }

    // =========================================================================
    // Node creation and insertion
    // =========================================================================

    /// "The current node is the bottommost node in this stack of open elements."
    fn current_node(&self) -> NodeId {
        self.stack_of_open_elements
            .last()
            .copied()
            .unwrap_or(NodeId::ROOT)
    }

    fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.tree.as_element(id).map(|data| data.tag_name.as_str())
    }

    fn current_node_is_one_of(&self, tags: &[&str]) -> bool {
        self.tag_name(self.current_node())
            .is_some_and(|tag| tags.contains(&tag))
    }

    fn attributes_to_map(attributes: &[Attribute]) -> AttributesMap {
        attributes
            .iter()
            .map(|attr| (attr.name.clone(), attr.value.clone()))
            .collect()
    }

    /// [§ 13.2.6.1 Insert a character](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-character)
    fn insert_character(&mut self, c: char) {
        let parent = self.current_node();
        // "If there is a Text node immediately before the adjusted insertion
        // location, then append data to that Text node's data."
        if let Some(last) = self.tree.last_child(parent)
            && let Some(node) = self.tree.get_mut(last)
            && let NodeType::Text(ref mut text) = node.node_type
        {
            text.push(c);
            return;
        }
        let text_id = self.tree.alloc(NodeType::Text(String::from(c)));
        self.tree.append_child(parent, text_id);
    }

    /// [§ 13.2.6.1 Insert a comment](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-comment)
    fn insert_comment(&mut self, data: &str, parent: NodeId) {
        let comment_id = self.tree.alloc(NodeType::Comment(data.to_string()));
        self.tree.append_child(parent, comment_id);
    }

    /// [§ 13.2.6.1 Insert an HTML element](https://html.spec.whatwg.org/multipage/parsing.html#insert-an-html-element)
    fn insert_html_element(&mut self, name: &str, attributes: &[Attribute]) -> NodeId {
        // STEP 1: "Create an element for the token"
        let element_id = self
            .tree
            .create_element(name, Self::attributes_to_map(attributes));
        // STEP 2: "Append the new element to the node at the adjusted insertion location."
        let parent = self.current_node();
        self.tree.append_child(parent, element_id);
        // STEP 3: "Push the element onto the stack of open elements."
        self.push_open(element_id);
        element_id
    }

    /// Insert an element for a void or otherwise immediately closed tag.
    fn insert_and_pop(&mut self, name: &str, attributes: &[Attribute]) {
        let _ = self.insert_html_element(name, attributes);
        let _ = self.pop_open();
    }

    /// "add the attribute and its corresponding value to that element" for
    /// each attribute not already present.
    fn merge_attributes(&mut self, target: Option<NodeId>, attributes: &[Attribute]) {
        let Some(element) = target.and_then(|id| self.tree.as_element_mut(id)) else {
            return;
        };
        for attr in attributes {
            if !element.attrs.contains_key(&attr.name) {
                let _ = element.attrs.insert(attr.name.clone(), attr.value.clone());
            }
        }
    }

    // =========================================================================
    // Stack of open elements
    // =========================================================================

    fn push_open(&mut self, id: NodeId) {
        if let Some(element) = self.tree.as_element(id) {
            *self
                .open_tag_counts
                .entry(element.tag_name.clone())
                .or_default() += 1;
        }
        self.stack_of_open_elements.push(id);
    }

    fn pop_open(&mut self) -> Option<NodeId> {
        let id = self.stack_of_open_elements.pop()?;
        self.forget_open(id);
        Some(id)
    }

    fn remove_open(&mut self, index: usize) {
        let id = self.stack_of_open_elements.remove(index);
        self.forget_open(id);
    }

    fn truncate_open(&mut self, len: usize) {
        while self.stack_of_open_elements.len() > len {
            let _ = self.pop_open();
        }
    }

    fn forget_open(&mut self, id: NodeId) {
        let Some(element) = self.tree.as_element(id) else {
            return;
        };
        if let Some(count) = self.open_tag_counts.get_mut(&element.tag_name) {
            *count = count.saturating_sub(1);
        }
    }

    /// Is any element named in `tags` on the stack of open elements?
    fn any_open(&self, tags: &[&str]) -> bool {
        tags.iter()
            .any(|tag| self.open_tag_counts.get(*tag).is_some_and(|&count| count > 0))
    }

    /// [§ 13.2.4.2 has an element in the specific scope](https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-the-specific-scope)
    fn has_element_in_scope(&self, tags: &[&str], scope: Scope) -> bool {
        if !self.any_open(tags) {
            return false;
        }
        for &id in self.stack_of_open_elements.iter().rev() {
            let Some(tag) = self.tag_name(id) else {
                continue;
            };
            // STEP 2: "If node is the target node, terminate in a match state."
            if tags.contains(&tag) {
                return true;
            }
            // STEP 3: "Otherwise, if node is one of the element types in list,
            // terminate in a failure state."
            let boundary = DEFAULT_SCOPE.contains(&tag)
                || match scope {
                    Scope::Default => false,
                    Scope::Button => tag == "button",
                    Scope::ListItem => matches!(tag, "ol" | "ul"),
                };
            if boundary {
                return false;
            }
        }
        false
    }

    /// Pop elements until one of `tags` has been popped.
    fn pop_until_one_of(&mut self, tags: &[&str]) {
        while let Some(id) = self.pop_open() {
            if self.tag_name(id).is_some_and(|tag| tags.contains(&tag)) {
                break;
            }
        }
    }

    /// [§ 13.2.6.3 generate implied end tags](https://html.spec.whatwg.org/multipage/parsing.html#generate-implied-end-tags)
    ///
    /// "while the current node is a dd element, a dt element, an li element,
    /// ... the UA must pop the current node off the stack of open elements."
    fn generate_implied_end_tags(&mut self, except: Option<&str>) {
        while let Some(tag) = self.tag_name(self.current_node()) {
            if !IMPLIED_END_TAGS.contains(&tag) || except == Some(tag) {
                break;
            }
            let _ = self.pop_open();
        }
    }

    /// [§ 13.2.6.4.7 close a p element](https://html.spec.whatwg.org/multipage/parsing.html#close-a-p-element)
    fn close_p_element(&mut self) {
        // STEP 1: "Generate implied end tags, except for p elements."
        self.generate_implied_end_tags(Some("p"));
        // STEP 2: "If the current node is not a p element, then this is a parse error."
        if !self.current_node_is_one_of(&["p"]) {
            self.parse_error("p element closed with other elements open");
        }
        // STEP 3: "Pop elements from the stack of open elements until a p
        // element has been popped from the stack."
        self.pop_until_one_of(&["p"]);
    }

    /// "If the stack of open elements has a p element in button scope, then
    /// close a p element."
    fn close_p_if_in_button_scope(&mut self) {
        if self.has_element_in_scope(&["p"], Scope::Button) {
            self.close_p_element();
        }
    }

    // =========================================================================
    // Insertion modes
    // =========================================================================

    /// [§ 13.2.6.4.1 The "initial" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode)
    fn handle_initial_mode(&mut self, token: &Token) {
        match token {
            // "A character token that is one of U+0009 CHARACTER TABULATION, ...
            // Ignore the token."
            t if t.is_whitespace_character() => {}
            Token::Comment { data } => self.insert_comment(data, NodeId::ROOT),
            // "A DOCTYPE token - ... Append a DocumentType node to the Document node"
            Token::Doctype { name } => {
                let doctype = self
                    .tree
                    .alloc(NodeType::Doctype(name.clone().unwrap_or_default()));
                self.tree.append_child(NodeId::ROOT, doctype);
                self.insertion_mode = InsertionMode::BeforeHtml;
            }
            _ => {
                self.insertion_mode = InsertionMode::BeforeHtml;
                self.process_token(token);
            }
        }
    }

    /// [§ 13.2.6.4.2 The "before html" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-html-insertion-mode)
    fn handle_before_html_mode(&mut self, token: &Token) {
        match token {
            Token::Doctype { .. } => self.parse_error("unexpected doctype"),
            Token::Comment { data } => self.insert_comment(data, NodeId::ROOT),
            t if t.is_whitespace_character() => {}
            Token::StartTag {
                name, attributes, ..
            } if name == "html" => {
                let _ = self.insert_html_element(name, attributes);
                self.insertion_mode = InsertionMode::BeforeHead;
            }
            Token::EndTag { name } if !matches!(name.as_str(), "head" | "body" | "html" | "br") => {
                self.parse_error("unexpected end tag before html");
            }
            _ => {
                // "Create an html element whose node document is the Document
                // object. Append it to the Document object."
                let _ = self.insert_html_element("html", &[]);
                self.insertion_mode = InsertionMode::BeforeHead;
                self.process_token(token);
            }
        }
    }

    /// [§ 13.2.6.4.3 The "before head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-head-insertion-mode)
    fn handle_before_head_mode(&mut self, token: &Token) {
        match token {
            t if t.is_whitespace_character() => {}
            Token::Comment { data } => self.insert_comment(data, self.current_node()),
            Token::Doctype { .. } => self.parse_error("unexpected doctype"),
            t if t.is_start_tag_named("html") => self.handle_in_body_mode(t),
            Token::StartTag {
                name, attributes, ..
            } if name == "head" => {
                self.head_element_pointer = Some(self.insert_html_element(name, attributes));
                self.insertion_mode = InsertionMode::InHead;
            }
            Token::EndTag { name } if !matches!(name.as_str(), "head" | "body" | "html" | "br") => {
                self.parse_error("unexpected end tag before head");
            }
            _ => {
                self.head_element_pointer = Some(self.insert_html_element("head", &[]));
                self.insertion_mode = InsertionMode::InHead;
                self.process_token(token);
            }
        }
    }

    /// [§ 13.2.6.4.4 The "in head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inhead)
    fn handle_in_head_mode(&mut self, token: &Token) {
        match token {
            Token::Character { data } if token.is_whitespace_character() => {
                self.insert_character(*data);
            }
            Token::Comment { data } => self.insert_comment(data, self.current_node()),
            Token::Doctype { .. } => self.parse_error("unexpected doctype"),
            t if t.is_start_tag_named("html") => self.handle_in_body_mode(t),
            Token::StartTag {
                name, attributes, ..
            } => match name.as_str() {
                "base" | "basefont" | "bgsound" | "link" | "meta" => {
                    self.insert_and_pop(name, attributes);
                }
                // [§ 13.2.6.2 generic RCDATA / raw text element parsing](https://html.spec.whatwg.org/multipage/parsing.html#generic-raw-text-element-parsing-algorithm)
                "title" | "style" | "noframes" | "script" => {
                    let _ = self.insert_html_element(name, attributes);
                    self.original_insertion_mode = Some(self.insertion_mode);
                    self.insertion_mode = InsertionMode::Text;
                }
                "head" => self.parse_error("nested head"),
                _ => self.leave_head_and_reprocess(token),
            },
            t if t.is_end_tag_named("head") => {
                let _ = self.pop_open();
                self.insertion_mode = InsertionMode::AfterHead;
            }
            Token::EndTag { name } if !matches!(name.as_str(), "body" | "html" | "br") => {
                self.parse_error("unexpected end tag in head");
            }
            _ => self.leave_head_and_reprocess(token),
        }
    }

    /// "Pop the current node (which will be the head element) off the stack
    /// of open elements. Switch the insertion mode to "after head". Reprocess
    /// the token."
    fn leave_head_and_reprocess(&mut self, token: &Token) {
        let _ = self.pop_open();
        self.insertion_mode = InsertionMode::AfterHead;
        self.process_token(token);
    }

    /// [§ 13.2.6.4.6 The "after head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-head-insertion-mode)
    fn handle_after_head_mode(&mut self, token: &Token) {
        match token {
            Token::Character { data } if token.is_whitespace_character() => {
                self.insert_character(*data);
            }
            Token::Comment { data } => self.insert_comment(data, self.current_node()),
            Token::Doctype { .. } => self.parse_error("unexpected doctype"),
            t if t.is_start_tag_named("html") => self.handle_in_body_mode(t),
            Token::StartTag {
                name, attributes, ..
            } if name == "body" => {
                let _ = self.insert_html_element(name, attributes);
                self.insertion_mode = InsertionMode::InBody;
            }
            Token::StartTag { name, .. }
                if matches!(
                    name.as_str(),
                    "base" | "basefont" | "bgsound" | "link" | "meta" | "noframes" | "script"
                        | "style" | "title"
                ) =>
            {
                // "Push the node pointed to by the head element pointer onto the
                // stack of open elements. Process the token using the rules for
                // the "in head" insertion mode. Remove the node pointed to by the
                // head element pointer from the stack of open elements."
                self.parse_error("head content after head");
                let Some(head) = self.head_element_pointer else {
                    return;
                };
                self.push_open(head);
                self.handle_in_head_mode(token);
                if let Some(pos) = self.stack_of_open_elements.iter().rposition(|&id| id == head) {
                    self.remove_open(pos);
                }
            }
            t if t.is_start_tag_named("head") => self.parse_error("nested head"),
            Token::EndTag { name } if !matches!(name.as_str(), "body" | "html" | "br") => {
                self.parse_error("unexpected end tag after head");
            }
            _ => {
                let _ = self.insert_html_element("body", &[]);
                self.insertion_mode = InsertionMode::InBody;
                self.process_token(token);
            }
        }
    }

    /// [§ 13.2.6.4.7 The "in body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
    fn handle_in_body_mode(&mut self, token: &Token) {
        match token {
            Token::Character { data: '\0' } => self.parse_error("unexpected null character"),
            Token::Character { data } => self.insert_character(*data),
            Token::Comment { data } => self.insert_comment(data, self.current_node()),
            Token::Doctype { .. } => self.parse_error("unexpected doctype"),
            Token::StartTag {
                name,
                attributes,
                self_closing,
            } => self.handle_in_body_start_tag(name, attributes, *self_closing),
            Token::EndTag { name } => self.handle_in_body_end_tag(name),
            // "An end-of-file token - ... Stop parsing."
            Token::EndOfFile => self.stopped = true,
        }
    }

    fn handle_in_body_start_tag(&mut self, name: &str, attributes: &[Attribute], self_closing: bool) {
        match name {
            // "A start tag whose tag name is "html" - Parse error. ... for each
            // attribute on the token, check to see if the attribute is already
            // present on the top element of the stack of open elements."
            "html" => {
                self.parse_error("unexpected html start tag");
                let top = self.stack_of_open_elements.first().copied();
                self.merge_attributes(top, attributes);
            }
            "base" | "basefont" | "bgsound" | "link" | "meta" | "noframes" | "script"
            | "style" | "title" => {
                self.handle_in_head_mode(&Token::StartTag {
                    name: name.to_string(),
                    self_closing,
                    attributes: attributes.to_vec(),
                });
            }
            "body" => {
                self.parse_error("unexpected body start tag");
                let body = self.stack_of_open_elements.get(1).copied();
                if body.is_some_and(|id| self.tree.is_element_named(id, "body")) {
                    self.merge_attributes(body, attributes);
                }
            }
            tag if CLOSES_P_CONTAINERS.contains(&tag) => {
                self.close_p_if_in_button_scope();
                let _ = self.insert_html_element(name, attributes);
            }
            tag if HEADINGS.contains(&tag) => {
                self.close_p_if_in_button_scope();
                // "If the current node is an HTML element whose tag name is one
                // of "h1", ..., "h6", then this is a parse error; pop the current
                // node off the stack of open elements."
                if self.current_node_is_one_of(HEADINGS) {
                    self.parse_error("nested heading");
                    let _ = self.pop_open();
                }
                let _ = self.insert_html_element(name, attributes);
            }
            "pre" | "listing" => {
                self.close_p_if_in_button_scope();
                let _ = self.insert_html_element(name, attributes);
                self.skip_next_newline = true;
            }
            "li" => {
                self.close_list_items(&["li"]);
                self.close_p_if_in_button_scope();
                let _ = self.insert_html_element(name, attributes);
            }
            "dd" | "dt" => {
                self.close_list_items(&["dd", "dt"]);
                self.close_p_if_in_button_scope();
                let _ = self.insert_html_element(name, attributes);
            }
            "hr" => {
                self.close_p_if_in_button_scope();
                self.insert_and_pop(name, attributes);
            }
            "textarea" => {
                let _ = self.insert_html_element(name, attributes);
                self.skip_next_newline = true;
                self.original_insertion_mode = Some(self.insertion_mode);
                self.insertion_mode = InsertionMode::Text;
            }
            "xmp" | "iframe" | "noembed" => {
                if name == "xmp" {
                    self.close_p_if_in_button_scope();
                }
                let _ = self.insert_html_element(name, attributes);
                self.original_insertion_mode = Some(self.insertion_mode);
                self.insertion_mode = InsertionMode::Text;
            }
            tag if VOID_ELEMENTS.contains(&tag) => self.insert_and_pop(name, attributes),
            // "Any other start tag - Reconstruct the active formatting elements,
            // if any. Insert an HTML element for the token."
            _ => {
                let _ = self.insert_html_element(name, attributes);
                // NOTE: Self-closing foreign elements are not modeled; a
                // self-closing flag on an unknown element is a parse error.
                if self_closing {
                    self.parse_error("non-void element with self-closing flag");
                }
            }
        }
    }

    /// Steps shared by the `li`, `dd` and `dt` start tags: walk down the stack
    /// closing a matching list item, stopping at special elements other than
    /// address, div and p.
    fn close_list_items(&mut self, tags: &[&str]) {
        if !self.any_open(tags) {
            return;
        }
        for index in (0..self.stack_of_open_elements.len()).rev() {
            let node = self.stack_of_open_elements[index];
            let Some(tag) = self.tag_name(node) else {
                continue;
            };
            if tags.contains(&tag) {
                let tag = tag.to_string();
                self.generate_implied_end_tags(Some(&tag));
                if !self.current_node_is_one_of(&[tag.as_str()]) {
                    self.parse_error("list item closed with other elements open");
                }
                self.pop_until_one_of(&[tag.as_str()]);
                return;
            }
            if SPECIAL_ELEMENTS.contains(&tag) && !matches!(tag, "address" | "div" | "p") {
                return;
            }
        }
    }

    fn handle_in_body_end_tag(&mut self, name: &str) {
        match name {
            // "An end tag whose tag name is "body" - If the stack of open
            // elements does not have a body element in scope, this is a parse
            // error; ignore the token."
            "body" | "html" => {
                if !self.has_element_in_scope(&["body"], Scope::Default) {
                    self.parse_error("end body without body in scope");
                    return;
                }
                self.insertion_mode = InsertionMode::AfterBody;
                if name == "html" {
                    self.process_token(&Token::EndTag {
                        name: name.to_string(),
                    });
                }
            }
            "p" => {
                // "If the stack of open elements does not have a p element in
                // button scope, then this is a parse error; insert an HTML
                // element for a "p" start tag token with no attributes."
                if !self.has_element_in_scope(&["p"], Scope::Button) {
                    self.parse_error("end p without open p");
                    let _ = self.insert_html_element("p", &[]);
                }
                self.close_p_element();
            }
            "li" => self.close_scoped_element(&["li"], Scope::ListItem),
            "dd" | "dt" => self.close_scoped_element(&[name], Scope::Default),
            tag if HEADINGS.contains(&tag) => self.close_scoped_element(HEADINGS, Scope::Default),
            "br" => {
                self.parse_error("end br treated as start br");
                self.insert_and_pop("br", &[]);
            }
            tag if CLOSES_P_CONTAINERS.contains(&tag) || matches!(tag, "pre" | "listing") => {
                self.close_scoped_element(&[name], Scope::Default);
            }
            _ => self.any_other_end_tag(name),
        }
    }

    /// Shared handling for end tags that close an element in scope.
    fn close_scoped_element(&mut self, tags: &[&str], scope: Scope) {
        if !self.has_element_in_scope(tags, scope) {
            self.parse_error("end tag without matching element in scope");
            return;
        }
        let except = if let [only] = tags { Some(*only) } else { None };
        self.generate_implied_end_tags(except);
        if !self.current_node_is_one_of(tags) {
            self.parse_error("end tag closed other open elements");
        }
        self.pop_until_one_of(tags);
    }

    /// "Any other end tag - Run these steps:"
    fn any_other_end_tag(&mut self, name: &str) {
        for index in (0..self.stack_of_open_elements.len()).rev() {
            let node = self.stack_of_open_elements[index];
            let Some(tag) = self.tag_name(node) else {
                continue;
            };
            // STEP 2: "If node is an HTML element with the same tag name as the
            // token, then: Generate implied end tags, except for HTML elements
            // with the same tag name as the token. ... Pop all the nodes from
            // the current node up to node, including node, then stop these steps."
            if tag == name {
                self.generate_implied_end_tags(Some(name));
                self.truncate_open(index);
                return;
            }
            // STEP 3: "Otherwise, if node is in the special category, then this
            // is a parse error; ignore the token, and return."
            if SPECIAL_ELEMENTS.contains(&tag) {
                self.parse_error("unmatched end tag");
                return;
            }
        }
    }

    /// [§ 13.2.6.4.8 The "text" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incdata)
    fn handle_text_mode(&mut self, token: &Token) {
        match token {
            Token::Character { data } => self.insert_character(*data),
            Token::EndOfFile => {
                self.parse_error("eof in text");
                let _ = self.pop_open();
                self.insertion_mode = self
                    .original_insertion_mode
                    .take()
                    .unwrap_or(InsertionMode::InBody);
                self.process_token(token);
            }
            _ => {
                let _ = self.pop_open();
                self.insertion_mode = self
                    .original_insertion_mode
                    .take()
                    .unwrap_or(InsertionMode::InBody);
            }
        }
    }

    /// [§ 13.2.6.4.19 The "after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterbody)
    fn handle_after_body_mode(&mut self, token: &Token) {
        match token {
            t if t.is_whitespace_character() => self.handle_in_body_mode(t),
            // "Insert a comment as the last child of the first element in the
            // stack of open elements (the html element)."
            Token::Comment { data } => {
                let html = self
                    .stack_of_open_elements
                    .first()
                    .copied()
                    .unwrap_or(NodeId::ROOT);
                self.insert_comment(data, html);
            }
            Token::Doctype { .. } => self.parse_error("unexpected doctype"),
            t if t.is_start_tag_named("html") => self.handle_in_body_mode(t),
            t if t.is_end_tag_named("html") => {
                self.insertion_mode = InsertionMode::AfterAfterBody;
            }
            Token::EndOfFile => self.stopped = true,
            _ => {
                self.parse_error("content after body");
                self.insertion_mode = InsertionMode::InBody;
                self.process_token(token);
            }
        }
    }

    /// [§ 13.2.6.4.22 The "after after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-body-insertion-mode)
    fn handle_after_after_body_mode(&mut self, token: &Token) {
        match token {
            Token::Comment { data } => self.insert_comment(data, NodeId::ROOT),
            t if t.is_whitespace_character() || t.is_start_tag_named("html") => {
                self.handle_in_body_mode(t);
            }
            Token::Doctype { .. } => self.handle_in_body_mode(token),
            Token::EndOfFile => self.stopped = true,
            _ => {
                self.parse_error("content after html");
                self.insertion_mode = InsertionMode::InBody;
                self.process_token(token);
            }
        }
    }
}
