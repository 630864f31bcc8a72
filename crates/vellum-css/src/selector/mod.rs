//! CSS selector parsing and matching
//!
//! Selectors are resolved against a [`DomTree`] the way `querySelectorAll`
//! resolves them: a selector list that fails to parse is an error for the
//! whole list, a list that parses matches the union of its items.
//!
//! Interactive states (`:hover`, `:focus`, ...) and pseudo-elements parse but
//! never match, since an exported document has no pointer, focus or generated
//! content.
//!
//! [Selectors Level 4](https://www.w3.org/TR/selectors-4/)

use thiserror::Error;
use vellum_dom::{DomTree, ElementData, NodeId, NodeType};

/// A selector string that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    /// [§ 3.1](https://www.w3.org/TR/selectors-4/#invalid)
    /// "An invalid selector represents, and therefore matches, nothing."
    #[error("invalid selector `{selector}`: {reason}")]
    Invalid {
        /// The full selector text.
        selector: String,
        /// What the parser choked on.
        reason: String,
    },
}

/// [§ 5 Elemental selectors](https://www.w3.org/TR/selectors-4/#elemental-selectors)
/// [§ 6 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
///
/// A simple selector is a single condition on an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleSelector {
    /// [§ 5.1 Type selector](https://www.w3.org/TR/selectors-4/#type-selectors), lowercased.
    Type(String),
    /// [§ 5.2 Universal selector](https://www.w3.org/TR/selectors-4/#universal-selector)
    Universal,
    /// [§ 6.6 Class selector](https://www.w3.org/TR/selectors-4/#class-html)
    Class(String),
    /// [§ 6.7 ID selector](https://www.w3.org/TR/selectors-4/#id-selectors)
    Id(String),
    /// [§ 6.1 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
    Attribute(AttributeSelector),
    /// A tree-structural or element-state pseudo-class.
    PseudoClass(PseudoClass),
    /// Interactive pseudo-classes and all pseudo-elements.
    NeverMatch,
}

/// [§ 6.1](https://www.w3.org/TR/selectors-4/#attribute-representation)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSelector {
    /// Attribute name, lowercased.
    pub name: String,
    /// Operator and value; `None` for `[attr]`.
    pub matcher: Option<(AttributeOperator, String)>,
    /// [§ 6.3](https://www.w3.org/TR/selectors-4/#attribute-case)
    /// "the identifier i ... causes the value to be matched ASCII case-insensitively"
    pub case_insensitive: bool,
}

/// Attribute selector operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeOperator {
    /// `[attr=value]`
    Equals,
    /// `[attr~=value]`: one of the whitespace-separated words.
    Includes,
    /// `[attr|=value]`: exactly `value` or starting with `value-`.
    DashMatch,
    /// `[attr^=value]`
    Prefix,
    /// `[attr$=value]`
    Suffix,
    /// `[attr*=value]`
    Substring,
}

/// Pseudo-classes that can be evaluated on a static tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PseudoClass {
    /// [§ 14.1 :root](https://www.w3.org/TR/selectors-4/#the-root-pseudo)
    Root,
    /// [§ 14.2 :empty](https://www.w3.org/TR/selectors-4/#the-empty-pseudo)
    Empty,
    /// [§ 14.4 Child-indexed pseudo-classes](https://www.w3.org/TR/selectors-4/#child-index).
    /// `:first-child` is `an+b = 0n+1`, `:last-child` the same counted from the end.
    Nth {
        /// Step.
        a: i32,
        /// Offset.
        b: i32,
        /// Count only siblings with the same tag name.
        of_type: bool,
        /// Count from the last sibling.
        from_end: bool,
    },
    /// `:only-child` / `:only-of-type`
    Only {
        /// Count only siblings with the same tag name.
        of_type: bool,
    },
    /// [§ 8.1 :any-link](https://www.w3.org/TR/selectors-4/#the-any-link-pseudo);
    /// every link is unvisited, so `:link` is the same thing.
    AnyLink,
    /// `:enabled`
    Enabled,
    /// `:disabled`
    Disabled,
    /// `:checked`
    Checked,
    /// [§ 4.3 :not()](https://www.w3.org/TR/selectors-4/#negation)
    Not(Vec<ComplexSelector>),
    /// [§ 4.2 :is()](https://www.w3.org/TR/selectors-4/#matches) and `:where()`.
    Is(Vec<ComplexSelector>),
}

/// [§ 4.2 Compound selectors](https://www.w3.org/TR/selectors-4/#compound)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompoundSelector {
    /// The simple selectors, all of which must match.
    pub simple_selectors: Vec<SimpleSelector>,
}

/// [§ 16 Combinators](https://www.w3.org/TR/selectors-4/#combinators)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// `A B`
    Descendant,
    /// `A > B`
    Child,
    /// `A + B`
    NextSibling,
    /// `A ~ B`
    SubsequentSibling,
}

/// [§ 4.3 Complex selectors](https://www.w3.org/TR/selectors-4/#complex)
///
/// `div.card > ul li` is stored as subject `li` with the chain
/// `[(Descendant, ul), (Child, div.card)]`, right to left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexSelector {
    /// The rightmost compound selector.
    pub subject: CompoundSelector,
    /// Combinators and compounds walking left from the subject.
    pub combinators: Vec<(Combinator, CompoundSelector)>,
}

/// [§ 4.1 Selector lists](https://www.w3.org/TR/selectors-4/#grouping)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList(pub Vec<ComplexSelector>);

impl SelectorList {
    /// Does any selector in the list match `node`?
    #[must_use]
    pub fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        self.0.iter().any(|s| s.matches(tree, node))
    }
}

impl ComplexSelector {
    /// [§ 4.1 Selector Matching](https://www.w3.org/TR/selectors-4/#match-a-selector-against-an-element)
    #[must_use]
    pub fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        compound_matches(&self.subject, tree, node) && self.matches_chain(0, tree, node)
    }

    /// Match combinators `index..` given that the compound to their right matched `node`.
    /// Backtracks: `a > b c` tries every `b` ancestor, not just the nearest.
    fn matches_chain(&self, index: usize, tree: &DomTree, node: NodeId) -> bool {
        let Some((combinator, compound)) = self.combinators.get(index) else {
            return true;
        };
        let try_candidate = |id: NodeId| {
            compound_matches(compound, tree, id) && self.matches_chain(index + 1, tree, id)
        };

        match combinator {
            Combinator::Descendant => tree.ancestors(node).any(try_candidate),
            Combinator::Child => tree.parent(node).is_some_and(try_candidate),
            Combinator::NextSibling => {
                previous_element_sibling(tree, node).is_some_and(try_candidate)
            }
            Combinator::SubsequentSibling => tree
                .preceding_siblings(node)
                .filter(|&s| tree.as_element(s).is_some())
                .any(try_candidate),
        }
    }
}

fn compound_matches(compound: &CompoundSelector, tree: &DomTree, node: NodeId) -> bool {
    let Some(element) = tree.as_element(node) else {
        return false;
    };
    compound
        .simple_selectors
        .iter()
        .all(|simple| simple_matches(simple, tree, node, element))
}

fn simple_matches(simple: &SimpleSelector, tree: &DomTree, node: NodeId, element: &ElementData) -> bool {
    match simple {
        SimpleSelector::Type(name) => element.tag_name.eq_ignore_ascii_case(name),
        SimpleSelector::Universal => true,
        SimpleSelector::Class(class) => element.classes().contains(class.as_str()),
        SimpleSelector::Id(id) => element.id().is_some_and(|own| own == id),
        SimpleSelector::Attribute(attr) => attribute_matches(attr, element),
        SimpleSelector::PseudoClass(pc) => pseudo_class_matches(pc, tree, node, element),
        SimpleSelector::NeverMatch => false,
    }
}

/// [§ 6.1 Attribute presence and value selectors](https://www.w3.org/TR/selectors-4/#attribute-representation)
fn attribute_matches(attr: &AttributeSelector, element: &ElementData) -> bool {
    let Some(actual) = element.attrs.get(&attr.name) else {
        return false;
    };
    let Some((op, expected)) = &attr.matcher else {
        return true;
    };
    let (actual, expected) = if attr.case_insensitive {
        (actual.to_ascii_lowercase(), expected.to_ascii_lowercase())
    } else {
        (actual.clone(), expected.clone())
    };
    match op {
        AttributeOperator::Equals => actual == expected,
        AttributeOperator::Includes => {
            !expected.is_empty() && actual.split_ascii_whitespace().any(|w| w == expected)
        }
        AttributeOperator::DashMatch => {
            actual == expected || actual.starts_with(&format!("{expected}-"))
        }
        // "If "val" is the empty string then the selector does not represent anything."
        AttributeOperator::Prefix => !expected.is_empty() && actual.starts_with(&expected),
        AttributeOperator::Suffix => !expected.is_empty() && actual.ends_with(&expected),
        AttributeOperator::Substring => !expected.is_empty() && actual.contains(&expected),
    }
}

fn pseudo_class_matches(pc: &PseudoClass, tree: &DomTree, node: NodeId, element: &ElementData) -> bool {
    match pc {
        PseudoClass::Root => tree.document_element() == Some(node),
        // Comments are ignored; any text node, even whitespace, makes it non-empty.
        PseudoClass::Empty => tree.children(node).iter().all(|&c| {
            matches!(tree.get(c).map(|n| &n.node_type), Some(NodeType::Comment(_)))
        }),
        PseudoClass::Nth {
            a,
            b,
            of_type,
            from_end,
        } => sibling_index(tree, node, element, *of_type, *from_end)
            .is_some_and(|index| nth_matches(*a, *b, index)),
        PseudoClass::Only { of_type } => {
            sibling_index(tree, node, element, *of_type, false) == Some(1)
                && sibling_index(tree, node, element, *of_type, true) == Some(1)
        }
        PseudoClass::AnyLink => {
            (element.is("a") || element.is("area")) && element.attrs.contains_key("href")
        }
        PseudoClass::Disabled => is_form_control(element) && element.attrs.contains_key("disabled"),
        PseudoClass::Enabled => is_form_control(element) && !element.attrs.contains_key("disabled"),
        PseudoClass::Checked => {
            (element.is("input") && element.attrs.contains_key("checked"))
                || (element.is("option") && element.attrs.contains_key("selected"))
        }
        PseudoClass::Not(list) => !list.iter().any(|s| s.matches(tree, node)),
        PseudoClass::Is(list) => list.iter().any(|s| s.matches(tree, node)),
    }
}

fn is_form_control(element: &ElementData) -> bool {
    ["button", "input", "select", "textarea", "optgroup", "option", "fieldset"]
        .iter()
        .any(|tag| element.is(tag))
}

/// 1-based position of `node` among its element siblings.
fn sibling_index(
    tree: &DomTree,
    node: NodeId,
    element: &ElementData,
    of_type: bool,
    from_end: bool,
) -> Option<i32> {
    let parent = tree.parent(node)?;
    let counted = |id: &&NodeId| {
        tree.as_element(**id)
            .is_some_and(|e| !of_type || e.tag_name.eq_ignore_ascii_case(&element.tag_name))
    };
    let siblings: Vec<&NodeId> = tree.children(parent).iter().filter(counted).collect();
    let position = if from_end {
        siblings.iter().rev().position(|&&id| id == node)
    } else {
        siblings.iter().position(|&&id| id == node)
    }?;
    i32::try_from(position + 1).ok()
}

/// [§ 14.4.1 :nth-child()](https://www.w3.org/TR/selectors-4/#the-nth-child-pseudo)
/// "represents elements whose index ... is an+b for some non-negative integer n"
///
/// Evaluated in `i64`, so extreme `b` values cannot overflow.
fn nth_matches(a: i32, b: i32, index: i32) -> bool {
    let a = i64::from(a);
    let diff = i64::from(index) - i64::from(b);
    if a == 0 {
        return diff == 0;
    }
    diff % a == 0 && diff / a >= 0
}

/// [§ 16.3](https://www.w3.org/TR/selectors-4/#adjacent-sibling-combinators)
/// Only element siblings count.
fn previous_element_sibling(tree: &DomTree, node: NodeId) -> Option<NodeId> {
    tree.preceding_siblings(node)
        .find(|&id| tree.as_element(id).is_some())
}

/// Parse a comma-separated selector list.
///
/// # Errors
///
/// Returns [`SelectorError::Invalid`] if any item fails to parse.
pub fn parse_selector_list(text: &str) -> Result<SelectorList, SelectorError> {
    let invalid = |reason: String| SelectorError::Invalid {
        selector: text.to_string(),
        reason,
    };
    let mut parser = SelectorParser::new(text);
    let list = parser.parse_list().map_err(invalid)?;
    if parser.peek().is_some() {
        return Err(invalid(format!("unexpected `{}`", parser.rest())));
    }
    Ok(SelectorList(list))
}

/// Parse a single complex selector (no top-level commas).
///
/// # Errors
///
/// Returns [`SelectorError::Invalid`] for anything that is not exactly one selector.
pub fn parse_selector(text: &str) -> Result<ComplexSelector, SelectorError> {
    let mut list = parse_selector_list(text)?.0;
    match (list.pop(), list.is_empty()) {
        (Some(only), true) => Ok(only),
        _ => Err(SelectorError::Invalid {
            selector: text.to_string(),
            reason: "expected a single selector".to_string(),
        }),
    }
}

/// Elements under `scope` (not `scope` itself) matched by the selector list,
/// in document order.
///
/// # Errors
///
/// Returns [`SelectorError::Invalid`] when `selectors` does not parse.
pub fn query_selector_all(
    tree: &DomTree,
    scope: NodeId,
    selectors: &str,
) -> Result<Vec<NodeId>, SelectorError> {
    let list = parse_selector_list(selectors)?;
    Ok(tree
        .descendants(scope)
        .filter(|&id| list.matches(tree, id))
        .collect())
}

/// Recursive-descent parser over the selector grammar.
struct SelectorParser {
    chars: Vec<char>,
    pos: usize,
}

type ParseResult<T> = Result<T, String>;

impl SelectorParser {
    fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn rest(&self) -> String {
        self.chars[self.pos..].iter().collect()
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_whitespace()) {
            self.pos += 1;
        }
        self.pos > start
    }

    /// `<complex-selector-list>`; stops at end of input or an unmatched `)`.
    fn parse_list(&mut self) -> ParseResult<Vec<ComplexSelector>> {
        let mut list = vec![self.parse_complex()?];
        while self.eat(',') {
            list.push(self.parse_complex()?);
        }
        Ok(list)
    }

    fn parse_complex(&mut self) -> ParseResult<ComplexSelector> {
        let _ = self.skip_whitespace();
        let mut compounds = vec![self.parse_compound()?];
        let mut combinators = Vec::new();

        loop {
            let had_space = self.skip_whitespace();
            let combinator = match self.peek() {
                None | Some(',' | ')') => break,
                Some('>') => Combinator::Child,
                Some('+') => Combinator::NextSibling,
                Some('~') => Combinator::SubsequentSibling,
                Some(_) if had_space => Combinator::Descendant,
                Some(c) => return Err(format!("unexpected `{c}`")),
            };
            if combinator != Combinator::Descendant {
                self.pos += 1;
                let _ = self.skip_whitespace();
            }
            combinators.push(combinator);
            compounds.push(self.parse_compound()?);
        }

        let Some(subject) = compounds.pop() else {
            return Err("empty selector".to_string());
        };
        // compounds[i] is joined to compounds[i + 1] by combinators[i]
        let chain = compounds.into_iter().zip(combinators).rev().map(|(c, k)| (k, c)).collect();
        Ok(ComplexSelector {
            subject,
            combinators: chain,
        })
    }

    /// [§ 4.2](https://www.w3.org/TR/selectors-4/#typedef-compound-selector)
    /// "`<compound-selector> = [ <type-selector>? <subclass-selector>* ...`"
    fn parse_compound(&mut self) -> ParseResult<CompoundSelector> {
        let mut simple_selectors = Vec::new();

        if self.eat('*') {
            simple_selectors.push(SimpleSelector::Universal);
        } else if self.starts_ident() {
            simple_selectors.push(SimpleSelector::Type(self.parse_ident()?.to_ascii_lowercase()));
        }

        loop {
            match self.peek() {
                Some('.') => {
                    self.pos += 1;
                    simple_selectors.push(SimpleSelector::Class(self.parse_ident()?));
                }
                Some('#') => {
                    self.pos += 1;
                    simple_selectors.push(SimpleSelector::Id(self.parse_ident()?));
                }
                Some('[') => {
                    self.pos += 1;
                    simple_selectors.push(SimpleSelector::Attribute(self.parse_attribute()?));
                }
                Some(':') => {
                    self.pos += 1;
                    simple_selectors.push(self.parse_pseudo()?);
                }
                _ => break,
            }
        }

        if simple_selectors.is_empty() {
            return Err(match self.peek() {
                Some(c) => format!("unexpected `{c}`"),
                None => "expected a selector".to_string(),
            });
        }
        Ok(CompoundSelector { simple_selectors })
    }

    /// [§ 6.1](https://www.w3.org/TR/selectors-4/#attribute-representation); the `[` is consumed.
    fn parse_attribute(&mut self) -> ParseResult<AttributeSelector> {
        let _ = self.skip_whitespace();
        let name = self.parse_ident()?.to_ascii_lowercase();
        let _ = self.skip_whitespace();

        let op = match self.bump() {
            Some(']') => {
                return Ok(AttributeSelector {
                    name,
                    matcher: None,
                    case_insensitive: false,
                });
            }
            Some('=') => AttributeOperator::Equals,
            Some(c @ ('~' | '|' | '^' | '$' | '*')) if self.eat('=') => match c {
                '~' => AttributeOperator::Includes,
                '|' => AttributeOperator::DashMatch,
                '^' => AttributeOperator::Prefix,
                '$' => AttributeOperator::Suffix,
                _ => AttributeOperator::Substring,
            },
            _ => return Err(format!("bad attribute selector for `{name}`")),
        };

        let _ = self.skip_whitespace();
        let value = match self.peek() {
            Some(q @ ('"' | '\'')) => {
                self.pos += 1;
                self.parse_quoted(q)?
            }
            _ => self.parse_ident()?,
        };
        let _ = self.skip_whitespace();

        let case_insensitive = match self.peek() {
            Some('i' | 'I') => {
                self.pos += 1;
                true
            }
            Some('s' | 'S') => {
                self.pos += 1;
                false
            }
            _ => false,
        };
        let _ = self.skip_whitespace();
        if !self.eat(']') {
            return Err("unterminated attribute selector".to_string());
        }
        Ok(AttributeSelector {
            name,
            matcher: Some((op, value)),
            case_insensitive,
        })
    }

    /// Pseudo-class or pseudo-element; the first `:` is consumed.
    fn parse_pseudo(&mut self) -> ParseResult<SimpleSelector> {
        if self.eat(':') {
            let _ = self.parse_ident()?;
            if self.eat('(') {
                self.skip_balanced()?;
            }
            return Ok(SimpleSelector::NeverMatch);
        }

        let name = self.parse_ident()?.to_ascii_lowercase();
        if self.eat('(') {
            return self.parse_functional_pseudo(&name);
        }

        let pc = match name.as_str() {
            "root" => PseudoClass::Root,
            "empty" => PseudoClass::Empty,
            "first-child" => nth(0, 1, false, false),
            "last-child" => nth(0, 1, false, true),
            "first-of-type" => nth(0, 1, true, false),
            "last-of-type" => nth(0, 1, true, true),
            "only-child" => PseudoClass::Only { of_type: false },
            "only-of-type" => PseudoClass::Only { of_type: true },
            "link" | "any-link" => PseudoClass::AnyLink,
            "enabled" => PseudoClass::Enabled,
            "disabled" => PseudoClass::Disabled,
            "checked" => PseudoClass::Checked,
            "hover" | "active" | "focus" | "focus-within" | "focus-visible" | "visited"
            | "target" | "before" | "after" | "first-line" | "first-letter" => {
                return Ok(SimpleSelector::NeverMatch);
            }
            other => return Err(format!("unknown pseudo-class `:{other}`")),
        };
        Ok(SimpleSelector::PseudoClass(pc))
    }

    /// The `(` after `name` is consumed; consumes through the matching `)`.
    fn parse_functional_pseudo(&mut self, name: &str) -> ParseResult<SimpleSelector> {
        let pc = match name {
            "not" | "is" | "where" | "matches" => {
                let list = self.parse_list()?;
                if name == "not" {
                    PseudoClass::Not(list)
                } else {
                    PseudoClass::Is(list)
                }
            }
            "nth-child" | "nth-last-child" | "nth-of-type" | "nth-last-of-type" => {
                let start = self.pos;
                while self.peek().is_some_and(|c| c != ')') {
                    self.pos += 1;
                }
                let arg: String = self.chars[start..self.pos].iter().collect();
                let (a, b) = parse_an_plus_b(&arg).ok_or_else(|| format!("bad argument `{arg}`"))?;
                nth(a, b, name.contains("of-type"), name.contains("last"))
            }
            other => return Err(format!("unknown pseudo-class `:{other}()`")),
        };
        let _ = self.skip_whitespace();
        if !self.eat(')') {
            return Err(format!("unterminated `:{name}(`"));
        }
        Ok(SimpleSelector::PseudoClass(pc))
    }

    fn skip_balanced(&mut self) -> ParseResult<()> {
        let mut depth = 1u32;
        while let Some(c) = self.bump() {
            match c {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                _ => {}
            }
        }
        Err("unbalanced parentheses".to_string())
    }

    fn parse_quoted(&mut self, quote: char) -> ParseResult<String> {
        let mut value = String::new();
        while let Some(c) = self.bump() {
            match c {
                c if c == quote => return Ok(value),
                '\\' => {
                    if let Some(escaped) = self.bump() {
                        value.push(escaped);
                    }
                }
                c => value.push(c),
            }
        }
        Err("unterminated string".to_string())
    }

    /// [§ 4.3.9](https://www.w3.org/TR/css-syntax-3/#would-start-an-identifier)
    fn starts_ident(&self) -> bool {
        match self.peek() {
            Some('-') => self
                .peek_at(1)
                .is_some_and(|c| is_ident_start(c) || c == '-' || c == '\\'),
            Some('\\') => true,
            Some(c) => is_ident_start(c),
            None => false,
        }
    }

    fn parse_ident(&mut self) -> ParseResult<String> {
        if !self.starts_ident() {
            return Err(match self.peek() {
                Some(c) => format!("expected an identifier, found `{c}`"),
                None => "expected an identifier".to_string(),
            });
        }
        let mut ident = String::new();
        while let Some(c) = self.peek() {
            if c == '\\' {
                self.pos += 1;
                match self.bump() {
                    Some(escaped) => ident.push(escaped),
                    None => ident.push('\u{FFFD}'),
                }
            } else if is_ident_start(c) || c.is_ascii_digit() || c == '-' {
                ident.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        Ok(ident)
    }
}

const fn nth(a: i32, b: i32, of_type: bool, from_end: bool) -> PseudoClass {
    PseudoClass::Nth {
        a,
        b,
        of_type,
        from_end,
    }
}

const fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

/// [§ 6 The An+B microsyntax](https://www.w3.org/TR/css-syntax-3/#anb-microsyntax)
///
/// Accepts `odd`, `even`, `B`, `An`, `An+B`, `An-B`, `-n+B`, with optional whitespace
/// around the sign.
fn parse_an_plus_b(arg: &str) -> Option<(i32, i32)> {
    let compact: String = arg
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();
    match compact.as_str() {
        "odd" => return Some((2, 1)),
        "even" => return Some((2, 0)),
        "" => return None,
        _ => {}
    }
    let Some(n_pos) = compact.find('n') else {
        return compact.parse().ok().map(|b| (0, b));
    };
    let a = match &compact[..n_pos] {
        "" | "+" => 1,
        "-" => -1,
        digits => digits.parse().ok()?,
    };
    let rest = &compact[n_pos + 1..];
    let b = if rest.is_empty() {
        0
    } else if rest.starts_with(['+', '-']) {
        rest.trim_start_matches('+').parse().ok()?
    } else {
        return None;
    };
    Some((a, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn an_plus_b_forms() {
        assert_eq!(parse_an_plus_b("odd"), Some((2, 1)));
        assert_eq!(parse_an_plus_b("EVEN"), Some((2, 0)));
        assert_eq!(parse_an_plus_b("3"), Some((0, 3)));
        assert_eq!(parse_an_plus_b("2n + 1"), Some((2, 1)));
        assert_eq!(parse_an_plus_b("-n+3"), Some((-1, 3)));
        assert_eq!(parse_an_plus_b("n"), Some((1, 0)));
        assert_eq!(parse_an_plus_b("3n-2"), Some((3, -2)));
        assert_eq!(parse_an_plus_b("2x"), None);
    }

    #[test]
    fn nth_arithmetic() {
        assert!(nth_matches(2, 1, 1));
        assert!(!nth_matches(2, 1, 2));
        assert!(nth_matches(-1, 3, 3));
        assert!(nth_matches(-1, 3, 1));
        assert!(!nth_matches(-1, 3, 4));
        assert!(nth_matches(0, 2, 2));
        assert!(nth_matches(1, i32::MIN, 3));
        assert!(!nth_matches(2, i32::MIN, 3));
        assert!(nth_matches(-1, i32::MAX, 1));
        assert!(!nth_matches(0, i32::MIN, 1));
    }

    #[test]
    fn chain_is_stored_right_to_left() {
        let sel = parse_selector("div.card > ul li").unwrap();
        assert_eq!(sel.subject.simple_selectors, vec![SimpleSelector::Type("li".into())]);
        assert_eq!(sel.combinators.len(), 2);
        assert_eq!(sel.combinators[0].0, Combinator::Descendant);
        assert_eq!(sel.combinators[1].0, Combinator::Child);
        assert_eq!(
            sel.combinators[1].1.simple_selectors,
            vec![SimpleSelector::Type("div".into()), SimpleSelector::Class("card".into())]
        );
    }
}
