use core::fmt;

use crate::tokenizer::{CssToken, CssTokenizer};

/// [§ 5.2 Definitions](https://www.w3.org/TR/css-syntax-3/#declaration)
///
/// "Conceptually, declarations are a particular instance of associating a
/// property or descriptor name with a value."
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    /// Property name as written.
    pub name: String,
    /// Value with the `!important` flag and surrounding whitespace removed.
    pub value: Vec<ComponentValue>,
    /// "Declarations are further categorized as important or not important."
    pub important: bool,
}

impl Declaration {
    /// The value serialized back to CSS text, e.g. `1px solid #ccc`.
    #[must_use]
    pub fn value_text(&self) -> String {
        serialize_component_values(&self.value)
    }
}

/// [§ 5.2 Definitions](https://www.w3.org/TR/css-syntax-3/#component-value)
///
/// "A component value is one of the preserved tokens, a function, or a simple block."
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentValue {
    /// A preserved token.
    Token(CssToken),
    /// A function with its arguments.
    Function {
        /// Function name without the `(`.
        name: String,
        /// Arguments.
        value: Vec<ComponentValue>,
    },
    /// A simple block opened by `{`, `[` or `(`.
    Block {
        /// Opening character.
        token: char,
        /// Block contents.
        value: Vec<ComponentValue>,
    },
}

impl fmt::Display for ComponentValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Token(token) => write!(f, "{token}"),
            Self::Function { name, value } => {
                write!(f, "{name}(")?;
                for v in value {
                    write!(f, "{v}")?;
                }
                f.write_str(")")
            }
            Self::Block { token, value } => {
                let close = match token {
                    '{' => '}',
                    '[' => ']',
                    _ => ')',
                };
                write!(f, "{token}")?;
                for v in value {
                    write!(f, "{v}")?;
                }
                write!(f, "{close}")
            }
        }
    }
}

/// Serialize a component value list, trimmed of surrounding whitespace.
#[must_use]
pub fn serialize_component_values(values: &[ComponentValue]) -> String {
    let text: String = values.iter().map(ToString::to_string).collect();
    text.trim().to_string()
}

/// [§ 5.2 Definitions](https://www.w3.org/TR/css-syntax-3/#qualified-rule)
///
/// "A qualified rule has a prelude consisting of a list of component values,
/// and a block consisting of a simple {} block." In a stylesheet the prelude
/// is a selector list and the block a declaration list.
#[derive(Debug, Clone, PartialEq)]
pub struct QualifiedRule {
    /// Prelude component values.
    pub prelude: Vec<ComponentValue>,
    /// Declarations from the block, in source order.
    pub declarations: Vec<Declaration>,
}

impl QualifiedRule {
    /// The prelude as selector text, with runs of whitespace collapsed.
    #[must_use]
    pub fn selector_text(&self) -> String {
        serialize_component_values(&self.prelude)
            .split_ascii_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// [§ 5.2 Definitions](https://www.w3.org/TR/css-syntax-3/#at-rule)
///
/// "An at-rule has a name, a prelude consisting of a list of component
/// values, and an optional block consisting of a simple {} block."
#[derive(Debug, Clone, PartialEq)]
pub struct AtRule {
    /// Name without the `@`.
    pub name: String,
    /// Prelude component values.
    pub prelude: Vec<ComponentValue>,
    /// Raw block contents, if the rule has a block.
    pub block: Option<Vec<ComponentValue>>,
}

/// A top-level rule.
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    /// A style rule.
    Qualified(QualifiedRule),
    /// An at-rule (`@media`, `@font-face`, `@keyframes`, ...), kept unparsed.
    At(AtRule),
}

/// [§ 5.2 Definitions](https://www.w3.org/TR/css-syntax-3/#css-stylesheet)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Stylesheet {
    /// Rules in source order.
    pub rules: Vec<Rule>,
}

impl Stylesheet {
    /// Iterate the style rules, skipping at-rules.
    pub fn qualified_rules(&self) -> impl Iterator<Item = &QualifiedRule> {
        self.rules.iter().filter_map(|rule| match rule {
            Rule::Qualified(q) => Some(q),
            Rule::At(_) => None,
        })
    }
}

/// Tokenize and parse a complete stylesheet.
#[must_use]
pub fn parse_stylesheet(css: &str) -> Stylesheet {
    let mut tokenizer = CssTokenizer::new(css);
    tokenizer.run();
    CssParser::new(tokenizer.into_tokens()).parse_stylesheet()
}

/// Tokenize and parse a declaration list, as found in a `style` attribute.
#[must_use]
pub fn parse_declaration_list(css: &str) -> Vec<Declaration> {
    let mut tokenizer = CssTokenizer::new(css);
    tokenizer.run();
    CssParser::new(tokenizer.into_tokens()).parse_declaration_list()
}

/// [§ 5 Parsing](https://www.w3.org/TR/css-syntax-3/#parsing)
///
/// Consumes a token stream produced by [`CssTokenizer`].
pub struct CssParser {
    tokens: Vec<CssToken>,
    position: usize,
}

impl CssParser {
    /// Create a parser over `tokens`.
    #[must_use]
    pub const fn new(tokens: Vec<CssToken>) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    /// [§ 5.3.3 Parse a stylesheet](https://www.w3.org/TR/css-syntax-3/#parse-stylesheet)
    pub fn parse_stylesheet(&mut self) -> Stylesheet {
        Stylesheet {
            rules: self.rule_list(true),
        }
    }

    /// [§ 5.3.8 Parse a list of declarations](https://www.w3.org/TR/css-syntax-3/#parse-list-of-declarations)
    ///
    /// A stray `}` at top level is skipped rather than ending the list.
    pub fn parse_declaration_list(&mut self) -> Vec<Declaration> {
        let mut declarations = Vec::new();
        loop {
            declarations.extend(self.declaration_list());
            match self.peek() {
                Some(CssToken::RightBrace) => {
                    let _ = self.consume();
                }
                _ => return declarations,
            }
        }
    }

    /// [§ 5.4.1 Consume a list of rules](https://www.w3.org/TR/css-syntax-3/#consume-list-of-rules)
    fn rule_list(&mut self, top_level: bool) -> Vec<Rule> {
        let mut rules = Vec::new();
        loop {
            match self.peek() {
                Some(CssToken::Whitespace) => {
                    let _ = self.consume();
                }
                None | Some(CssToken::EOF) => return rules,
                // "If the top-level flag is set, do nothing. Otherwise, reconsume
                // the current input token. Consume a qualified rule."
                Some(CssToken::CDO | CssToken::CDC) if top_level => {
                    let _ = self.consume();
                }
                Some(CssToken::AtKeyword(_)) => {
                    if let Some(at_rule) = self.at_rule() {
                        rules.push(Rule::At(at_rule));
                    }
                }
                Some(_) => {
                    if let Some(rule) = self.qualified_rule() {
                        rules.push(Rule::Qualified(rule));
                    }
                }
            }
        }
    }

    /// [§ 5.4.2 Consume an at-rule](https://www.w3.org/TR/css-syntax-3/#consume-at-rule)
    fn at_rule(&mut self) -> Option<AtRule> {
        let Some(CssToken::AtKeyword(name)) = self.consume().cloned() else {
            return None;
        };
        let mut prelude = Vec::new();
        loop {
            match self.peek() {
                Some(CssToken::Semicolon) => {
                    let _ = self.consume();
                    return Some(AtRule {
                        name,
                        prelude,
                        block: None,
                    });
                }
                None | Some(CssToken::EOF) => {
                    return Some(AtRule {
                        name,
                        prelude,
                        block: None,
                    });
                }
                Some(CssToken::LeftBrace) => {
                    let block = self.simple_block();
                    return Some(AtRule {
                        name,
                        prelude,
                        block: Some(block),
                    });
                }
                Some(_) => {
                    if let Some(value) = self.component_value() {
                        prelude.push(value);
                    }
                }
            }
        }
    }

    /// [§ 5.4.3 Consume a qualified rule](https://www.w3.org/TR/css-syntax-3/#consume-qualified-rule)
    fn qualified_rule(&mut self) -> Option<QualifiedRule> {
        let mut prelude = Vec::new();
        loop {
            match self.peek() {
                // "This is a parse error. Return nothing."
                None | Some(CssToken::EOF) => return None,
                Some(CssToken::LeftBrace) => {
                    let _ = self.consume();
                    let declarations = self.declaration_list();
                    if self.peek() == Some(&CssToken::RightBrace) {
                        let _ = self.consume();
                    }
                    return Some(QualifiedRule {
                        prelude,
                        declarations,
                    });
                }
                Some(_) => {
                    if let Some(value) = self.component_value() {
                        prelude.push(value);
                    }
                }
            }
        }
    }

    /// [§ 5.4.8 Consume a simple block](https://www.w3.org/TR/css-syntax-3/#consume-simple-block)
    fn simple_block(&mut self) -> Vec<ComponentValue> {
        let ending = match self.consume() {
            Some(CssToken::LeftBrace) => CssToken::RightBrace,
            Some(CssToken::LeftBracket) => CssToken::RightBracket,
            Some(CssToken::LeftParen) => CssToken::RightParen,
            _ => return Vec::new(),
        };
        let mut value = Vec::new();
        loop {
            match self.peek() {
                Some(token) if *token == ending => {
                    let _ = self.consume();
                    return value;
                }
                None | Some(CssToken::EOF) => return value,
                Some(_) => {
                    if let Some(v) = self.component_value() {
                        value.push(v);
                    }
                }
            }
        }
    }

    /// [§ 5.4.5 Consume a list of declarations](https://www.w3.org/TR/css-syntax-3/#consume-list-of-declarations)
    ///
    /// Stops before a `}` so the enclosing rule can consume it.
    fn declaration_list(&mut self) -> Vec<Declaration> {
        let mut declarations = Vec::new();
        loop {
            match self.peek() {
                Some(CssToken::Whitespace | CssToken::Semicolon) => {
                    let _ = self.consume();
                }
                None | Some(CssToken::EOF | CssToken::RightBrace) => return declarations,
                Some(CssToken::AtKeyword(_)) => {
                    let _ = self.at_rule();
                }
                Some(CssToken::Ident(_)) => {
                    if let Some(decl) = self.declaration() {
                        declarations.push(decl);
                    }
                }
                // "This is a parse error. Reconsume the current input token. As long
                // as the next input token is anything other than a <semicolon-token>
                // or <EOF-token>, consume a component value and throw away the
                // returned value."
                Some(_) => self.skip_to_declaration_end(),
            }
        }
    }

    /// [§ 5.4.6 Consume a declaration](https://www.w3.org/TR/css-syntax-3/#consume-declaration)
    fn declaration(&mut self) -> Option<Declaration> {
        let Some(CssToken::Ident(name)) = self.consume().cloned() else {
            return None;
        };
        self.skip_whitespace();

        // "If the next input token is anything other than a <colon-token>, this is
        // a parse error. Return nothing."
        if self.peek() != Some(&CssToken::Colon) {
            self.skip_to_declaration_end();
            return None;
        }
        let _ = self.consume();
        self.skip_whitespace();

        let mut value = Vec::new();
        while !matches!(
            self.peek(),
            None | Some(CssToken::EOF | CssToken::Semicolon | CssToken::RightBrace)
        ) {
            if let Some(v) = self.component_value() {
                value.push(v);
            }
        }

        // "If the last two non-<whitespace-token>s in the declaration's value are a
        // <delim-token> with the value "!" followed by an <ident-token> with a value
        // that is an ASCII case-insensitive match for "important", remove them from
        // the declaration's value and set the declaration's important flag to true."
        let important = strip_important(&mut value);

        // "While the last token in the declaration's value is a <whitespace-token>,
        // remove that token."
        while value
            .last()
            .is_some_and(|v| matches!(v, ComponentValue::Token(CssToken::Whitespace)))
        {
            let _ = value.pop();
        }

        if value.is_empty() {
            return None;
        }

        Some(Declaration {
            name,
            value,
            important,
        })
    }

    /// [§ 5.4.7 Consume a component value](https://www.w3.org/TR/css-syntax-3/#consume-component-value)
    fn component_value(&mut self) -> Option<ComponentValue> {
        match self.peek()? {
            CssToken::LeftBrace | CssToken::LeftBracket | CssToken::LeftParen => {
                let token = match self.peek() {
                    Some(CssToken::LeftBrace) => '{',
                    Some(CssToken::LeftBracket) => '[',
                    _ => '(',
                };
                let value = self.simple_block();
                Some(ComponentValue::Block { token, value })
            }
            CssToken::Function(_) => {
                let Some(CssToken::Function(name)) = self.consume().cloned() else {
                    return None;
                };
                Some(ComponentValue::Function {
                    name,
                    value: self.consume_function_arguments(),
                })
            }
            CssToken::EOF => None,
            _ => self.consume().cloned().map(ComponentValue::Token),
        }
    }

    /// [§ 5.4.9 Consume a function](https://www.w3.org/TR/css-syntax-3/#consume-function)
    fn consume_function_arguments(&mut self) -> Vec<ComponentValue> {
        let mut value = Vec::new();
        loop {
            match self.peek() {
                Some(CssToken::RightParen) => {
                    let _ = self.consume();
                    return value;
                }
                None | Some(CssToken::EOF) => return value,
                Some(_) => {
                    if let Some(v) = self.component_value() {
                        value.push(v);
                    }
                }
            }
        }
    }

    fn skip_to_declaration_end(&mut self) {
        while !matches!(
            self.peek(),
            None | Some(CssToken::EOF | CssToken::Semicolon | CssToken::RightBrace)
        ) {
            let _ = self.component_value();
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(CssToken::is_whitespace) {
            let _ = self.consume();
        }
    }

    fn consume(&mut self) -> Option<&CssToken> {
        let token = self.tokens.get(self.position)?;
        self.position += 1;
        Some(token)
    }

    fn peek(&self) -> Option<&CssToken> {
        self.tokens.get(self.position)
    }
}

/// Remove a trailing `! important` pair from `value`, returning whether one was found.
fn strip_important(value: &mut Vec<ComponentValue>) -> bool {
    let significant: Vec<usize> = value
        .iter()
        .enumerate()
        .filter(|(_, v)| !matches!(v, ComponentValue::Token(CssToken::Whitespace)))
        .map(|(i, _)| i)
        .collect();
    let &[.., bang, ident] = significant.as_slice() else {
        return false;
    };
    let is_bang = matches!(value[bang], ComponentValue::Token(CssToken::Delim('!')));
    let is_important = matches!(
        &value[ident],
        ComponentValue::Token(CssToken::Ident(word)) if word.eq_ignore_ascii_case("important")
    );
    if is_bang && is_important {
        value.truncate(bang);
        true
    } else {
        false
    }
}
