use strum_macros::Display;

use super::token::Token;

/// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
///
/// The tokenizer states implemented here. Each corresponds to a section in § 13.2.5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TokenizerState {
    /// [§ 13.2.5.1 Data state](https://html.spec.whatwg.org/multipage/parsing.html#data-state)
    Data,
    /// [§ 13.2.5.2 RCDATA state](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-state)
    RCDATA,
    /// [§ 13.2.5.3 RAWTEXT state](https://html.spec.whatwg.org/multipage/parsing.html#rawtext-state)
    RAWTEXT,
    /// [§ 13.2.5.6 Tag open state](https://html.spec.whatwg.org/multipage/parsing.html#tag-open-state)
    TagOpen,
    /// [§ 13.2.5.7 End tag open state](https://html.spec.whatwg.org/multipage/parsing.html#end-tag-open-state)
    EndTagOpen,
    /// [§ 13.2.5.8 Tag name state](https://html.spec.whatwg.org/multipage/parsing.html#tag-name-state)
    TagName,
    /// [§ 13.2.5.9 RCDATA less-than sign state](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-less-than-sign-state)
    RCDATALessThanSign,
    /// [§ 13.2.5.10 RCDATA end tag open state](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-end-tag-open-state)
    RCDATAEndTagOpen,
    /// [§ 13.2.5.11 RCDATA end tag name state](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-end-tag-name-state)
    RCDATAEndTagName,
    /// [§ 13.2.5.12 RAWTEXT less-than sign state](https://html.spec.whatwg.org/multipage/parsing.html#rawtext-less-than-sign-state)
    RAWTEXTLessThanSign,
    /// [§ 13.2.5.13 RAWTEXT end tag open state](https://html.spec.whatwg.org/multipage/parsing.html#rawtext-end-tag-open-state)
    RAWTEXTEndTagOpen,
    /// [§ 13.2.5.14 RAWTEXT end tag name state](https://html.spec.whatwg.org/multipage/parsing.html#rawtext-end-tag-name-state)
    RAWTEXTEndTagName,
    /// [§ 13.2.5.32 Before attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-name-state)
    BeforeAttributeName,
    /// [§ 13.2.5.33 Attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-name-state)
    AttributeName,
    /// [§ 13.2.5.34 After attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#after-attribute-name-state)
    AfterAttributeName,
    /// [§ 13.2.5.35 Before attribute value state](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-value-state)
    BeforeAttributeValue,
    /// [§ 13.2.5.36 Attribute value (double-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(double-quoted)-state)
    AttributeValueDoubleQuoted,
    /// [§ 13.2.5.37 Attribute value (single-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(single-quoted)-state)
    AttributeValueSingleQuoted,
    /// [§ 13.2.5.38 Attribute value (unquoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(unquoted)-state)
    AttributeValueUnquoted,
    /// [§ 13.2.5.39 After attribute value (quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#after-attribute-value-(quoted)-state)
    AfterAttributeValueQuoted,
    /// [§ 13.2.5.40 Self-closing start tag state](https://html.spec.whatwg.org/multipage/parsing.html#self-closing-start-tag-state)
    SelfClosingStartTag,
    /// [§ 13.2.5.41 Bogus comment state](https://html.spec.whatwg.org/multipage/parsing.html#bogus-comment-state)
    BogusComment,
    /// [§ 13.2.5.42 Markup declaration open state](https://html.spec.whatwg.org/multipage/parsing.html#markup-declaration-open-state)
    MarkupDeclarationOpen,
    /// [§ 13.2.5.43 Comment start state](https://html.spec.whatwg.org/multipage/parsing.html#comment-start-state)
    CommentStart,
    /// [§ 13.2.5.44 Comment start dash state](https://html.spec.whatwg.org/multipage/parsing.html#comment-start-dash-state)
    CommentStartDash,
    /// [§ 13.2.5.45 Comment state](https://html.spec.whatwg.org/multipage/parsing.html#comment-state)
    Comment,
    /// [§ 13.2.5.50 Comment end dash state](https://html.spec.whatwg.org/multipage/parsing.html#comment-end-dash-state)
    CommentEndDash,
    /// [§ 13.2.5.51 Comment end state](https://html.spec.whatwg.org/multipage/parsing.html#comment-end-state)
    CommentEnd,
    /// [§ 13.2.5.53 DOCTYPE state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-state)
    DOCTYPE,
    /// [§ 13.2.5.54 Before DOCTYPE name state](https://html.spec.whatwg.org/multipage/parsing.html#before-doctype-name-state)
    BeforeDOCTYPEName,
    /// [§ 13.2.5.55 DOCTYPE name state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-name-state)
    DOCTYPEName,
    /// [§ 13.2.5.68 Bogus DOCTYPE state](https://html.spec.whatwg.org/multipage/parsing.html#bogus-doctype-state)
    ///
    /// Everything after the DOCTYPE name is skipped through this state.
    BogusDOCTYPE,
}

/// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
///
/// "Implementations must act as if they used the following state machine to tokenize HTML."
pub struct Tokenizer {
    pub(super) state: TokenizerState,
    pub(super) input: String,
    pub(super) current_pos: usize,
    pub(super) current_char: Option<char>,
    pub(super) building: Option<Token>,
    pub(super) at_eof: bool,
    pub(super) tokens: Vec<Token>,
    // "Reconsume in the X state" sets this so the next loop iteration does
    // not consume a new character.
    pub(super) reconsume: bool,

    /// "The last start tag token emitted is used ... in the RCDATA, RAWTEXT,
    /// and script data states."
    pub(super) last_start_tag: Option<String>,

    /// [§ 13.2.5 temporary buffer](https://html.spec.whatwg.org/multipage/parsing.html#temporary-buffer)
    pub(super) scratch: String,

    pub(super) parse_errors: usize,
}

impl Tokenizer {
    /// Create a new tokenizer for the given input.
    ///
    /// "The initial state is the data state."
    #[must_use]
    pub const fn new(input: String) -> Self {
        Self {
            state: TokenizerState::Data,
            input,
            current_pos: 0,
            current_char: None,
            building: None,
            at_eof: false,
            tokens: Vec::new(),
            reconsume: false,
            last_start_tag: None,
            scratch: String::new(),
            parse_errors: 0,
        }
    }

    /// Consume the tokenizer and return the token stream.
    #[must_use]
    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }

    /// Number of parse errors encountered so far.
    #[must_use]
    pub const fn parse_error_count(&self) -> usize {
        self.parse_errors
    }

    /// [§ 13.2.5.1 Data state](https://html.spec.whatwg.org/multipage/parsing.html#data-state)
    fn on_data(&mut self) {
        match self.current_char {
            // "U+0026 AMPERSAND (&)"
            Some('&') => self.consume_character_reference(false),
            // "U+003C LESS-THAN SIGN (<) - Switch to the tag open state."
            Some('<') => self.switch_to(TokenizerState::TagOpen),
            // "EOF - Emit an end-of-file token."
            None => self.emit_eof(),
            Some(c) => self.emit_char(c),
        }
    }

    /// [§ 13.2.5.2 RCDATA state](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-state)
    fn on_rcdata(&mut self) {
        match self.current_char {
            Some('&') => self.consume_character_reference(false),
            Some('<') => self.switch_to(TokenizerState::RCDATALessThanSign),
            Some('\0') => {
                self.report_error("unexpected-null-character");
                self.emit_char('\u{FFFD}');
            }
            None => self.emit_eof(),
            Some(c) => self.emit_char(c),
        }
    }

    /// [§ 13.2.5.3 RAWTEXT state](https://html.spec.whatwg.org/multipage/parsing.html#rawtext-state)
    fn on_rawtext(&mut self) {
        match self.current_char {
            Some('<') => self.switch_to(TokenizerState::RAWTEXTLessThanSign),
            Some('\0') => {
                self.report_error("unexpected-null-character");
                self.emit_char('\u{FFFD}');
            }
            None => self.emit_eof(),
            Some(c) => self.emit_char(c),
        }
    }

    /// [§ 13.2.5.9 RCDATA less-than sign state](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-less-than-sign-state)
    /// and [§ 13.2.5.12 RAWTEXT less-than sign state](https://html.spec.whatwg.org/multipage/parsing.html#rawtext-less-than-sign-state)
    fn on_text_less_than_sign(&mut self, end_tag_open: TokenizerState, text: TokenizerState) {
        if self.current_char == Some('/') {
            // "Set the temporary buffer to the empty string."
            self.scratch.clear();
            self.switch_to(end_tag_open);
        } else {
            self.emit_char('<');
            self.reconsume_in(text);
        }
    }

    /// [§ 13.2.5.10 RCDATA end tag open state](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-end-tag-open-state)
    /// and [§ 13.2.5.13 RAWTEXT end tag open state](https://html.spec.whatwg.org/multipage/parsing.html#rawtext-end-tag-open-state)
    fn on_text_end_tag_open(&mut self, end_tag_name: TokenizerState, text: TokenizerState) {
        match self.current_char {
            // "ASCII alpha - Create a new end tag token, set its tag name to
            // the empty string. Reconsume in the ... end tag name state."
            Some(c) if c.is_ascii_alphabetic() => {
                self.building = Some(Token::end_tag());
                self.reconsume_in(end_tag_name);
            }
            _ => {
                self.emit_char('<');
                self.emit_char('/');
                self.reconsume_in(text);
            }
        }
    }

    /// [§ 13.2.5.11 RCDATA end tag name state](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-end-tag-name-state)
    /// and [§ 13.2.5.14 RAWTEXT end tag name state](https://html.spec.whatwg.org/multipage/parsing.html#rawtext-end-tag-name-state)
    fn on_text_end_tag_name(&mut self, text: TokenizerState) {
        let appropriate = self.is_appropriate_end_tag();
        match self.current_char {
            Some('\t' | '\n' | '\x0C' | ' ') if appropriate => {
                self.switch_to(TokenizerState::BeforeAttributeName);
            }
            Some('/') if appropriate => self.switch_to(TokenizerState::SelfClosingStartTag),
            Some('>') if appropriate => {
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            Some(c) if c.is_ascii_alphabetic() => {
                if let Some(token) = self.building.as_mut() {
                    token.push_tag_name(c.to_ascii_lowercase());
                }
                self.scratch.push(c);
            }
            _ => self.flush_text_end_tag(text),
        }
    }

    /// [§ 13.2.5.6 Tag open state](https://html.spec.whatwg.org/multipage/parsing.html#tag-open-state)
    fn on_tag_open(&mut self) {
        match self.current_char {
            // "U+0021 EXCLAMATION MARK (!) - Switch to the markup declaration open state."
            Some('!') => self.switch_to(TokenizerState::MarkupDeclarationOpen),
            // "U+002F SOLIDUS (/) - Switch to the end tag open state."
            Some('/') => self.switch_to(TokenizerState::EndTagOpen),
            // "ASCII alpha - Create a new start tag token... Reconsume in the tag name state."
            Some(c) if c.is_ascii_alphabetic() => {
                self.building = Some(Token::start_tag());
                self.reconsume_in(TokenizerState::TagName);
            }
            // "U+003F QUESTION MARK (?) - unexpected-question-mark-instead-of-tag-name"
            Some('?') => {
                self.report_error("unexpected-question-mark-instead-of-tag-name");
                self.building = Some(Token::empty_comment());
                self.reconsume_in(TokenizerState::BogusComment);
            }
            None => {
                self.report_error("eof-before-tag-name");
                self.emit_char('<');
                self.emit_eof();
            }
            Some(_) => {
                self.report_error("invalid-first-character-of-tag-name");
                self.emit_char('<');
                self.reconsume_in(TokenizerState::Data);
            }
        }
    }

    /// [§ 13.2.5.7 End tag open state](https://html.spec.whatwg.org/multipage/parsing.html#end-tag-open-state)
    fn on_end_tag_open(&mut self) {
        match self.current_char {
            Some(c) if c.is_ascii_alphabetic() => {
                self.building = Some(Token::end_tag());
                self.reconsume_in(TokenizerState::TagName);
            }
            // "U+003E GREATER-THAN SIGN (>) - missing-end-tag-name parse error.
            // Switch to the data state."
            Some('>') => {
                self.report_error("missing-end-tag-name");
                self.switch_to(TokenizerState::Data);
            }
            None => {
                self.report_error("eof-before-tag-name");
                self.emit_char('<');
                self.emit_char('/');
                self.emit_eof();
            }
            Some(_) => {
                self.report_error("invalid-first-character-of-tag-name");
                self.building = Some(Token::empty_comment());
                self.reconsume_in(TokenizerState::BogusComment);
            }
        }
    }

    /// [§ 13.2.5.8 Tag name state](https://html.spec.whatwg.org/multipage/parsing.html#tag-name-state)
    fn on_tag_name(&mut self) {
        match self.current_char {
            Some('\t' | '\n' | '\x0C' | ' ') => {
                self.switch_to(TokenizerState::BeforeAttributeName);
            }
            Some('/') => self.switch_to(TokenizerState::SelfClosingStartTag),
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            None => {
                self.report_error("eof-in-tag");
                self.emit_eof();
            }
            Some(c) => {
                let c = if c == '\0' { '\u{FFFD}' } else { c.to_ascii_lowercase() };
                if let Some(token) = self.building.as_mut() {
                    token.push_tag_name(c);
                }
            }
        }
    }

    /// [§ 13.2.5.32 Before attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-name-state)
    fn on_before_attribute_name(&mut self) {
        match self.current_char {
            Some('\t' | '\n' | '\x0C' | ' ') => {}
            Some('/' | '>') | None => self.reconsume_in(TokenizerState::AfterAttributeName),
            // "U+003D EQUALS SIGN (=) - unexpected-equals-sign-before-attribute-name
            // parse error. Start a new attribute... Set that attribute's name to
            // the current input character."
            Some('=') => {
                self.report_error("unexpected-equals-sign-before-attribute-name");
                if let Some(token) = self.building.as_mut() {
                    token.begin_attribute();
                    token.push_attr_name('=');
                }
                self.switch_to(TokenizerState::AttributeName);
            }
            Some(_) => {
                if let Some(token) = self.building.as_mut() {
                    token.begin_attribute();
                }
                self.reconsume_in(TokenizerState::AttributeName);
            }
        }
    }

    /// [§ 13.2.5.33 Attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-name-state)
    fn on_attribute_name(&mut self) {
        match self.current_char {
            Some('\t' | '\n' | '\x0C' | ' ' | '/' | '>') | None => {
                self.reconsume_in(TokenizerState::AfterAttributeName);
            }
            Some('=') => self.switch_to(TokenizerState::BeforeAttributeValue),
            Some(c) => {
                if matches!(c, '"' | '\'' | '<') {
                    self.report_error("unexpected-character-in-attribute-name");
                }
                let c = if c == '\0' { '\u{FFFD}' } else { c.to_ascii_lowercase() };
                if let Some(token) = self.building.as_mut() {
                    token.push_attr_name(c);
                }
            }
        }
    }

    /// [§ 13.2.5.34 After attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#after-attribute-name-state)
    fn on_after_attribute_name(&mut self) {
        match self.current_char {
            Some('\t' | '\n' | '\x0C' | ' ') => {}
            Some('/') => self.switch_to(TokenizerState::SelfClosingStartTag),
            Some('=') => self.switch_to(TokenizerState::BeforeAttributeValue),
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            None => {
                self.report_error("eof-in-tag");
                self.emit_eof();
            }
            Some(_) => {
                if let Some(token) = self.building.as_mut() {
                    token.begin_attribute();
                }
                self.reconsume_in(TokenizerState::AttributeName);
            }
        }
    }

    /// [§ 13.2.5.35 Before attribute value state](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-value-state)
    fn on_before_attribute_value(&mut self) {
        match self.current_char {
            Some('\t' | '\n' | '\x0C' | ' ') => {}
            Some('"') => self.switch_to(TokenizerState::AttributeValueDoubleQuoted),
            Some('\'') => self.switch_to(TokenizerState::AttributeValueSingleQuoted),
            Some('>') => {
                self.report_error("missing-attribute-value");
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            _ => self.reconsume_in(TokenizerState::AttributeValueUnquoted),
        }
    }

    /// [§ 13.2.5.36](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(double-quoted)-state)
    /// and [§ 13.2.5.37](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(single-quoted)-state)
    fn on_attribute_value_quoted(&mut self, quote: char) {
        match self.current_char {
            Some(c) if c == quote => self.switch_to(TokenizerState::AfterAttributeValueQuoted),
            Some('&') => self.consume_character_reference(true),
            None => {
                self.report_error("eof-in-tag");
                self.emit_eof();
            }
            Some(c) => self.push_attr_value_char(c),
        }
    }

    /// [§ 13.2.5.38 Attribute value (unquoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(unquoted)-state)
    fn on_attribute_value_unquoted(&mut self) {
        match self.current_char {
            Some('\t' | '\n' | '\x0C' | ' ') => {
                self.switch_to(TokenizerState::BeforeAttributeName);
            }
            Some('&') => self.consume_character_reference(true),
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            None => {
                self.report_error("eof-in-tag");
                self.emit_eof();
            }
            Some(c) => {
                if matches!(c, '"' | '\'' | '<' | '=' | '`') {
                    self.report_error("unexpected-character-in-unquoted-attribute-value");
                }
                self.push_attr_value_char(c);
            }
        }
    }

    /// [§ 13.2.5.39 After attribute value (quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#after-attribute-value-(quoted)-state)
    fn on_after_attribute_value_quoted(&mut self) {
        match self.current_char {
            Some('\t' | '\n' | '\x0C' | ' ') => {
                self.switch_to(TokenizerState::BeforeAttributeName);
            }
            Some('/') => self.switch_to(TokenizerState::SelfClosingStartTag),
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            None => {
                self.report_error("eof-in-tag");
                self.emit_eof();
            }
            Some(_) => {
                self.report_error("missing-whitespace-between-attributes");
                self.reconsume_in(TokenizerState::BeforeAttributeName);
            }
        }
    }

    /// [§ 13.2.5.40 Self-closing start tag state](https://html.spec.whatwg.org/multipage/parsing.html#self-closing-start-tag-state)
    fn on_self_closing_start_tag(&mut self) {
        match self.current_char {
            Some('>') => {
                if let Some(token) = self.building.as_mut() {
                    token.set_self_closing();
                }
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            None => {
                self.report_error("eof-in-tag");
                self.emit_eof();
            }
            Some(_) => {
                self.report_error("unexpected-solidus-in-tag");
                self.reconsume_in(TokenizerState::BeforeAttributeName);
            }
        }
    }

    /// [§ 13.2.5.41 Bogus comment state](https://html.spec.whatwg.org/multipage/parsing.html#bogus-comment-state)
    fn on_bogus_comment(&mut self) {
        match self.current_char {
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            None => {
                self.emit_token();
                self.emit_eof();
            }
            Some(c) => {
                let c = if c == '\0' { '\u{FFFD}' } else { c };
                if let Some(token) = self.building.as_mut() {
                    token.push_comment(c);
                }
            }
        }
    }

    /// [§ 13.2.5.42 Markup declaration open state](https://html.spec.whatwg.org/multipage/parsing.html#markup-declaration-open-state)
    ///
    /// This state looks ahead from the character after `!`, so it runs with
    /// the current input character already consumed and steps back first.
    fn on_markup_declaration_open(&mut self) {
        self.unconsume();
        // "If the next few characters are: Two U+002D HYPHEN-MINUS characters (-)"
        if self.lookahead_is("--") {
            self.consume_string("--");
            self.building = Some(Token::empty_comment());
            self.switch_to(TokenizerState::CommentStart);
        // "ASCII case-insensitive match for the word "DOCTYPE""
        } else if self.lookahead_is_ignore_case("DOCTYPE") {
            self.consume_string("DOCTYPE");
            self.switch_to(TokenizerState::DOCTYPE);
        } else {
            // "incorrectly-opened-comment parse error. Create a comment token
            // whose data is the empty string. Switch to the bogus comment state."
            self.report_error("incorrectly-opened-comment");
            self.building = Some(Token::empty_comment());
            self.switch_to(TokenizerState::BogusComment);
        }
    }

    /// [§ 13.2.5.43 Comment start state](https://html.spec.whatwg.org/multipage/parsing.html#comment-start-state)
    fn on_comment_start(&mut self) {
        match self.current_char {
            Some('-') => self.switch_to(TokenizerState::CommentStartDash),
            Some('>') => {
                self.report_error("abrupt-closing-of-empty-comment");
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            _ => self.reconsume_in(TokenizerState::Comment),
        }
    }

    /// [§ 13.2.5.44 Comment start dash state](https://html.spec.whatwg.org/multipage/parsing.html#comment-start-dash-state)
    fn on_comment_start_dash(&mut self) {
        match self.current_char {
            Some('-') => self.switch_to(TokenizerState::CommentEnd),
            Some('>') => {
                self.report_error("abrupt-closing-of-empty-comment");
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            None => {
                self.report_error("eof-in-comment");
                self.emit_token();
                self.emit_eof();
            }
            Some(_) => {
                if let Some(token) = self.building.as_mut() {
                    token.push_comment('-');
                }
                self.reconsume_in(TokenizerState::Comment);
            }
        }
    }

    /// [§ 13.2.5.45 Comment state](https://html.spec.whatwg.org/multipage/parsing.html#comment-state)
    ///
    /// NOTE: The nested `<!--` detection states (§ 13.2.5.46-49) only report
    /// parse errors, so they are folded into this state.
    fn on_comment(&mut self) {
        match self.current_char {
            Some('-') => self.switch_to(TokenizerState::CommentEndDash),
            None => {
                self.report_error("eof-in-comment");
                self.emit_token();
                self.emit_eof();
            }
            Some(c) => {
                let c = if c == '\0' { '\u{FFFD}' } else { c };
                if let Some(token) = self.building.as_mut() {
                    token.push_comment(c);
                }
            }
        }
    }

    /// [§ 13.2.5.50 Comment end dash state](https://html.spec.whatwg.org/multipage/parsing.html#comment-end-dash-state)
    fn on_comment_end_dash(&mut self) {
        match self.current_char {
            Some('-') => self.switch_to(TokenizerState::CommentEnd),
            None => {
                self.report_error("eof-in-comment");
                self.emit_token();
                self.emit_eof();
            }
            Some(_) => {
                if let Some(token) = self.building.as_mut() {
                    token.push_comment('-');
                }
                self.reconsume_in(TokenizerState::Comment);
            }
        }
    }

    /// [§ 13.2.5.51 Comment end state](https://html.spec.whatwg.org/multipage/parsing.html#comment-end-state)
    fn on_comment_end(&mut self) {
        match self.current_char {
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            // "U+002D HYPHEN-MINUS (-) - Append a U+002D HYPHEN-MINUS character
            // (-) to the comment token's data."
            Some('-') => {
                if let Some(token) = self.building.as_mut() {
                    token.push_comment('-');
                }
            }
            None => {
                self.report_error("eof-in-comment");
                self.emit_token();
                self.emit_eof();
            }
            Some(_) => {
                if let Some(token) = self.building.as_mut() {
                    token.push_comment_str("--");
                }
                self.reconsume_in(TokenizerState::Comment);
            }
        }
    }

    /// [§ 13.2.5.53 DOCTYPE state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-state)
    fn on_doctype(&mut self) {
        match self.current_char {
            Some('\t' | '\n' | '\x0C' | ' ') => {
                self.switch_to(TokenizerState::BeforeDOCTYPEName);
            }
            None => {
                self.report_error("eof-in-doctype");
                self.building = Some(Token::Doctype { name: None });
                self.emit_token();
                self.emit_eof();
            }
            Some(_) => {
                self.report_error("missing-whitespace-before-doctype-name");
                self.reconsume_in(TokenizerState::BeforeDOCTYPEName);
            }
        }
    }

    /// [§ 13.2.5.54 Before DOCTYPE name state](https://html.spec.whatwg.org/multipage/parsing.html#before-doctype-name-state)
    fn on_before_doctype_name(&mut self) {
        match self.current_char {
            Some('\t' | '\n' | '\x0C' | ' ') => {}
            Some('>') => {
                self.report_error("missing-doctype-name");
                self.building = Some(Token::Doctype { name: None });
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            None => {
                self.report_error("eof-in-doctype");
                self.building = Some(Token::Doctype { name: None });
                self.emit_token();
                self.emit_eof();
            }
            Some(c) => {
                let mut token = Token::Doctype { name: None };
                token.push_doctype_name(c.to_ascii_lowercase());
                self.building = Some(token);
                self.switch_to(TokenizerState::DOCTYPEName);
            }
        }
    }

    /// [§ 13.2.5.55 DOCTYPE name state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-name-state)
    fn on_doctype_name(&mut self) {
        match self.current_char {
            Some('\t' | '\n' | '\x0C' | ' ') => self.switch_to(TokenizerState::BogusDOCTYPE),
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            None => {
                self.report_error("eof-in-doctype");
                self.emit_token();
                self.emit_eof();
            }
            Some(c) => {
                if let Some(token) = self.building.as_mut() {
                    token.push_doctype_name(c.to_ascii_lowercase());
                }
            }
        }
    }

    /// [§ 13.2.5.68 Bogus DOCTYPE state](https://html.spec.whatwg.org/multipage/parsing.html#bogus-doctype-state)
    fn on_bogus_doctype(&mut self) {
        match self.current_char {
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            None => {
                self.emit_token();
                self.emit_eof();
            }
            Some(_) => {}
        }
    }

    /// Run the tokenizer to completion.
    ///
    /// Processes the input and populates the token stream. The stream always
    /// ends with exactly one [`Token::EndOfFile`].
    pub fn run(&mut self) {
        while !self.at_eof {
            // Each state begins by consuming the next input character,
            // unless we're reconsuming from a previous state transition.
            if self.reconsume {
                self.reconsume = false;
            } else {
                self.current_char = self.consume();
            }

            match self.state {
                TokenizerState::Data => self.on_data(),
                TokenizerState::RCDATA => self.on_rcdata(),
                TokenizerState::RAWTEXT => self.on_rawtext(),
                TokenizerState::TagOpen => self.on_tag_open(),
                TokenizerState::EndTagOpen => self.on_end_tag_open(),
                TokenizerState::TagName => self.on_tag_name(),
                TokenizerState::RCDATALessThanSign => self.on_text_less_than_sign(
                    TokenizerState::RCDATAEndTagOpen,
                    TokenizerState::RCDATA,
                ),
                TokenizerState::RCDATAEndTagOpen => self.on_text_end_tag_open(
                    TokenizerState::RCDATAEndTagName,
                    TokenizerState::RCDATA,
                ),
                TokenizerState::RCDATAEndTagName => {
                    self.on_text_end_tag_name(TokenizerState::RCDATA);
                }
                TokenizerState::RAWTEXTLessThanSign => self.on_text_less_than_sign(
                    TokenizerState::RAWTEXTEndTagOpen,
                    TokenizerState::RAWTEXT,
                ),
                TokenizerState::RAWTEXTEndTagOpen => self.on_text_end_tag_open(
                    TokenizerState::RAWTEXTEndTagName,
                    TokenizerState::RAWTEXT,
                ),
                TokenizerState::RAWTEXTEndTagName => {
                    self.on_text_end_tag_name(TokenizerState::RAWTEXT);
                }
                TokenizerState::BeforeAttributeName => self.on_before_attribute_name(),
                TokenizerState::AttributeName => self.on_attribute_name(),
                TokenizerState::AfterAttributeName => self.on_after_attribute_name(),
                TokenizerState::BeforeAttributeValue => self.on_before_attribute_value(),
                TokenizerState::AttributeValueDoubleQuoted => {
                    self.on_attribute_value_quoted('"');
                }
                TokenizerState::AttributeValueSingleQuoted => {
                    self.on_attribute_value_quoted('\'');
                }
                TokenizerState::AttributeValueUnquoted => {
                    self.on_attribute_value_unquoted();
                }
                TokenizerState::AfterAttributeValueQuoted => {
                    self.on_after_attribute_value_quoted();
                }
                TokenizerState::SelfClosingStartTag => self.on_self_closing_start_tag(),
                TokenizerState::BogusComment => self.on_bogus_comment(),
                TokenizerState::MarkupDeclarationOpen => {
                    self.on_markup_declaration_open();
                }
                TokenizerState::CommentStart => self.on_comment_start(),
                TokenizerState::CommentStartDash => self.on_comment_start_dash(),
                TokenizerState::Comment => self.on_comment(),
                TokenizerState::CommentEndDash => self.on_comment_end_dash(),
                TokenizerState::CommentEnd => self.on_comment_end(),
                TokenizerState::DOCTYPE => self.on_doctype(),
                TokenizerState::BeforeDOCTYPEName => self.on_before_doctype_name(),
                TokenizerState::DOCTYPEName => self.on_doctype_name(),
                TokenizerState::BogusDOCTYPE => self.on_bogus_doctype(),
            }
        }
    }
}
