//! Helper functions for the HTML tokenizer.
//!
//! [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
//!
//! State transitions ("Switch to", "Reconsume in"), input handling and
//! token emission shared by the state handlers.

use vellum_common::warning::warn_once;

use super::token::Token;
use super::tokenizer::{Tokenizer, TokenizerState};

// =============================================================================
// State Transition Helpers
// =============================================================================

impl Tokenizer {
    pub(super) const fn switch_to(&mut self, new_state: TokenizerState) {
        self.state = new_state;
    }

    pub(super) const fn reconsume_in(&mut self, new_state: TokenizerState) {
        self.reconsume = true;
        self.state = new_state;
    }
}

// =============================================================================
// Input/Character Helpers
// =============================================================================

impl Tokenizer {
    /// "Consume the next input character"
    ///
    /// [§ 13.2.3.5 Preprocessing the input stream](https://html.spec.whatwg.org/multipage/parsing.html#preprocessing-the-input-stream):
    /// CR and CRLF are normalized to LF.
    pub(super) fn consume(&mut self) -> Option<char> {
        let c = self.input[self.current_pos..].chars().next()?;
        self.current_pos += c.len_utf8();
        if c == '\r' {
            if self.input[self.current_pos..].starts_with('\n') {
                self.current_pos += 1;
            }
            return Some('\n');
        }
        Some(c)
    }

    /// Step back over the current input character so look-ahead states can
    /// inspect it again.
    pub(super) fn unconsume(&mut self) {
        if let Some(c) = self.current_char {
            self.current_pos -= c.len_utf8();
        }
    }

    pub(super) fn rest(&self) -> &str {
        &self.input[self.current_pos..]
    }

    pub(super) fn lookahead_is(&self, target: &str) -> bool {
        self.rest().starts_with(target)
    }

    pub(super) fn lookahead_is_ignore_case(&self, target: &str) -> bool {
        self.rest()
            .get(..target.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(target))
    }

    /// Advance past an ASCII look-ahead match.
    pub(super) const fn consume_string(&mut self, target: &str) {
        self.current_pos += target.len();
    }
}

// =============================================================================
// Token Emission Helpers
// =============================================================================

impl Tokenizer {
    /// "Emit the current token"
    pub(super) fn emit_token(&mut self) {
        let Some(mut token) = self.building.take() else {
            return;
        };
        if token.remove_duplicate_attributes() > 0 {
            self.report_error("duplicate-attribute");
        }
        if let Token::StartTag { ref name, .. } = token {
            self.last_start_tag = Some(name.clone());

            // NOTE: The tree builder switches the tokenizer state for raw text
            // and RCDATA elements. The tokenizer runs ahead of the tree builder,
            // so the switch happens here.
            match name.as_str() {
                // [§ 13.2.6.2 generic RCDATA element parsing algorithm](https://html.spec.whatwg.org/multipage/parsing.html#generic-rcdata-element-parsing-algorithm)
                "title" | "textarea" => self.switch_to(TokenizerState::RCDATA),
                // [§ 13.2.6.2 generic raw text element parsing algorithm](https://html.spec.whatwg.org/multipage/parsing.html#generic-raw-text-element-parsing-algorithm)
                // NOTE: script is tokenized as RAWTEXT; script data escapes
                // are not implemented.
                "style" | "xmp" | "iframe" | "noembed" | "noframes" | "script" => {
                    self.switch_to(TokenizerState::RAWTEXT);
                }
                _ => {}
            }
        }
        self.tokens.push(token);
    }

    pub(super) fn emit_char(&mut self, c: char) {
        self.tokens.push(Token::Character { data: c });
    }

    pub(super) fn emit_eof(&mut self) {
        if !self.at_eof {
            self.tokens.push(Token::EndOfFile);
            self.at_eof = true;
        }
    }

    pub(super) fn push_attr_value_char(&mut self, c: char) {
        let c = if c == '\0' {
            self.report_error("unexpected-null-character");
            '\u{FFFD}'
        } else {
            c
        };
        if let Some(token) = self.building.as_mut() {
            let mut buf = [0; 4];
            token.push_attr_value(c.encode_utf8(&mut buf));
        }
    }
}

// =============================================================================
// RCDATA/RAWTEXT Helpers
// =============================================================================

impl Tokenizer {
    /// "An appropriate end tag token is an end tag token whose tag name matches
    /// the tag name of the last start tag to have been emitted from this
    /// tokenizer, if any."
    pub(super) fn is_appropriate_end_tag(&self) -> bool {
        matches!(
            (&self.last_start_tag, &self.building),
            (Some(last), Some(Token::EndTag { name })) if name == last
        )
    }

    /// "Anything else" branch of the RCDATA and RAWTEXT end tag name states.
    pub(super) fn flush_text_end_tag(&mut self, text: TokenizerState) {
        // STEP 1: "Emit a U+003C LESS-THAN SIGN character token, a U+002F
        // SOLIDUS character token, and a character token for each of the
        // characters in the temporary buffer"
        self.emit_char('<');
        self.emit_char('/');
        let buffer = std::mem::take(&mut self.scratch);
        for c in buffer.chars() {
            self.emit_char(c);
        }
        // STEP 2: Discard the end tag token under construction.
        self.building = None;
        // STEP 3: "Reconsume in the ... state"
        self.reconsume_in(text);
    }
}

// =============================================================================
// Error Handling
// =============================================================================

impl Tokenizer {
    /// [§ 13.2.2 Parse errors](https://html.spec.whatwg.org/multipage/parsing.html#parse-errors)
    ///
    /// Parse errors are not fatal; the tokenizer recovers and continues.
    pub(super) fn report_error(&mut self, code: &str) {
        self.parse_errors += 1;
        warn_once("html-tokenizer", &format!("parse error: {code}"));
    }
}
