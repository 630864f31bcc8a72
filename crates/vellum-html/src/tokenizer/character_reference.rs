//! Character reference resolution.
//!
//! [§ 13.2.5.72 Character reference state](https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state)
//!
//! The named, numeric and ambiguous-ampersand states are collapsed into one
//! look-ahead routine that runs right after the `&` is consumed.

use super::tokenizer::Tokenizer;

/// A subset of [§ 13.5 Named character references](https://html.spec.whatwg.org/multipage/named-characters.html).
///
/// Entries without a trailing semicolon are legacy forms that also match
/// without one.
const NAMED_ENTITIES: &[(&str, &str)] = &[
    ("amp;", "&"),
    ("amp", "&"),
    ("lt;", "<"),
    ("lt", "<"),
    ("gt;", ">"),
    ("gt", ">"),
    ("quot;", "\""),
    ("quot", "\""),
    ("apos;", "'"),
    ("nbsp;", "\u{00A0}"),
    ("nbsp", "\u{00A0}"),
    ("copy;", "\u{00A9}"),
    ("copy", "\u{00A9}"),
    ("reg;", "\u{00AE}"),
    ("reg", "\u{00AE}"),
    ("trade;", "\u{2122}"),
    ("mdash;", "\u{2014}"),
    ("ndash;", "\u{2013}"),
    ("hellip;", "\u{2026}"),
    ("bull;", "\u{2022}"),
    ("middot;", "\u{00B7}"),
    ("lsquo;", "\u{2018}"),
    ("rsquo;", "\u{2019}"),
    ("ldquo;", "\u{201C}"),
    ("rdquo;", "\u{201D}"),
    ("laquo;", "\u{00AB}"),
    ("raquo;", "\u{00BB}"),
    ("deg;", "\u{00B0}"),
    ("times;", "\u{00D7}"),
    ("divide;", "\u{00F7}"),
    ("euro;", "\u{20AC}"),
    ("pound;", "\u{00A3}"),
    ("yen;", "\u{00A5}"),
    ("cent;", "\u{00A2}"),
    ("sect;", "\u{00A7}"),
    ("para;", "\u{00B6}"),
    ("shy;", "\u{00AD}"),
    ("ensp;", "\u{2002}"),
    ("emsp;", "\u{2003}"),
    ("thinsp;", "\u{2009}"),
    ("zwnj;", "\u{200C}"),
    ("zwj;", "\u{200D}"),
    ("larr;", "\u{2190}"),
    ("rarr;", "\u{2192}"),
    ("uarr;", "\u{2191}"),
    ("darr;", "\u{2193}"),
    ("hearts;", "\u{2665}"),
    ("check;", "\u{2713}"),
];

/// [§ 13.2.5.80 Numeric character reference end state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-end-state)
///
/// "If the number is one of the numbers in the first column of the following
/// table, then find the row with that number in the first column, and set the
/// character reference code to the number in the second column."
const C1_REPLACEMENTS: &[(u32, char)] = &[
    (0x80, '\u{20AC}'),
    (0x82, '\u{201A}'),
    (0x84, '\u{201E}'),
    (0x85, '\u{2026}'),
    (0x8B, '\u{2039}'),
    (0x91, '\u{2018}'),
    (0x92, '\u{2019}'),
    (0x93, '\u{201C}'),
    (0x94, '\u{201D}'),
    (0x95, '\u{2022}'),
    (0x96, '\u{2013}'),
    (0x97, '\u{2014}'),
    (0x99, '\u{2122}'),
    (0x9B, '\u{203A}'),
];

/// Longest entry of the named table that prefixes `input`.
fn longest_named_match(input: &str) -> Option<(&'static str, &'static str)> {
    NAMED_ENTITIES
        .iter()
        .filter(|(name, _)| input.starts_with(name))
        .max_by_key(|(name, _)| name.len())
        .copied()
}

fn numeric_reference_char(code: u32) -> char {
    if code == 0 || code > 0x10_FFFF {
        return '\u{FFFD}';
    }
    if let Some(&(_, c)) = C1_REPLACEMENTS.iter().find(|(from, _)| *from == code) {
        return c;
    }
    char::from_u32(code).unwrap_or('\u{FFFD}')
}

impl Tokenizer {
    /// Resolve the character reference starting after the current `&`.
    ///
    /// "If the character reference was consumed as part of an attribute, then
    /// append each character to the current attribute's value. Otherwise, emit
    /// each character as a character token."
    pub(super) fn consume_character_reference(&mut self, in_attribute: bool) {
        let resolved = if self.lookahead_is("#") {
            self.consume_numeric_reference()
        } else {
            self.consume_named_reference(in_attribute)
        };
        let text = resolved.unwrap_or_else(|| "&".to_string());
        if in_attribute {
            if let Some(token) = self.building.as_mut() {
                token.push_attr_value(&text);
            }
        } else {
            for c in text.chars() {
                self.emit_char(c);
            }
        }
    }

    /// [§ 13.2.5.75 Numeric character reference state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-state)
    fn consume_numeric_reference(&mut self) -> Option<String> {
        let rest = &self.rest()[1..];
        let (radix, prefix_len) = if rest.starts_with(['x', 'X']) {
            (16, 2)
        } else {
            (10, 1)
        };
        let digits: String = self.rest()[prefix_len..]
            .chars()
            .take_while(|c| c.is_digit(radix))
            .collect();
        if digits.is_empty() {
            // "absence-of-digits-in-numeric-character-reference parse error.
            // Flush code points consumed as a character reference."
            self.report_error("absence-of-digits-in-numeric-character-reference");
            return None;
        }
        self.current_pos += prefix_len + digits.len();
        if self.lookahead_is(";") {
            self.current_pos += 1;
        } else {
            self.report_error("missing-semicolon-after-character-reference");
        }
        let code = digits.chars().fold(0u32, |acc, c| {
            acc.saturating_mul(radix)
                .saturating_add(c.to_digit(radix).unwrap_or(0))
        });
        Some(numeric_reference_char(code).to_string())
    }

    /// [§ 13.2.5.73 Named character reference state](https://html.spec.whatwg.org/multipage/parsing.html#named-character-reference-state)
    fn consume_named_reference(&mut self, in_attribute: bool) -> Option<String> {
        let (name, value) = longest_named_match(self.rest())?;
        // "If the character reference was consumed as part of an attribute, and
        // the last character matched is not a U+003B SEMICOLON character (;),
        // and the next input character is either a U+003D EQUALS SIGN character
        // (=) or an ASCII alphanumeric, then, for historical reasons, flush code
        // points consumed as a character reference"
        if !name.ends_with(';') {
            let next = self.rest()[name.len()..].chars().next();
            if in_attribute && next.is_some_and(|c| c == '=' || c.is_ascii_alphanumeric()) {
                return None;
            }
            self.report_error("missing-semicolon-after-character-reference");
        }
        self.current_pos += name.len();
        Some(value.to_string())
    }
}
