use super::token::{CssToken, HashType, NumericType};

/// [§ 4.3 Tokenizer Algorithms](https://www.w3.org/TR/css-syntax-3/#tokenizer-algorithms)
///
/// Tokenizer for stylesheets and `style` attribute values.
pub struct CssTokenizer {
    input: Vec<char>,
    position: usize,
    tokens: Vec<CssToken>,
}

impl CssTokenizer {
    /// Create a tokenizer over `input`.
    ///
    /// [§ 3.3 Preprocessing the input stream](https://www.w3.org/TR/css-syntax-3/#input-preprocessing)
    /// "Replace any U+000D CARRIAGE RETURN (CR) code points, U+000C FORM FEED (FF)
    /// code points, or pairs of U+000D CARRIAGE RETURN (CR) followed by U+000A
    /// LINE FEED (LF) in input by a single U+000A LINE FEED (LF) code point."
    pub fn new(input: impl Into<String>) -> Self {
        let raw: String = input.into();
        let normalized = raw.replace("\r\n", "\n").replace(['\r', '\x0C'], "\n");
        Self {
            input: normalized
                .chars()
                .map(|c| if c == '\0' { '\u{FFFD}' } else { c })
                .collect(),
            position: 0,
            tokens: Vec::new(),
        }
    }

    /// Tokenize the whole input. The last token is always [`CssToken::EOF`].
    pub fn run(&mut self) {
        loop {
            let token = self.next_token();
            let is_eof = token.is_eof();
            self.tokens.push(token);
            if is_eof {
                break;
            }
        }
    }

    /// Return the collected tokens.
    #[must_use]
    pub fn into_tokens(self) -> Vec<CssToken> {
        self.tokens
    }

    /// [§ 4.3.1 Consume a token](https://www.w3.org/TR/css-syntax-3/#consume-token)
    fn next_token(&mut self) -> CssToken {
        self.skip_comments();

        let Some(c) = self.consume() else {
            return CssToken::EOF;
        };

        match c {
            c if is_whitespace(c) => {
                self.skip_whitespace();
                CssToken::Whitespace
            }
            '"' | '\'' => self.consume_string_token(c),
            '#' => {
                // "If the next input code point is an ident code point or the next
                // two input code points are a valid escape..."
                if self.peek().is_some_and(is_name_char)
                    || is_valid_escape(self.peek(), self.lookahead(1))
                {
                    let hash_type = if self.would_start_ident_sequence(0) {
                        HashType::Id
                    } else {
                        HashType::Unrestricted
                    };
                    let value = self.ident_sequence();
                    CssToken::Hash { value, hash_type }
                } else {
                    CssToken::Delim('#')
                }
            }
            '(' => CssToken::LeftParen,
            ')' => CssToken::RightParen,
            '+' | '.' => {
                self.reconsume();
                if self.starts_number() {
                    self.numeric_token()
                } else {
                    let _ = self.consume();
                    CssToken::Delim(c)
                }
            }
            ',' => CssToken::Comma,
            '-' => {
                self.reconsume();
                if self.starts_number() {
                    self.numeric_token()
                } else if self.lookahead(1) == Some('-') && self.lookahead(2) == Some('>') {
                    self.position += 3;
                    CssToken::CDC
                } else if self.would_start_ident_sequence(0) {
                    self.ident_like_token()
                } else {
                    let _ = self.consume();
                    CssToken::Delim('-')
                }
            }
            ':' => CssToken::Colon,
            ';' => CssToken::Semicolon,
            '<' => {
                if self.starts_with("!--") {
                    self.position += 3;
                    CssToken::CDO
                } else {
                    CssToken::Delim('<')
                }
            }
            '@' => {
                if self.would_start_ident_sequence(0) {
                    CssToken::AtKeyword(self.ident_sequence())
                } else {
                    CssToken::Delim('@')
                }
            }
            '[' => CssToken::LeftBracket,
            ']' => CssToken::RightBracket,
            '{' => CssToken::LeftBrace,
            '}' => CssToken::RightBrace,
            '\\' => {
                if is_valid_escape(Some('\\'), self.peek()) {
                    self.reconsume();
                    self.ident_like_token()
                } else {
                    // "This is a parse error."
                    CssToken::Delim('\\')
                }
            }
            c if c.is_ascii_digit() => {
                self.reconsume();
                self.numeric_token()
            }
            c if is_name_start(c) => {
                self.reconsume();
                self.ident_like_token()
            }
            c => CssToken::Delim(c),
        }
    }

    /// [§ 4.3.2 Consume comments](https://www.w3.org/TR/css-syntax-3/#consume-comment)
    fn skip_comments(&mut self) {
        while self.starts_with("/*") {
            self.position += 2;
            loop {
                match self.consume() {
                    Some('*') if self.peek() == Some('/') => {
                        self.position += 1;
                        break;
                    }
                    Some(_) => {}
                    None => return,
                }
            }
        }
    }

    fn skip_whitespace(&mut self) {
        while self.consume_if(is_whitespace).is_some() {}
    }

    /// [§ 4.3.4 Consume a string token](https://www.w3.org/TR/css-syntax-3/#consume-string-token)
    fn consume_string_token(&mut self, ending: char) -> CssToken {
        let mut value = String::new();
        loop {
            match self.consume() {
                // EOF is a parse error but still returns the string.
                None => return CssToken::String(value),
                Some(c) if c == ending => return CssToken::String(value),
                Some('\n') => {
                    self.reconsume();
                    return CssToken::BadString;
                }
                Some('\\') => match self.peek() {
                    None => {}
                    Some('\n') => self.position += 1,
                    Some(_) => value.push(self.escaped_code_point()),
                },
                Some(c) => value.push(c),
            }
        }
    }

    /// [§ 4.3.3 Consume a numeric token](https://www.w3.org/TR/css-syntax-3/#consume-numeric-token)
    fn numeric_token(&mut self) -> CssToken {
        let (value, repr, kind) = self.consume_number();

        if self.would_start_ident_sequence(0) {
            let unit = self.ident_sequence();
            CssToken::Dimension {
                value,
                repr,
                kind,
                unit,
            }
        } else if self.consume_if(|c| c == '%').is_some() {
            CssToken::Percentage { value, repr }
        } else {
            CssToken::Number {
                value,
                repr,
                kind,
            }
        }
    }

    /// [§ 4.3.4 Consume an ident-like token](https://www.w3.org/TR/css-syntax-3/#consume-ident-like-token)
    fn ident_like_token(&mut self) -> CssToken {
        let string = self.ident_sequence();

        if string.eq_ignore_ascii_case("url") && self.peek() == Some('(') {
            self.position += 1;
            // "While the next two input code points are whitespace, consume the
            // next input code point."
            while self.peek().is_some_and(is_whitespace) && self.lookahead(1).is_some_and(is_whitespace)
            {
                self.position += 1;
            }
            let quoted = |c: Option<char>| matches!(c, Some('"' | '\''));
            if quoted(self.peek())
                || (self.peek().is_some_and(is_whitespace) && quoted(self.lookahead(1)))
            {
                CssToken::Function(string)
            } else {
                self.url_token()
            }
        } else if self.consume_if(|c| c == '(').is_some() {
            CssToken::Function(string)
        } else {
            CssToken::Ident(string)
        }
    }

    /// [§ 4.3.6 Consume a url token](https://www.w3.org/TR/css-syntax-3/#consume-url-token)
    fn url_token(&mut self) -> CssToken {
        let mut value = String::new();
        self.skip_whitespace();

        loop {
            match self.consume() {
                Some(')') | None => return CssToken::Url(value),
                Some(c) if is_whitespace(c) => {
                    self.skip_whitespace();
                    return match self.consume() {
                        Some(')') | None => CssToken::Url(value),
                        Some(_) => {
                            self.skip_bad_url();
                            CssToken::BadUrl
                        }
                    };
                }
                Some('"' | '\'' | '(') => {
                    self.skip_bad_url();
                    return CssToken::BadUrl;
                }
                Some('\\') => {
                    if is_valid_escape(Some('\\'), self.peek()) {
                        value.push(self.escaped_code_point());
                    } else {
                        self.skip_bad_url();
                        return CssToken::BadUrl;
                    }
                }
                Some(c) => value.push(c),
            }
        }
    }

    /// [§ 4.3.14 Consume the remnants of a bad url](https://www.w3.org/TR/css-syntax-3/#consume-remnants-of-bad-url)
    fn skip_bad_url(&mut self) {
        loop {
            match self.consume() {
                Some(')') | None => return,
                Some('\\') if is_valid_escape(Some('\\'), self.peek()) => {
                    let _ = self.escaped_code_point();
                }
                Some(_) => {}
            }
        }
    }

    /// [§ 4.3.11 Consume an ident sequence](https://www.w3.org/TR/css-syntax-3/#consume-name)
    fn ident_sequence(&mut self) -> String {
        let mut result = String::new();
        loop {
            match self.consume() {
                Some(c) if is_name_char(c) => result.push(c),
                Some('\\') if is_valid_escape(Some('\\'), self.peek()) => {
                    result.push(self.escaped_code_point());
                }
                Some(_) => {
                    self.reconsume();
                    return result;
                }
                None => return result,
            }
        }
    }

    /// [§ 4.3.12 Consume a number](https://www.w3.org/TR/css-syntax-3/#consume-number)
    fn consume_number(&mut self) -> (f64, String, NumericType) {
        let mut kind = NumericType::Integer;
        let mut repr = String::new();

        if let Some(sign) = self.consume_if(|c| c == '+' || c == '-') {
            repr.push(sign);
        }
        self.consume_digits(&mut repr);

        // STEP 4: fractional part.
        if self.peek() == Some('.') && self.lookahead(1).is_some_and(|c| c.is_ascii_digit()) {
            repr.push('.');
            self.position += 1;
            self.consume_digits(&mut repr);
            kind = NumericType::Number;
        }

        // STEP 5: exponent.
        if matches!(self.peek(), Some('e' | 'E')) {
            let signed = matches!(self.lookahead(1), Some('+' | '-'));
            let digit_offset = if signed { 2 } else { 1 };
            if self.lookahead(digit_offset).is_some_and(|c| c.is_ascii_digit()) {
                for _ in 0..digit_offset {
                    if let Some(c) = self.consume() {
                        repr.push(c);
                    }
                }
                self.consume_digits(&mut repr);
                kind = NumericType::Number;
            }
        }

        // "Convert repr to a number."
        let value = repr.parse().unwrap_or(0.0);
        (value, repr, kind)
    }

    fn consume_digits(&mut self, repr: &mut String) {
        while let Some(d) = self.consume_if(|c| c.is_ascii_digit()) {
            repr.push(d);
        }
    }

    /// [§ 4.3.7 Consume an escaped code point](https://www.w3.org/TR/css-syntax-3/#consume-escaped-code-point)
    fn escaped_code_point(&mut self) -> char {
        match self.consume() {
            Some(c) if c.is_ascii_hexdigit() => {
                let mut hex = String::from(c);
                // "Consume as many hex digits as possible, but no more than 5."
                while hex.len() < 6 {
                    match self.consume_if(|c| c.is_ascii_hexdigit()) {
                        Some(d) => hex.push(d),
                        None => break,
                    }
                }
                let _ = self.consume_if(is_whitespace);
                // "If this number is zero, or is for a surrogate, or is greater than
                // the maximum allowed code point, return U+FFFD."
                u32::from_str_radix(&hex, 16)
                    .ok()
                    .filter(|&cp| cp != 0)
                    .and_then(char::from_u32)
                    .unwrap_or('\u{FFFD}')
            }
            None => '\u{FFFD}',
            Some(c) => c,
        }
    }

    /// [§ 4.3.9 Check if three code points would start an ident sequence](https://www.w3.org/TR/css-syntax-3/#would-start-an-identifier)
    fn would_start_ident_sequence(&self, offset: usize) -> bool {
        match self.lookahead(offset) {
            Some('-') => {
                let second = self.lookahead(offset + 1);
                second.is_some_and(|c| is_name_start(c) || c == '-')
                    || is_valid_escape(second, self.lookahead(offset + 2))
            }
            Some('\\') => is_valid_escape(Some('\\'), self.lookahead(offset + 1)),
            Some(c) => is_name_start(c),
            None => false,
        }
    }

    /// [§ 4.3.10 Check if three code points would start a number](https://www.w3.org/TR/css-syntax-3/#starts-with-a-number)
    fn starts_number(&self) -> bool {
        let digit_at = |i: usize| self.lookahead(i).is_some_and(|c| c.is_ascii_digit());
        match self.peek() {
            Some('+' | '-') => digit_at(1) || (self.lookahead(1) == Some('.') && digit_at(2)),
            Some('.') => digit_at(1),
            Some(c) => c.is_ascii_digit(),
            None => false,
        }
    }

    fn starts_with(&self, pattern: &str) -> bool {
        pattern
            .chars()
            .enumerate()
            .all(|(i, c)| self.lookahead(i) == Some(c))
    }

    fn consume(&mut self) -> Option<char> {
        let c = self.input.get(self.position).copied()?;
        self.position += 1;
        Some(c)
    }

    fn consume_if(&mut self, predicate: impl Fn(char) -> bool) -> Option<char> {
        let c = self.peek().filter(|&c| predicate(c))?;
        self.position += 1;
        Some(c)
    }

    const fn reconsume(&mut self) {
        self.position = self.position.saturating_sub(1);
    }

    fn peek(&self) -> Option<char> {
        self.lookahead(0)
    }

    fn lookahead(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }
}

/// [§ 4.3.8 Check if two code points are a valid escape](https://www.w3.org/TR/css-syntax-3/#starts-with-a-valid-escape)
fn is_valid_escape(first: Option<char>, second: Option<char>) -> bool {
    first == Some('\\') && second != Some('\n')
}

/// [§ 4.2 Definitions - whitespace](https://www.w3.org/TR/css-syntax-3/#whitespace)
const fn is_whitespace(c: char) -> bool {
    matches!(c, '\n' | '\t' | ' ')
}

/// [§ 4.2 Definitions - ident-start code point](https://www.w3.org/TR/css-syntax-3/#ident-start-code-point)
///
/// "A letter, a non-ASCII code point, or U+005F LOW LINE (_)."
const fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

/// [§ 4.2 Definitions - ident code point](https://www.w3.org/TR/css-syntax-3/#ident-code-point)
const fn is_name_char(c: char) -> bool {
    is_name_start(c) || c.is_ascii_digit() || c == '-'
}
