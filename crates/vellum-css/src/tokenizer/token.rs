//! CSS Token types per [§ 4 Tokenization](https://www.w3.org/TR/css-syntax-3/#tokenization).
//!
//! Numeric tokens keep the exact text they were lexed from so that values
//! copied into an inline `style` attribute read the way the author wrote them
//! (`0.50em` stays `0.50em`, not `0.5em`).

use core::fmt;

/// [§ 4 Tokenization](https://www.w3.org/TR/css-syntax-3/#tokenization)
///
/// "<hash-token>s have a type flag set to either "id" or "unrestricted"."
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashType {
    /// The hash value would start an ident sequence.
    Id,
    /// Any other hash value.
    Unrestricted,
}

/// [§ 4 Tokenization](https://www.w3.org/TR/css-syntax-3/#tokenization)
///
/// "<number-token>, <percentage-token>, and <dimension-token> have a numeric
/// value, and an optional sign character set to either "+" or "-" ...
/// <number-token> and <dimension-token> additionally have a type flag set to
/// either "integer" or "number"."
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericType {
    /// No fractional part or exponent.
    Integer,
    /// Fractional part or exponent present.
    Number,
}

/// A CSS token.
#[derive(Debug, Clone, PartialEq)]
pub enum CssToken {
    /// `<ident-token>`
    Ident(String),
    /// `<function-token>`; the value is the name without the `(`.
    Function(String),
    /// `<at-keyword-token>`; the value is the name without the `@`.
    AtKeyword(String),
    /// `<hash-token>`
    Hash {
        /// Name after the `#`.
        value: String,
        /// Type flag.
        hash_type: HashType,
    },
    /// `<string-token>` with escapes resolved.
    String(String),
    /// `<bad-string-token>`
    BadString,
    /// `<url-token>` for an unquoted `url(...)`.
    Url(String),
    /// `<bad-url-token>`
    BadUrl,
    /// `<delim-token>`
    Delim(char),
    /// `<number-token>`
    Number {
        /// Numeric value.
        value: f64,
        /// Source text, sign included.
        repr: String,
        /// Type flag.
        kind: NumericType,
    },
    /// `<percentage-token>`
    Percentage {
        /// Numeric value.
        value: f64,
        /// Source text without the `%`.
        repr: String,
    },
    /// `<dimension-token>`
    Dimension {
        /// Numeric value.
        value: f64,
        /// Source text of the number part.
        repr: String,
        /// Type flag.
        kind: NumericType,
        /// Unit as written.
        unit: String,
    },
    /// `<whitespace-token>`
    Whitespace,
    /// `<CDO-token>` (`<!--`)
    CDO,
    /// `<CDC-token>` (`-->`)
    CDC,
    /// `<colon-token>`
    Colon,
    /// `<semicolon-token>`
    Semicolon,
    /// `<comma-token>`
    Comma,
    /// `<[-token>`
    LeftBracket,
    /// `<]-token>`
    RightBracket,
    /// `<(-token>`
    LeftParen,
    /// `<)-token>`
    RightParen,
    /// `<{-token>`
    LeftBrace,
    /// `<}-token>`
    RightBrace,
    /// `<EOF-token>`
    EOF,
}

impl CssToken {
    /// Convenience constructor for an ident token.
    #[must_use]
    pub fn ident(value: impl Into<String>) -> Self {
        Self::Ident(value.into())
    }

    /// Convenience constructor for a dimension token, e.g. `dimension("12", "px")`.
    #[must_use]
    pub fn dimension(repr: &str, unit: &str) -> Self {
        let kind = if repr.contains(['.', 'e', 'E']) {
            NumericType::Number
        } else {
            NumericType::Integer
        };
        Self::Dimension {
            value: repr.parse().unwrap_or(0.0),
            repr: repr.to_string(),
            kind,
            unit: unit.to_string(),
        }
    }

    /// Returns true for `<EOF-token>`.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self, Self::EOF)
    }

    /// Returns true for `<whitespace-token>`.
    #[must_use]
    pub const fn is_whitespace(&self) -> bool {
        matches!(self, Self::Whitespace)
    }
}

/// Serializes a token back to CSS source text.
///
/// [§ 9 Serialization](https://www.w3.org/TR/css-syntax-3/#serialization)
///
/// Comments were dropped during tokenization and are not reproduced.
impl fmt::Display for CssToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ident(v) => write!(f, "{v}"),
            Self::Function(name) => write!(f, "{name}("),
            Self::AtKeyword(name) => write!(f, "@{name}"),
            Self::Hash { value, .. } => write!(f, "#{value}"),
            Self::String(s) => {
                f.write_str("\"")?;
                for c in s.chars() {
                    match c {
                        '"' => f.write_str("\\\"")?,
                        '\\' => f.write_str("\\\\")?,
                        '\n' => f.write_str("\\a ")?,
                        c => write!(f, "{c}")?,
                    }
                }
                f.write_str("\"")
            }
            Self::Url(u) => write!(f, "url({u})"),
            Self::BadString | Self::BadUrl | Self::EOF => Ok(()),
            Self::Delim(c) => write!(f, "{c}"),
            Self::Number { repr, .. } => f.write_str(repr),
            Self::Percentage { repr, .. } => write!(f, "{repr}%"),
            Self::Dimension { repr, unit, .. } => write!(f, "{repr}{unit}"),
            Self::Whitespace => f.write_str(" "),
            Self::CDO => f.write_str("<!--"),
            Self::CDC => f.write_str("-->"),
            Self::Colon => f.write_str(":"),
            Self::Semicolon => f.write_str(";"),
            Self::Comma => f.write_str(","),
            Self::LeftBracket => f.write_str("["),
            Self::RightBracket => f.write_str("]"),
            Self::LeftParen => f.write_str("("),
            Self::RightParen => f.write_str(")"),
            Self::LeftBrace => f.write_str("{"),
            Self::RightBrace => f.write_str("}"),
        }
    }
}
