//! HTML tokenizer module.
//!
//! Implements the subset of [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
//! needed to read exported documents.

/// Character reference resolution per § 13.2.5.72.
mod character_reference;
/// State transition and emission helpers.
mod helpers;
/// Token types produced by the tokenizer.
pub mod token;
/// Tokenizer state machine.
#[allow(clippy::module_inception)]
mod tokenizer;

pub use token::{Attribute, Token};
pub use tokenizer::{Tokenizer, TokenizerState};
