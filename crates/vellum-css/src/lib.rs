//! CSS tokenizer, parser, selector matching and cascade inlining for the Vellum export engine.
//!
//! # Scope
//!
//! - **CSS Tokenizer** ([§ 4 Tokenization](https://www.w3.org/TR/css-syntax-3/#tokenization))
//!   - All token types; numeric tokens keep their source text
//!   - Comments and escapes
//! - **CSS Parser** ([§ 5 Parsing](https://www.w3.org/TR/css-syntax-3/#parsing))
//!   - Stylesheets, qualified rules, at-rules (kept unparsed)
//!   - Declaration lists with `!important`
//! - **Selectors** ([Selectors Level 4](https://www.w3.org/TR/selectors-4/))
//!   - Type, universal, class, ID and attribute selectors
//!   - All four combinators
//!   - Structural pseudo-classes, `:not()`, `:is()`, `:where()`, `:nth-*()`
//! - **Rule index**: sheets in document order, readable/pending/opaque states
//! - **Cascade inliner** and **body-style extractor**
//!
//! # Not Implemented
//!
//! - Specificity (rules apply in source order; see [`cascade`])
//! - Media query evaluation (`@media` blocks are skipped)
//! - Inheritance and computed values

/// Cascade inlining and body-style extraction.
pub mod cascade;
/// Ordered declaration blocks.
pub mod declarations;
/// Editable `style` attribute values.
pub mod inline_style;
/// CSS parser per [§ 5 Parsing](https://www.w3.org/TR/css-syntax-3/#parsing).
pub mod parser;
/// Style sheets and the rule index.
pub mod rule_set;
/// CSS selector parsing and matching per [Selectors Level 4](https://www.w3.org/TR/selectors-4/).
pub mod selector;
/// CSS tokenizer per [§ 4 Tokenization](https://www.w3.org/TR/css-syntax-3/#tokenization).
pub mod tokenizer;

pub use cascade::{CascadeStats, extract_body_style, inline_rule_set, is_page_selector};
pub use declarations::{DeclarationBlock, PropertyValue};
pub use inline_style::InlineStyle;
pub use parser::{CssParser, ComponentValue, Declaration, Stylesheet, parse_stylesheet};
pub use rule_set::{
    RuleSet, SheetOrigin, SheetReadError, SheetState, StyleRule, StyleSheet, StylesheetSource,
    collect_stylesheet_sources, is_stylesheet_link,
};
pub use selector::{SelectorError, SelectorList, parse_selector, parse_selector_list, query_selector_all};
pub use tokenizer::{CssToken, CssTokenizer};
