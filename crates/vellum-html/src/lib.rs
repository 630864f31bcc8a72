//! HTML tokenizer, tree builder and serializer for the Vellum export engine.
//!
//! # Scope
//!
//! - **Tokenizer** ([WHATWG § 13.2.5](https://html.spec.whatwg.org/multipage/parsing.html#tokenization))
//!   - Data, RCDATA, RAWTEXT, tag, attribute, comment and DOCTYPE states
//!   - Named (common subset) and numeric character references
//! - **Tree builder** ([WHATWG § 13.2.6](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction))
//!   - Insertion modes: Initial, BeforeHtml, BeforeHead, InHead, AfterHead,
//!     InBody, Text, AfterBody, AfterAfterBody
//!   - Implied html/head/body, implied end tags, element scope
//! - **Serializer** ([WHATWG § 13.3](https://html.spec.whatwg.org/multipage/parsing.html#serialising-html-fragments))
//!
//! # Not Implemented
//!
//! - Script data escape states (script content is tokenized as RAWTEXT)
//! - Table, select and template insertion modes
//! - Adoption agency algorithm and foster parenting

/// HTML tree construction.
pub mod parser;
/// HTML fragment serialization.
pub mod serializer;
/// HTML tokenizer.
pub mod tokenizer;

pub use parser::{HTMLParser, InsertionMode, ParseIssue};
pub use serializer::{serialize_children, serialize_document, serialize_node};
pub use tokenizer::{Attribute, Tokenizer, Token};

use vellum_dom::DomTree;

/// Tokenize and tree-build a complete document.
#[must_use]
pub fn parse_document(html: &str) -> DomTree {
    let mut tokenizer = Tokenizer::new(html.to_string());
    tokenizer.run();
    HTMLParser::new(tokenizer.into_tokens()).run()
}
