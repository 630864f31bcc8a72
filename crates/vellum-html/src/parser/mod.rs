//! HTML tree construction.

/// Tree builder state machine.
mod tree_builder;

pub use tree_builder::{HTMLParser, InsertionMode, ParseIssue};
