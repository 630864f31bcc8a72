//! Ordered declaration blocks.
//!
//! [CSSOM § 6.6 CSS Declaration Blocks](https://www.w3.org/TR/cssom-1/#css-declaration-blocks)

use crate::parser::Declaration;

/// A property value and its importance flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyValue {
    /// Serialized value, e.g. `1px solid #ccc`.
    pub value: String,
    /// Declared with `!important`.
    pub important: bool,
}

/// An ordered property → value mapping with per-property `!important` flags.
///
/// [CSSOM § 6.6.1](https://www.w3.org/TR/cssom-1/#concept-declarations-specified-order)
/// "The declarations ... in specified order." A repeated property keeps the
/// position of its first occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeclarationBlock {
    entries: Vec<(String, PropertyValue)>,
}

impl DeclarationBlock {
    /// An empty block.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Build a block from parsed declarations.
    ///
    /// Within one block a later declaration of a property replaces the earlier
    /// one, unless the earlier one is important and the later one is not.
    #[must_use]
    pub fn from_declarations(declarations: &[Declaration]) -> Self {
        let mut block = Self::new();
        for decl in declarations {
            let name = normalize_property_name(&decl.name);
            let incoming = PropertyValue {
                value: decl.value_text(),
                important: decl.important,
            };
            match block.entries.iter_mut().find(|(n, _)| *n == name) {
                Some((_, existing)) => {
                    if incoming.important || !existing.important {
                        *existing = incoming;
                    }
                }
                None => block.entries.push((name, incoming)),
            }
        }
        block
    }

    /// Look up a property.
    #[must_use]
    pub fn get(&self, property: &str) -> Option<&PropertyValue> {
        let name = normalize_property_name(property);
        self.entries.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    /// Iterate in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Number of distinct properties.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// No properties declared.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Property names are ASCII case-insensitive, except custom properties.
///
/// [CSS Variables § 2](https://www.w3.org/TR/css-variables-1/#defining-variables)
/// "Custom properties ... are case-sensitive."
#[must_use]
pub fn normalize_property_name(name: &str) -> String {
    if name.starts_with("--") {
        name.to_string()
    } else {
        name.to_ascii_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_declaration_list;

    fn block(css: &str) -> DeclarationBlock {
        DeclarationBlock::from_declarations(&parse_declaration_list(css))
    }

    #[test]
    fn later_duplicate_replaces_in_place() {
        let b = block("color: red; margin: 0; COLOR: blue");
        let names: Vec<&str> = b.iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["color", "margin"]);
        assert_eq!(b.get("color").unwrap().value, "blue");
    }

    #[test]
    fn important_survives_later_normal() {
        let b = block("color: red !important; color: blue");
        let color = b.get("color").unwrap();
        assert_eq!(color.value, "red");
        assert!(color.important);
    }

    #[test]
    fn custom_properties_keep_case() {
        let b = block("--Accent: #f00; --accent: #0f0");
        assert_eq!(b.len(), 2);
        assert_eq!(b.get("--Accent").unwrap().value, "#f00");
    }
}
