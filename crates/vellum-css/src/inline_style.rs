//! The `style` attribute as an editable, ordered declaration map.
//!
//! [CSS Style Attributes](https://www.w3.org/TR/css-style-attr/)

use vellum_dom::ElementData;

use crate::declarations::{DeclarationBlock, PropertyValue, normalize_property_name};
use crate::parser::parse_declaration_list;

/// Inline declarations of one element, in attribute order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InlineStyle {
    entries: Vec<(String, PropertyValue)>,
}

impl InlineStyle {
    /// [§ 3 Syntax and Parsing](https://www.w3.org/TR/css-style-attr/#syntax)
    /// "The value of the style attribute must match the syntax of the contents
    /// of a CSS declaration block."
    #[must_use]
    pub fn parse(attribute: &str) -> Self {
        let block = DeclarationBlock::from_declarations(&parse_declaration_list(attribute));
        Self {
            entries: block
                .iter()
                .map(|(name, value)| (name.to_string(), value.clone()))
                .collect(),
        }
    }

    /// The element's current `style` attribute, parsed.
    #[must_use]
    pub fn of_element(element: &ElementData) -> Self {
        element.style().map(Self::parse).unwrap_or_default()
    }

    /// Value of `property`, if set.
    #[must_use]
    pub fn get(&self, property: &str) -> Option<&str> {
        self.entry(property).map(|v| v.value.as_str())
    }

    /// Was `property` set by an important declaration?
    #[must_use]
    pub fn is_important(&self, property: &str) -> bool {
        self.entry(property).is_some_and(|v| v.important)
    }

    fn entry(&self, property: &str) -> Option<&PropertyValue> {
        let name = normalize_property_name(property);
        self.entries.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    /// Write `incoming` unless the property is already set.
    ///
    /// An existing value is replaced only when `incoming` is important and the
    /// existing one is not. A replaced property keeps its position. Returns
    /// whether anything was written.
    pub fn apply(&mut self, property: &str, incoming: &PropertyValue) -> bool {
        let name = normalize_property_name(property);
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            None => {
                self.entries.push((name, incoming.clone()));
                true
            }
            Some((_, existing)) if incoming.important && !existing.important => {
                *existing = incoming.clone();
                true
            }
            Some(_) => false,
        }
    }

    /// Apply every declaration of `block` in order, returning how many were written.
    pub fn apply_block(&mut self, block: &DeclarationBlock) -> usize {
        block
            .iter()
            .filter(|(property, value)| self.apply(property, value))
            .count()
    }

    /// Number of properties.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// No properties set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize as attribute text: `color: red; margin: 0 !important;`.
    #[must_use]
    pub fn to_css_text(&self) -> String {
        self.entries
            .iter()
            .map(|(name, v)| {
                if v.important {
                    format!("{name}: {} !important;", v.value)
                } else {
                    format!("{name}: {};", v.value)
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Store back into the element; an empty style removes the attribute.
    pub fn write_to(&self, element: &mut ElementData) {
        element.set_style(self.to_css_text());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(v: &str, important: bool) -> PropertyValue {
        PropertyValue {
            value: v.to_string(),
            important,
        }
    }

    #[test]
    fn first_writer_wins() {
        let mut style = InlineStyle::parse("color: blue");
        assert!(!style.apply("color", &value("red", false)));
        assert_eq!(style.get("color"), Some("blue"));
    }

    #[test]
    fn important_overrides_normal_only() {
        let mut style = InlineStyle::parse("color: blue; margin: 0 !important");
        assert!(style.apply("color", &value("red", true)));
        assert!(!style.apply("margin", &value("4px", true)));
        assert_eq!(style.to_css_text(), "color: red !important; margin: 0 !important;");
    }

    #[test]
    fn empty_style_removes_attribute() {
        let mut element = ElementData::new("p");
        element.set_style("color: red".to_string());
        InlineStyle::default().write_to(&mut element);
        assert_eq!(element.style(), None);
    }
}
