//! Ordered attribute storage.
//!
//! [§ 4.9.2 Interface NamedNodeMap](https://dom.spec.whatwg.org/#interface-namednodemap)
//!
//! "An element has an associated attribute list... The attribute list is
//! ordered." Serialization walks attributes in this order, so exported markup
//! is stable from run to run.

/// Ordered list of attribute name/value pairs for an element.
///
/// Names are stored as given by the tree builder (already lowercased for HTML
/// elements). Lookups are exact-match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributesMap {
    entries: Vec<(String, String)>,
}

impl AttributesMap {
    /// Create an empty attribute list.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Get the value of the attribute named `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&String> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Returns true if an attribute named `name` is present.
    #[must_use]
    pub fn contains_key(&self, name: &str) -> bool {
        self.entries.iter().any(|(key, _)| key == name)
    }

    /// [§ 4.9 set an attribute value](https://dom.spec.whatwg.org/#concept-element-attributes-set-value)
    ///
    /// Replace the value in place if the attribute exists (keeping its
    /// position), otherwise append it. Returns the previous value.
    pub fn insert(&mut self, name: String, value: String) -> Option<String> {
        if let Some((_, existing)) = self.entries.iter_mut().find(|(key, _)| *key == name) {
            return Some(std::mem::replace(existing, value));
        }
        self.entries.push((name, value));
        None
    }

    /// [§ 4.9 remove an attribute by name](https://dom.spec.whatwg.org/#concept-element-attributes-remove-by-name)
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let position = self.entries.iter().position(|(key, _)| key == name)?;
        Some(self.entries.remove(position).1)
    }

    /// Iterate over `(name, value)` pairs in attribute order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.entries.iter().map(|(key, value)| (key, value))
    }

    /// Number of attributes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no attributes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, String)> for AttributesMap {
    /// Later duplicates are dropped, matching the tokenizer's
    /// duplicate-attribute rule.
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (name, value) in iter {
            if !map.contains_key(&name) {
                map.entries.push((name, value));
            }
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_keeps_position() {
        let mut attrs = AttributesMap::new();
        let _ = attrs.insert("class".to_string(), "a".to_string());
        let _ = attrs.insert("id".to_string(), "x".to_string());
        let previous = attrs.insert("class".to_string(), "b".to_string());

        assert_eq!(previous.as_deref(), Some("a"));
        let names: Vec<&String> = attrs.iter().map(|(k, _)| k).collect();
        assert_eq!(names, ["class", "id"]);
        assert_eq!(attrs.get("class").map(String::as_str), Some("b"));
    }

    #[test]
    fn test_from_iter_drops_duplicates() {
        let attrs: AttributesMap = [
            ("a".to_string(), "1".to_string()),
            ("a".to_string(), "2".to_string()),
        ]
        .into_iter()
        .collect();
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs.get("a").map(String::as_str), Some("1"));
    }
}
