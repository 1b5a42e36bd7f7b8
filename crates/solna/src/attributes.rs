#![forbid(unsafe_code)]

//! Attribute values released by the identity provider.

use std::collections::BTreeMap;
use std::fmt;

/// The values of one attribute name.
///
/// Acts as a string (its primary value) for the common single-valued case.
/// Each `<Attribute>` element contributes its values in reverse document
/// order; when a name recurs, the later element's values come first. The
/// primary value is the first value of the last element seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeValue {
    primary: Option<String>,
    values: Vec<String>,
}

impl AttributeValue {
    /// Values of a single `<Attribute>` element, in document order.
    pub fn from_element_values(mut values: Vec<String>) -> Self {
        let primary = values.first().cloned();
        values.reverse();
        Self { primary, values }
    }

    /// Append the values accumulated from earlier elements of the same name.
    pub fn merge_earlier(&mut self, earlier: AttributeValue) {
        self.values.extend(earlier.values);
    }

    pub fn primary(&self) -> Option<&str> {
        self.primary.as_deref()
    }

    /// The primary value, or `""` when the attribute had no values.
    pub fn as_str(&self) -> &str {
        self.primary().unwrap_or("")
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn into_values(self) -> Vec<String> {
        self.values
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PartialEq<str> for AttributeValue {
    fn eq(&self, other: &str) -> bool {
        self.primary.as_deref() == Some(other)
    }
}

impl PartialEq<&str> for AttributeValue {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

/// Attribute name to values, keyed by the literal `Name` attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    map: BTreeMap<String, AttributeValue>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one `<Attribute>` element, merging with any earlier element
    /// of the same name.
    pub fn add_element(&mut self, name: &str, values: Vec<String>) {
        let mut value = AttributeValue::from_element_values(values);
        if let Some(earlier) = self.map.remove(name) {
            value.merge_earlier(earlier);
        }
        self.map.insert(name.to_owned(), value);
    }

    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.map.get(name)
    }

    /// Primary value of `name`.
    pub fn single(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(AttributeValue::primary)
    }

    /// All values of `name`; empty when absent.
    pub fn multi(&self, name: &str) -> &[String] {
        self.get(name).map_or(&[][..], AttributeValue::values)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.map.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.map.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl std::ops::Index<&str> for Attributes {
    type Output = AttributeValue;

    fn index(&self, name: &str) -> &AttributeValue {
        static MISSING: AttributeValue = AttributeValue {
            primary: None,
            values: Vec::new(),
        };
        self.get(name).unwrap_or(&MISSING)
    }
}
