//! Document metadata - insertion-ordered multi-valued fields

use serde::{Deserialize, Serialize};

/// Metadata attached to a commit operation.
///
/// An ordered mapping from field name to one or more string values.
/// Insertion order of fields is preserved and significant for
/// deterministic output formatting (logging, file dumps).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata {
    fields: Vec<(String, Vec<String>)>,
}

impl Metadata {
    /// Create empty metadata
    pub fn new() -> Self {
        Self::default()
    }

    /// Create metadata holding a single field/value pair
    pub fn single(field: impl Into<String>, value: impl Into<String>) -> Self {
        let mut meta = Self::new();
        meta.add(field, value);
        meta
    }

    /// Append a value to a field.
    ///
    /// A new field is created at the end of the ordering; an existing
    /// field keeps its position and gains the value.
    pub fn add(&mut self, field: impl Into<String>, value: impl Into<String>) {
        let field = field.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| *name == field) {
            Some((_, values)) => values.push(value),
            None => self.fields.push((field, vec![value])),
        }
    }

    /// Replace all values of a field.
    ///
    /// An empty `values` removes the field entirely; fields never hold
    /// an empty value list.
    pub fn set(&mut self, field: impl Into<String>, values: Vec<String>) {
        let field = field.into();
        if values.is_empty() {
            self.fields.retain(|(name, _)| *name != field);
            return;
        }
        match self.fields.iter_mut().find(|(name, _)| *name == field) {
            Some((_, existing)) => *existing = values,
            None => self.fields.push((field, values)),
        }
    }

    /// Get all values of a field
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, values)| values.as_slice())
    }

    /// Get the first value of a field
    pub fn get_first(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(|v| v.first()).map(String::as_str)
    }

    /// Whether a field is present
    pub fn contains_field(&self, field: &str) -> bool {
        self.fields.iter().any(|(name, _)| name == field)
    }

    /// Iterate fields in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.fields
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no fields are present
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Metadata {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut meta = Self::new();
        for (field, value) in iter {
            meta.add(field, value);
        }
        meta
    }
}
