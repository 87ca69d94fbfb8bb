use crate::{DISPLAY_NAME_LABEL, TAX_ID_COLUMN, URL_COLUMN};

/// Flat `label -> value` record read from one detail page.
///
/// Keeps insertion order so the merged output gets its columns in the order
/// they were first seen. The first value recorded for a label is the one kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap {
    entries: Vec<(String, String)>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `value` under `label` unless the label is blank or already present.
    /// Returns whether the entry was recorded.
    pub fn insert(&mut self, label: impl Into<String>, value: impl Into<String>) -> bool {
        let label = label.into();
        if label.trim().is_empty() || self.get(&label).is_some() {
            return false;
        }
        self.entries.push((label, value.into()));
        true
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v.as_str())
    }

    /// All entries in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(l, v)| (l.as_str(), v.as_str()))
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(l, _)| l.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn identifier(&self) -> Option<&str> {
        self.get(TAX_ID_COLUMN)
    }

    pub fn source_url(&self) -> Option<&str> {
        self.get(URL_COLUMN)
    }

    pub fn display_name(&self) -> Option<&str> {
        self.get(DISPLAY_NAME_LABEL)
    }
}
