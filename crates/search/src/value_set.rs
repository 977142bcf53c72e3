//! Value set normalization.

use crate::error::{Result, SearchError};
use std::collections::HashSet;

/// An ordered sequence of unique values drawn from one input collection.
///
/// Only exact duplicates are removed; the first occurrence keeps its
/// position. No trimming or case folding is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueSet {
    label: String,
    values: Vec<String>,
}

impl ValueSet {
    /// Deduplicate `raw` into a value set labelled `label`.
    ///
    /// # Errors
    /// [`SearchError::EmptyInput`] when `raw` yields no values.
    ///
    /// # Example
    /// ```
    /// use fuzzy_lookup_search::ValueSet;
    ///
    /// let set = ValueSet::from_raw("names", ["b", "a", "b", "B"]).unwrap();
    /// assert_eq!(set.values(), ["b", "a", "B"]);
    /// ```
    pub fn from_raw<I, S>(label: impl Into<String>, raw: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let label = label.into();
        let mut seen = HashSet::new();
        let mut values = Vec::new();

        for value in raw {
            let value = value.as_ref();
            if seen.insert(value.to_owned()) {
                values.push(value.to_owned());
            }
        }

        if values.is_empty() {
            return Err(SearchError::EmptyInput { collection: label });
        }

        Ok(Self { label, values })
    }

    /// Provenance label of the collection.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Unique values in first-occurrence order.
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Value at `index`.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(String::as_str)
    }

    /// Number of unique values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the set has no values; never true for a set built by `from_raw`.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
