//! Filter expressions for listing calls
//!
//! A filter expression is a conjunction of key/value predicates forwarded
//! opaquely to the daemon. Adding a value under an existing key adds a new
//! predicate; it never replaces the values already present.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::{Map, Value};

/// Multi-valued key/value predicate set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterArgs {
    fields: BTreeMap<String, BTreeSet<String>>,
}

impl FilterArgs {
    /// Create an empty filter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a predicate, accumulating with any values already under `key`
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.fields
            .entry(key.into())
            .or_default()
            .insert(value.into());
        self
    }

    /// Builder-style variant of [`FilterArgs::add`]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.add(key, value);
        self
    }

    /// Values recorded under `key`, in sorted order
    pub fn get(&self, key: &str) -> Vec<&str> {
        self.fields
            .get(key)
            .map(|values| values.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Whether the exact (key, value) predicate is present
    pub fn contains(&self, key: &str, value: &str) -> bool {
        self.fields
            .get(key)
            .map(|values| values.contains(value))
            .unwrap_or(false)
    }

    /// Iterate over every (key, value) predicate
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .flat_map(|(k, values)| values.iter().map(move |v| (k.as_str(), v.as_str())))
    }

    /// Number of distinct predicates
    pub fn len(&self) -> usize {
        self.fields.values().map(BTreeSet::len).sum()
    }

    /// Check if no predicate is set
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Encode as the daemon's JSON filter form: `{"key":{"value":true}}`
    pub fn to_json(&self) -> String {
        let object: Map<String, Value> = self
            .fields
            .iter()
            .map(|(key, values)| {
                let set: Map<String, Value> = values
                    .iter()
                    .map(|v| (v.clone(), Value::Bool(true)))
                    .collect();
                (key.clone(), Value::Object(set))
            })
            .collect();

        Value::Object(object).to_string()
    }
}

impl<K, V> FromIterator<(K, V)> for FilterArgs
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut args = Self::new();
        args.extend(iter);
        args
    }
}

impl<K, V> Extend<(K, V)> for FilterArgs
where
    K: Into<String>,
    V: Into<String>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.add(key, value);
        }
    }
}

/// Options accepted by every listing call
///
/// Only the filter set is populated; every other daemon option keeps its
/// default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    pub filters: FilterArgs,
}

impl ListOptions {
    /// Options carrying the given filters
    pub fn with_filters(filters: FilterArgs) -> Self {
        Self { filters }
    }

    /// Query string for these options, without the leading `?`
    ///
    /// Returns `None` when there is nothing to send.
    pub fn query(&self) -> Option<String> {
        if self.filters.is_empty() {
            return None;
        }
        Some(format!(
            "filters={}",
            urlencoding::encode(&self.filters.to_json())
        ))
    }
}
