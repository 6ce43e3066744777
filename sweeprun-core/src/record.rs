//! Ordered name/value records and the display-record merge rules.

use crate::value::Value;
use serde::{Deserialize, Serialize};

/// Insertion-ordered mapping from column name to value.
///
/// Inserting an existing key replaces its value in place, so the column keeps
/// the position where it was first seen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    entries: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Overlay every entry of `other`, later values winning.
    pub fn extend(&mut self, other: Record) {
        for (k, v) in other.entries {
            self.insert(k, v);
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Build the display record for one recorded iteration.
///
/// Parameter columns come first. Auxiliary entries whose name matches a
/// parameter column case-insensitively are dropped. Diagnostics are applied
/// last and may overwrite anything.
pub fn merge_display_record<I>(
    params: &Record,
    aux: &[(String, Value)],
    diagnostics: I,
) -> Record
where
    I: IntoIterator<Item = Record>,
{
    let param_keys: Vec<String> = params.keys().map(str::to_lowercase).collect();
    let mut merged = Record::with_capacity(params.len() + aux.len());
    merged.extend(params.clone());

    for (name, value) in aux {
        let lowered = name.to_lowercase();
        if param_keys.iter().any(|k| *k == lowered) {
            continue;
        }
        merged.insert(name.clone(), value.clone());
    }

    for extra in diagnostics {
        merged.extend(extra);
    }
    merged
}
