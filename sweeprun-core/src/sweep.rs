//! Parameter sweep expansion (grid / Cartesian product).

use crate::value::ParamValue;
use std::collections::HashMap;
use std::fmt;

/// One sweepable option: its algorithm-facing name, the column label used in
/// result tables, and the candidate values. `None` means "not swept".
#[derive(Debug, Clone)]
pub struct SweepOption {
    pub name: String,
    pub display_name: String,
    pub values: Option<Vec<ParamValue>>,
}

/// Ordered collection of sweep options.
#[derive(Debug, Clone, Default)]
pub struct SweepSpec {
    options: Vec<SweepOption>,
}

impl SweepSpec {
    pub fn new() -> Self {
        Self {
            options: Vec::new(),
        }
    }

    /// Add an option with candidate values.
    pub fn option<V, I>(mut self, name: &str, display_name: &str, values: I) -> Self
    where
        V: Into<ParamValue>,
        I: IntoIterator<Item = V>,
    {
        self.options.push(SweepOption {
            name: name.to_string(),
            display_name: display_name.to_string(),
            values: Some(values.into_iter().map(Into::into).collect()),
        });
        self
    }

    /// Add an option that is declared but not swept.
    pub fn absent(mut self, name: &str, display_name: &str) -> Self {
        self.options.push(SweepOption {
            name: name.to_string(),
            display_name: display_name.to_string(),
            values: None,
        });
        self
    }

    /// Expand into concrete combinations. The first option varies slowest.
    /// With no swept options the result is a single empty combination.
    pub fn expand(&self) -> ExpandedSweep {
        let swept: Vec<&SweepOption> = self
            .options
            .iter()
            .filter(|o| o.values.is_some())
            .collect();

        let display_names = swept
            .iter()
            .map(|o| (o.name.clone(), o.display_name.clone()))
            .collect();

        let mut combinations = vec![ParameterCombination::new()];
        for option in &swept {
            let values = option.values.as_deref().unwrap_or_default();
            let mut next = Vec::with_capacity(combinations.len() * values.len());
            for combination in &combinations {
                for value in values {
                    let mut c = combination.clone();
                    c.insert(&option.name, value.clone());
                    next.push(c);
                }
            }
            combinations = next;
        }

        ExpandedSweep {
            combinations,
            display_names,
        }
    }
}

/// Result of expanding a [`SweepSpec`].
#[derive(Debug, Clone)]
pub struct ExpandedSweep {
    pub combinations: Vec<ParameterCombination>,
    /// Option name to column label, for swept options only.
    pub display_names: HashMap<String, String>,
}

/// Ordered option name to value bindings for one run.
#[derive(Debug, Clone, Default)]
pub struct ParameterCombination {
    entries: Vec<(String, ParamValue)>,
}

impl ParameterCombination {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Bind `name`, replacing any previous binding in place.
    pub fn insert(&mut self, name: &str, value: ParamValue) {
        match self.entries.iter_mut().find(|(k, _)| k == name) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((name.to_string(), value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.entries.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fixed arguments underneath this combination; combination values win.
    pub fn with_defaults(&self, defaults: &ParameterCombination) -> ParameterCombination {
        let mut merged = defaults.clone();
        for (k, v) in &self.entries {
            merged.insert(k, v.clone());
        }
        merged
    }
}

impl fmt::Display for ParameterCombination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .entries
            .iter()
            .map(|(k, v)| format!("{k}:[{v}]"))
            .collect();
        f.write_str(&parts.join(", "))
    }
}
