//! Parameter data model shared by the schema provider, the normalizer and
//! the simulation engine.

use indexmap::IndexMap;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

/// Declarative description of one tunable simulation input.
///
/// `min`/`max` are advisory: they drive the UI controls and are not
/// enforced when values come back from the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    /// Unique identifier within the schema.
    #[serde(skip)]
    pub key: String,
    /// Default value.
    pub best: f64,
    /// Lower bound shown in the UI.
    pub min: f64,
    /// Upper bound shown in the UI.
    pub max: f64,
    /// Human-readable label.
    #[serde(rename = "name")]
    pub label: String,
}

impl ParameterSpec {
    /// Create a new parameter spec.
    pub fn new(key: &str, best: f64, min: f64, max: f64, label: &str) -> Self {
        Self { key: key.to_string(), best, min, max, label: label.to_string() }
    }

    /// Whether the default lies inside the advertised bounds.
    pub fn default_in_bounds(&self) -> bool {
        self.min <= self.best && self.best <= self.max
    }
}

/// Ordered, named collection of parameter specs.
///
/// Serializes as a JSON object `key -> {best, min, max, name}` in
/// declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterGroup {
    /// Group name (`sim_pars`, `epi_pars`).
    pub name: String,
    specs: Vec<ParameterSpec>,
}

impl ParameterGroup {
    /// Create an empty group.
    pub fn new(name: &str) -> Self {
        Self { name: name.to_string(), specs: Vec::new() }
    }

    /// Append a spec; builder-style.
    pub fn with(mut self, spec: ParameterSpec) -> Self {
        self.specs.push(spec);
        self
    }

    /// Specs in declaration order.
    pub fn specs(&self) -> &[ParameterSpec] {
        &self.specs
    }

    /// Look up a spec by key.
    pub fn get(&self, key: &str) -> Option<&ParameterSpec> {
        self.specs.iter().find(|s| s.key == key)
    }

    /// Whether the group declares `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Keys in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.specs.iter().map(|s| s.key.as_str())
    }

    /// Number of specs.
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Whether the group is empty.
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

impl Serialize for ParameterGroup {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.specs.len()))?;
        for spec in &self.specs {
            map.serialize_entry(&spec.key, spec)?;
        }
        map.end()
    }
}

/// Normalized parameter map consumed by simulation engines.
///
/// Always carries the `verbose` control flag next to the numeric values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatParameters {
    /// Verbosity control flag.
    pub verbose: bool,
    values: IndexMap<String, f64>,
}

impl FlatParameters {
    /// Empty parameter map with the given verbosity.
    pub fn new(verbose: bool) -> Self {
        Self { verbose, values: IndexMap::new() }
    }

    /// Insert a value, returning the previous one if the key was present.
    pub fn insert(&mut self, key: impl Into<String>, value: f64) -> Option<f64> {
        self.values.insert(key.into(), value)
    }

    /// Value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }

    /// Whether `key` has a value.
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Number of numeric values (the `verbose` flag is not counted).
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no numeric values are present.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Serialize for FlatParameters {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len() + 1))?;
        map.serialize_entry("verbose", &self.verbose)?;
        for (k, v) in &self.values {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}
