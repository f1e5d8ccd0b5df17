//! Conversion of UI-supplied parameter groups into [`FlatParameters`].
//!
//! Each group is a JSON object `key -> {best, min, max, name}`; only `best`
//! is read. Every problem is reported and processing continues, so the
//! result holds all entries that did convert.

use cw_core::FlatParameters;
use serde_json::Value;
use thiserror::Error;

use crate::schema::Defaults;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    #[error("{group} must be an object mapping keys to parameter entries, got {found}")]
    GroupNotAnObject { group: String, found: &'static str },

    #[error("'{key}' is not a {group} parameter")]
    UnknownKey { group: String, key: String },

    #[error("entry for '{key}' must be an object with a 'best' field")]
    EntryNotAnObject { key: String },

    #[error("entry for '{key}' has no 'best' value")]
    MissingBest { key: String },

    #[error("could not convert '{key}' value {value} to a number")]
    NotNumeric { key: String, value: String },

    #[error("'{key}' appears in more than one parameter group; keeping the first value")]
    DuplicateKey { key: String },
}

/// Result of normalizing both groups.
#[derive(Debug, Clone, Default)]
pub struct Normalized {
    pub pars: FlatParameters,
    pub errors: Vec<ConversionError>,
}

/// Flatten `sim_pars` and `epi_pars` into one numeric map.
///
/// A missing or `null` group contributes nothing. Keys must belong to the
/// schema group they are submitted in.
pub fn normalize(sim_pars: Option<&Value>, epi_pars: Option<&Value>, verbose: bool, schema: &Defaults) -> Normalized {
    let mut out = Normalized { pars: FlatParameters::new(verbose), errors: Vec::new() };
    convert_group("sim_pars", sim_pars, &schema.sim_pars, &mut out);
    convert_group("epi_pars", epi_pars, &schema.epi_pars, &mut out);
    out
}

fn convert_group(group: &str, raw: Option<&Value>, known: &cw_core::ParameterGroup, out: &mut Normalized) {
    let entries = match raw {
        None | Some(Value::Null) => return,
        Some(Value::Object(map)) => map,
        Some(other) => {
            out.errors.push(ConversionError::GroupNotAnObject { group: group.to_string(), found: kind(other) });
            return;
        }
    };

    for (key, entry) in entries {
        if !known.contains(key) {
            out.errors.push(ConversionError::UnknownKey { group: group.to_string(), key: key.clone() });
            continue;
        }
        match best_value(key, entry) {
            Ok(v) => {
                if out.pars.contains_key(key) {
                    out.errors.push(ConversionError::DuplicateKey { key: key.clone() });
                } else {
                    out.pars.insert(key.clone(), v);
                }
            }
            Err(e) => out.errors.push(e),
        }
    }
}

fn best_value(key: &str, entry: &Value) -> Result<f64, ConversionError> {
    let Value::Object(fields) = entry else {
        return Err(ConversionError::EntryNotAnObject { key: key.to_string() });
    };
    let best = fields.get("best").ok_or_else(|| ConversionError::MissingBest { key: key.to_string() })?;
    to_float(best).ok_or_else(|| ConversionError::NotNumeric { key: key.to_string(), value: best.to_string() })
}

/// Numbers, numeric strings and booleans convert; everything else does not.
fn to_float(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
