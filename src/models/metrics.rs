use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;

use crate::utils::constants::{FIELD_PRECIPITATION, FIELD_TEMPERATURE};

/// Accuracy of one field over the aligned rows where both sides had data
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldMetrics {
    pub count: usize,
    pub mae: f64,
    pub rmse: f64,
    /// Mean of forecast - actual; positive means over-forecast
    pub bias: f64,
    /// NaN with fewer than two samples or a constant series
    pub correlation: f64,
}

/// Result of one verification call
///
/// Flattens to `n_samples` plus `{prefix}_count`, `{prefix}_mae`, `{prefix}_rmse`,
/// `{prefix}_bias` and `{prefix}_corr` per field, where the prefix is `temp`
/// for temperature, `precip` for precipitation and the field name otherwise.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VerificationMetrics {
    pub n_samples: usize,
    pub fields: BTreeMap<String, FieldMetrics>,
}

impl VerificationMetrics {
    pub fn new(n_samples: usize) -> Self {
        Self {
            n_samples,
            fields: BTreeMap::new(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldMetrics> {
        self.fields.get(name)
    }

    /// Flat name -> value mapping
    pub fn to_map(&self) -> BTreeMap<String, f64> {
        let mut map = BTreeMap::new();
        map.insert("n_samples".to_string(), self.n_samples as f64);

        for (field, m) in &self.fields {
            let prefix = metric_prefix(field);
            map.insert(format!("{}_count", prefix), m.count as f64);
            map.insert(format!("{}_mae", prefix), m.mae);
            map.insert(format!("{}_rmse", prefix), m.rmse);
            map.insert(format!("{}_bias", prefix), m.bias);
            map.insert(format!("{}_corr", prefix), m.correlation);
        }

        map
    }

    /// Look up a flattened metric such as `temp_mae`
    pub fn get(&self, key: &str) -> Option<f64> {
        self.to_map().get(key).copied()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Key: value lines in flattened order
    pub fn to_text(&self) -> String {
        let mut text = String::new();
        for (key, value) in self.to_map() {
            if key == "n_samples" || key.ends_with("_count") {
                text.push_str(&format!("{}: {}\n", key, value as usize));
            } else {
                text.push_str(&format!("{}: {}\n", key, value));
            }
        }
        text
    }
}

impl Serialize for VerificationMetrics {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1 + self.fields.len() * 5))?;
        map.serialize_entry("n_samples", &self.n_samples)?;

        for (field, m) in &self.fields {
            let prefix = metric_prefix(field);
            map.serialize_entry(&format!("{}_count", prefix), &m.count)?;
            map.serialize_entry(&format!("{}_mae", prefix), &m.mae)?;
            map.serialize_entry(&format!("{}_rmse", prefix), &m.rmse)?;
            map.serialize_entry(&format!("{}_bias", prefix), &m.bias)?;
            map.serialize_entry(&format!("{}_corr", prefix), &m.correlation)?;
        }

        map.end()
    }
}

/// Short metric-name prefix for a field
pub fn metric_prefix(field: &str) -> &str {
    match field {
        FIELD_TEMPERATURE => "temp",
        FIELD_PRECIPITATION => "precip",
        other => other,
    }
}
