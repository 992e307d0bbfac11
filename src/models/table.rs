use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::{ProcessingError, Result};

/// Hourly weather records indexed by strictly increasing, unique timestamps.
///
/// Every field holds one value per index entry; `None` is "no data". Tables are
/// never mutated in place: every transform returns a new table.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct WeatherTable {
    index: Vec<NaiveDateTime>,
    fields: BTreeMap<String, Vec<Option<f64>>>,
}

impl WeatherTable {
    /// Build a table, sorting rows by timestamp
    ///
    /// Fails when a field's length differs from the index or a timestamp repeats.
    pub fn new(
        index: Vec<NaiveDateTime>,
        fields: BTreeMap<String, Vec<Option<f64>>>,
    ) -> Result<Self> {
        for (name, values) in &fields {
            if values.len() != index.len() {
                return Err(ProcessingError::InvalidFormat(format!(
                    "Field '{}' has {} values for {} timestamps",
                    name,
                    values.len(),
                    index.len()
                )));
            }
        }

        let mut order: Vec<usize> = (0..index.len()).collect();
        order.sort_by_key(|&i| index[i]);

        if let Some(pair) = order.windows(2).find(|w| index[w[0]] == index[w[1]]) {
            return Err(ProcessingError::DuplicateTimestamp(index[pair[0]]));
        }

        let already_sorted = order.iter().enumerate().all(|(pos, &i)| pos == i);
        if already_sorted {
            return Ok(Self { index, fields });
        }

        let sorted_index = order.iter().map(|&i| index[i]).collect();
        let sorted_fields = fields
            .into_iter()
            .map(|(name, values)| {
                let sorted = order.iter().map(|&i| values[i]).collect();
                (name, sorted)
            })
            .collect();

        Ok(Self {
            index: sorted_index,
            fields: sorted_fields,
        })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builder() -> WeatherTableBuilder {
        WeatherTableBuilder::new()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn index(&self) -> &[NaiveDateTime] {
        &self.index
    }

    pub fn first_time(&self) -> Option<NaiveDateTime> {
        self.index.first().copied()
    }

    pub fn last_time(&self) -> Option<NaiveDateTime> {
        self.index.last().copied()
    }

    pub fn field(&self, name: &str) -> Option<&[Option<f64>]> {
        self.fields.get(name).map(Vec::as_slice)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn value(&self, name: &str, row: usize) -> Option<f64> {
        self.fields.get(name).and_then(|v| v.get(row).copied().flatten())
    }

    /// Present values of a field, skipping "no data"
    pub fn present_values<'a>(&'a self, name: &str) -> impl Iterator<Item = f64> + 'a {
        self.fields
            .get(name)
            .into_iter()
            .flat_map(|values| values.iter().flatten().copied())
    }

    /// Copy of the table with one field replaced or added
    pub fn with_field(&self, name: &str, values: Vec<Option<f64>>) -> Result<Self> {
        if values.len() != self.index.len() {
            return Err(ProcessingError::InvalidFormat(format!(
                "Field '{}' has {} values for {} timestamps",
                name,
                values.len(),
                self.index.len()
            )));
        }

        let mut table = self.clone();
        table.fields.insert(name.to_string(), values);
        Ok(table)
    }

    /// Apply `f` to every present value of a field; unknown fields leave the table as is
    pub fn map_values(&self, name: &str, f: impl Fn(f64) -> f64) -> Self {
        let mut table = self.clone();
        if let Some(values) = table.fields.get_mut(name) {
            for value in values.iter_mut().flatten() {
                *value = f(*value);
            }
        }
        table
    }

    /// Centered moving average; edge windows shrink instead of padding
    ///
    /// The window for row `i` spans `[i - w/2, i + w - 1 - w/2]`, clipped to the table.
    pub fn rolling_mean_centered(&self, name: &str, window: usize) -> Self {
        let window = window.max(1);
        let before = window / 2;
        let after = window - 1 - before;
        self.rolling_mean_with(name, before, after)
    }

    /// Trailing moving average over the current row and the `window - 1` rows before it
    pub fn rolling_mean_trailing(&self, name: &str, window: usize) -> Self {
        self.rolling_mean_with(name, window.max(1) - 1, 0)
    }

    fn rolling_mean_with(&self, name: &str, before: usize, after: usize) -> Self {
        let Some(values) = self.fields.get(name) else {
            return self.clone();
        };

        let len = values.len();
        let averaged = (0..len)
            .map(|i| {
                let start = i.saturating_sub(before);
                let end = (i + after).min(len.saturating_sub(1));
                let (sum, count) = values[start..=end]
                    .iter()
                    .flatten()
                    .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
                (count > 0).then(|| sum / count as f64)
            })
            .collect();

        let mut table = self.clone();
        table.fields.insert(name.to_string(), averaged);
        table
    }

    /// Keep rows strictly before `cutoff`
    pub fn truncate_before(&self, cutoff: NaiveDateTime) -> Self {
        let keep = self.index.partition_point(|ts| *ts < cutoff);
        Self {
            index: self.index[..keep].to_vec(),
            fields: self
                .fields
                .iter()
                .map(|(name, values)| (name.clone(), values[..keep].to_vec()))
                .collect(),
        }
    }
}

#[derive(Debug, Default)]
pub struct WeatherTableBuilder {
    index: Vec<NaiveDateTime>,
    fields: BTreeMap<String, Vec<Option<f64>>>,
}

impl WeatherTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index(mut self, index: Vec<NaiveDateTime>) -> Self {
        self.index = index;
        self
    }

    pub fn field(mut self, name: &str, values: Vec<Option<f64>>) -> Self {
        self.fields.insert(name.to_string(), values);
        self
    }

    /// Convenience for fields without gaps
    pub fn dense_field(self, name: &str, values: &[f64]) -> Self {
        let values = values.iter().copied().map(Some).collect();
        self.field(name, values)
    }

    pub fn build(self) -> Result<WeatherTable> {
        WeatherTable::new(self.index, self.fields)
    }
}
