use std::collections::HashMap;

use log::debug;

use crate::records::{Attribute, HeartRecord, Value};

/// Expand a record into named columns the way one-hot encoding of a single
/// row frame does: numeric attributes keep their column, every categorical
/// attribute yields exactly one `attribute_value` column set to 1.
pub fn encode(record: &HeartRecord) -> Vec<(String, f64)> {
    Attribute::ALL
        .iter()
        .map(|&attribute| match record.value(attribute) {
            Value::Number(x) => (attribute.column().to_string(), x),
            Value::Category(category) => (attribute.indicator(category), 1.0),
        })
        .collect()
}

/// The ordered column list the classifier was trained on.
///
/// The name to position table is built once here, so aligning a record is a
/// lookup per encoded column.
#[derive(Debug, Clone)]
pub struct ExpectedSchema {
    columns: Vec<String>,
    positions: HashMap<String, usize>,
}

impl ExpectedSchema {
    /// Fails on an empty list or a repeated column name.
    pub fn new(columns: Vec<String>) -> Result<Self, String> {
        if columns.is_empty() {
            return Err("expected schema has no columns".to_string());
        }
        let mut positions = HashMap::with_capacity(columns.len());
        for (i, name) in columns.iter().enumerate() {
            if positions.insert(name.clone(), i).is_some() {
                return Err(format!("column {:?} appears more than once", name));
            }
        }
        Ok(ExpectedSchema { columns, positions })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn position(&self, column: &str) -> Option<usize> {
        self.positions.get(column).copied()
    }

    /// Reindex named columns against the schema: absent columns are 0,
    /// unknown columns are dropped, order is the schema's.
    pub fn reindex<'a, I>(&self, columns: I) -> FeatureVector
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let mut values = vec![0.0; self.columns.len()];
        for (name, value) in columns {
            match self.position(name) {
                Some(i) => values[i] = value,
                None => debug!("dropping column {} not in expected schema", name),
            }
        }
        FeatureVector { values }
    }

    pub fn align(&self, record: &HeartRecord) -> FeatureVector {
        let encoded = encode(record);
        self.reindex(encoded.iter().map(|(name, value)| (name.as_str(), *value)))
    }

    /// Pair each value of an aligned vector with its column name.
    pub fn named<'a>(&'a self, vector: &'a FeatureVector) -> impl Iterator<Item = (&'a str, f64)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(vector.values.iter().copied())
    }
}

/// A record aligned to an [`ExpectedSchema`]: one value per schema column.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: Vec<f64>,
}

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
}

#[cfg(test)]
pub(crate) fn training_columns() -> Vec<String> {
    [
        "Age",
        "RestingBP",
        "Cholesterol",
        "FastingBS",
        "MaxHR",
        "Oldpeak",
        "Sex_M",
        "ChestPainType_ATA",
        "ChestPainType_NAP",
        "ChestPainType_TA",
        "RestingECG_Normal",
        "RestingECG_ST",
        "ExerciseAngina_Y",
        "ST_Slope_Flat",
        "ST_Slope_Up",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
