use serde::{Deserialize, Serialize};

/// One submission of the eleven clinical measurements.
///
/// Field names follow the column names of the training frame so the same
/// struct reads batch CSV files and JSON bodies unchanged. Categorical values
/// stay free text: anything outside an attribute's option set is carried
/// through and dropped later by reindexing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartRecord {
    #[serde(rename = "Age")]
    pub age: u32,
    #[serde(rename = "Sex")]
    pub sex: String,
    #[serde(rename = "ChestPainType")]
    pub chest_pain_type: String,
    #[serde(rename = "RestingBP")]
    pub resting_bp: u32,
    #[serde(rename = "Cholesterol")]
    pub cholesterol: u32,
    #[serde(rename = "FastingBS")]
    pub fasting_bs: u8,
    #[serde(rename = "RestingECG")]
    pub resting_ecg: String,
    #[serde(rename = "MaxHR")]
    pub max_hr: u32,
    #[serde(rename = "ExerciseAngina")]
    pub exercise_angina: String,
    #[serde(rename = "Oldpeak")]
    pub oldpeak: f64,
    #[serde(rename = "ST_Slope")]
    pub st_slope: String,
}

/// How an attribute turns into model columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Kept as a single numeric column named after the attribute.
    Passthrough,
    /// Expanded into one `attribute_value` indicator column per category.
    Indicator,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value<'a> {
    Number(f64),
    Category(&'a str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    Age,
    RestingBp,
    Cholesterol,
    FastingBs,
    MaxHr,
    Oldpeak,
    Sex,
    ChestPainType,
    RestingEcg,
    ExerciseAngina,
    StSlope,
}

impl Attribute {
    /// Numeric attributes first, then the expanded ones, which is the column
    /// order one-hot expansion of the training frame produced.
    pub const ALL: [Attribute; 11] = [
        Attribute::Age,
        Attribute::RestingBp,
        Attribute::Cholesterol,
        Attribute::FastingBs,
        Attribute::MaxHr,
        Attribute::Oldpeak,
        Attribute::Sex,
        Attribute::ChestPainType,
        Attribute::RestingEcg,
        Attribute::ExerciseAngina,
        Attribute::StSlope,
    ];

    pub fn column(self) -> &'static str {
        match self {
            Attribute::Age => "Age",
            Attribute::RestingBp => "RestingBP",
            Attribute::Cholesterol => "Cholesterol",
            Attribute::FastingBs => "FastingBS",
            Attribute::MaxHr => "MaxHR",
            Attribute::Oldpeak => "Oldpeak",
            Attribute::Sex => "Sex",
            Attribute::ChestPainType => "ChestPainType",
            Attribute::RestingEcg => "RestingECG",
            Attribute::ExerciseAngina => "ExerciseAngina",
            Attribute::StSlope => "ST_Slope",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Attribute::Age => "Age",
            Attribute::RestingBp => "Resting BP (mm Hg)",
            Attribute::Cholesterol => "Cholesterol (mg/dL)",
            Attribute::FastingBs => "Fasting Blood Sugar > 120 mg/dL",
            Attribute::MaxHr => "Max Heart Rate",
            Attribute::Oldpeak => "Oldpeak (ST Depression)",
            Attribute::Sex => "Sex",
            Attribute::ChestPainType => "Chest Pain Type",
            Attribute::RestingEcg => "Resting ECG",
            Attribute::ExerciseAngina => "Exercise Angina",
            Attribute::StSlope => "ST Slope",
        }
    }

    /// The enumerated option set offered for a categorical attribute.
    pub fn options(self) -> Option<&'static [&'static str]> {
        match self {
            Attribute::Sex => Some(&["M", "F"]),
            Attribute::ChestPainType => Some(&["ATA", "NAP", "TA", "ASY"]),
            Attribute::FastingBs => Some(&["0", "1"]),
            Attribute::RestingEcg => Some(&["Normal", "ST", "LVH"]),
            Attribute::ExerciseAngina => Some(&["Y", "N"]),
            Attribute::StSlope => Some(&["Up", "Flat", "Down"]),
            _ => None,
        }
    }

    // FastingBS is chosen from a select but the training frame held it as an
    // integer, so it was never expanded.
    pub fn encoding(self) -> Encoding {
        match self {
            Attribute::Sex
            | Attribute::ChestPainType
            | Attribute::RestingEcg
            | Attribute::ExerciseAngina
            | Attribute::StSlope => Encoding::Indicator,
            _ => Encoding::Passthrough,
        }
    }

    /// Name of the indicator column for `value`, e.g. `ST_Slope_Up`.
    pub fn indicator(self, value: &str) -> String {
        format!("{}_{}", self.column(), value)
    }
}

impl HeartRecord {
    pub fn value(&self, attribute: Attribute) -> Value<'_> {
        match attribute {
            Attribute::Age => Value::Number(self.age as f64),
            Attribute::RestingBp => Value::Number(self.resting_bp as f64),
            Attribute::Cholesterol => Value::Number(self.cholesterol as f64),
            Attribute::FastingBs => Value::Number(self.fasting_bs as f64),
            Attribute::MaxHr => Value::Number(self.max_hr as f64),
            Attribute::Oldpeak => Value::Number(self.oldpeak),
            Attribute::Sex => Value::Category(&self.sex),
            Attribute::ChestPainType => Value::Category(&self.chest_pain_type),
            Attribute::RestingEcg => Value::Category(&self.resting_ecg),
            Attribute::ExerciseAngina => Value::Category(&self.exercise_angina),
            Attribute::StSlope => Value::Category(&self.st_slope),
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_record() -> HeartRecord {
    HeartRecord {
        age: 45,
        sex: "M".to_string(),
        chest_pain_type: "ATA".to_string(),
        resting_bp: 120,
        cholesterol: 200,
        fasting_bs: 0,
        resting_ecg: "Normal".to_string(),
        max_hr: 150,
        exercise_angina: "N".to_string(),
        oldpeak: 0.0,
        st_slope: "Up".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indicator_columns_use_attribute_prefix() {
        assert_eq!(Attribute::StSlope.indicator("Up"), "ST_Slope_Up");
        assert_eq!(Attribute::Sex.indicator("M"), "Sex_M");
    }

    #[test]
    fn fasting_blood_sugar_is_selected_but_not_expanded() {
        assert_eq!(Attribute::FastingBs.options(), Some(&["0", "1"][..]));
        assert_eq!(Attribute::FastingBs.encoding(), Encoding::Passthrough);
        assert_eq!(
            sample_record().value(Attribute::FastingBs),
            Value::Number(0.0)
        );
    }

    #[test]
    fn record_reads_training_column_names() {
        let json = r#"{"Age":45,"Sex":"M","ChestPainType":"ATA","RestingBP":120,
            "Cholesterol":200,"FastingBS":0,"RestingECG":"Normal","MaxHR":150,
            "ExerciseAngina":"N","Oldpeak":0.0,"ST_Slope":"Up"}"#;
        let record: HeartRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record, sample_record());
    }

    #[test]
    fn every_attribute_has_one_kind_of_value() {
        let record = sample_record();
        for attribute in Attribute::ALL {
            match (attribute.encoding(), record.value(attribute)) {
                (Encoding::Indicator, Value::Category(_)) => {}
                (Encoding::Passthrough, Value::Number(_)) => {}
                other => panic!("{:?} has mismatched value {:?}", attribute, other),
            }
        }
    }
}
