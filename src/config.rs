use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::artifacts::ArtifactPaths;
use crate::records::HeartRecord;

#[derive(Parser, Debug)]
#[command(author, version, about = "Heart stroke risk predictor", long_about = None)]
#[command(propagate_version = true)]
pub struct HeartArgs {
    #[arg(long, global = true, env = "HEART_CLASSIFIER", default_value = "knn_heart.csv",
    help = "Reference set of the nearest-neighbors classifier (.csv or .parquet)")]
    pub classifier: PathBuf,
    #[arg(long, global = true, env = "HEART_SCALER", default_value = "scaler.json",
    help = "Fitted standard scaler")]
    pub scaler: PathBuf,
    #[arg(long, global = true, env = "HEART_COLUMNS", default_value = "columns.json",
    help = "Expected feature columns, in training order")]
    pub columns: PathBuf,
    #[arg(long, global = true, env = "HEART_NEIGHBORS", default_value_t = 5,
    help = "Number of neighbors that vote")]
    pub neighbors: usize,
    #[arg(long, global = true, default_value = "HeartDisease",
    help = "Label column of the reference set")]
    pub label_column: String,
    #[arg(short, long, global = true, action = clap::ArgAction::Count,
    help = "Verbose level")]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

impl HeartArgs {
    pub fn artifact_paths(&self) -> ArtifactPaths {
        ArtifactPaths {
            classifier: self.classifier.clone(),
            scaler: self.scaler.clone(),
            columns: self.columns.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the prediction form over HTTP
    Serve {
        #[arg(long, env = "HEART_HOST", default_value = "127.0.0.1")]
        host: String,
        #[arg(long, env = "HEART_PORT", default_value_t = 8501)]
        port: u16,
    },
    /// Predict a single record given on the command line
    Predict(RecordArgs),
    /// Predict every record of a CSV file and print the labels as CSV
    Batch {
        #[arg(help = "CSV file with the eleven attribute columns")]
        input: PathBuf,
    },
}

#[derive(Args, Debug, Clone)]
pub struct RecordArgs {
    #[arg(long, default_value_t = 45)]
    pub age: u32,
    #[arg(long, default_value = "M")]
    pub sex: String,
    #[arg(long, default_value = "ATA")]
    pub chest_pain_type: String,
    #[arg(long, default_value_t = 120)]
    pub resting_bp: u32,
    #[arg(long, default_value_t = 200)]
    pub cholesterol: u32,
    #[arg(long, default_value_t = 0)]
    pub fasting_bs: u8,
    #[arg(long, default_value = "Normal")]
    pub resting_ecg: String,
    #[arg(long, default_value_t = 150)]
    pub max_hr: u32,
    #[arg(long, default_value = "Y")]
    pub exercise_angina: String,
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub oldpeak: f64,
    #[arg(long, default_value = "Up")]
    pub st_slope: String,
}

impl From<RecordArgs> for HeartRecord {
    fn from(a: RecordArgs) -> Self {
        HeartRecord {
            age: a.age,
            sex: a.sex,
            chest_pain_type: a.chest_pain_type,
            resting_bp: a.resting_bp,
            cholesterol: a.cholesterol,
            fasting_bs: a.fasting_bs,
            resting_ecg: a.resting_ecg,
            max_hr: a.max_hr,
            exercise_angina: a.exercise_angina,
            oldpeak: a.oldpeak,
            st_slope: a.st_slope,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::sample_record;

    #[test]
    fn defaults_point_at_working_directory() {
        let args = HeartArgs::try_parse_from(["heart-risk", "serve"]).unwrap();
        let paths = args.artifact_paths();
        assert_eq!(paths.classifier, PathBuf::from("knn_heart.csv"));
        assert_eq!(paths.scaler, PathBuf::from("scaler.json"));
        assert_eq!(paths.columns, PathBuf::from("columns.json"));
        assert_eq!(args.neighbors, 5);
        assert!(matches!(args.command, Command::Serve { port: 8501, .. }));
    }

    #[test]
    fn predict_defaults_match_form_defaults() {
        let args = HeartArgs::try_parse_from(["heart-risk", "predict"]).unwrap();
        let Command::Predict(record) = args.command else {
            panic!("expected predict");
        };
        let mut expected = sample_record();
        expected.exercise_angina = "Y".to_string();
        assert_eq!(HeartRecord::from(record), expected);
    }

    #[test]
    fn predict_takes_negative_oldpeak() {
        let args =
            HeartArgs::try_parse_from(["heart-risk", "predict", "--oldpeak", "-0.5", "--sex", "F"])
                .unwrap();
        let Command::Predict(record) = args.command else {
            panic!("expected predict");
        };
        let record = HeartRecord::from(record);
        assert_eq!(record.oldpeak, -0.5);
        assert_eq!(record.sex, "F");
    }

    #[test]
    fn verbosity_counts_flags() {
        let args = HeartArgs::try_parse_from(["heart-risk", "-vv", "batch", "in.csv"]).unwrap();
        assert_eq!(args.verbose, 2);
    }
}
