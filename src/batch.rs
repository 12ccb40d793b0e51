use std::io::{Read, Write};

use log::{info, warn};
use serde::Serialize;

use crate::artifacts::Predictor;
use crate::error::PredictError;
use crate::records::HeartRecord;

#[derive(Debug, Serialize)]
struct BatchRow {
    row: usize,
    label: Option<i32>,
    risk: Option<&'static str>,
    error: Option<String>,
}

/// Predict every record read from `input` and write one result row per record.
///
/// A record that fails to parse or predict gets its error text in the `error`
/// column; the remaining rows are still processed. Returns the number of
/// failed rows.
pub fn run<R: Read, W: Write>(
    predictor: &Predictor,
    input: R,
    output: W,
) -> Result<usize, PredictError> {
    let mut reader = csv::Reader::from_reader(input);
    let mut writer = csv::Writer::from_writer(output);
    let mut failed = 0;
    let mut total = 0;

    for (row, result) in reader.deserialize::<HeartRecord>().enumerate() {
        total += 1;
        let outcome = result
            .map_err(PredictError::from)
            .and_then(|record| predictor.predict(&record));
        let line = match outcome {
            Ok(risk) => BatchRow {
                row,
                label: Some(risk.label()),
                risk: Some(risk.name()),
                error: None,
            },
            Err(e) => {
                warn!("row {}: {}", row, e);
                failed += 1;
                BatchRow {
                    row,
                    label: None,
                    risk: None,
                    error: Some(e.to_string()),
                }
            }
        };
        writer.serialize(line)?;
    }
    writer.flush().map_err(csv::Error::from)?;

    info!("predicted {} rows, {} failed", total, failed);
    Ok(failed)
}
