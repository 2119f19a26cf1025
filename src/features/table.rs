//! Persisted feature table
//!
//! One CSV row per transaction: `transaction_id` followed by the six features
//! in their fixed order. This is the artifact handed to model training.

use super::vector::{FeatureVector, FEATURE_NAMES};
use std::io::{self, Write};

/// Header line of the feature table
pub fn feature_table_header() -> String {
    std::iter::once("transaction_id")
        .chain(FEATURE_NAMES)
        .collect::<Vec<_>>()
        .join(",")
}

/// Write the header and one row per `(transaction_id, vector)` pair
pub fn write_feature_table<W: Write>(
    writer: &mut W,
    rows: &[(String, FeatureVector)],
) -> io::Result<usize> {
    writeln!(writer, "{}", feature_table_header())?;
    for (transaction_id, vector) in rows {
        write!(writer, "{}", escape_field(transaction_id))?;
        for value in vector.to_array() {
            write!(writer, ",{}", value)?;
        }
        writeln!(writer)?;
    }
    writer.flush()?;
    Ok(rows.len())
}

fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
