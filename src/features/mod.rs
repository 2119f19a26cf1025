//! Feature extraction
//!
//! Turns a transaction's graph neighborhood into the six-field numeric
//! vector consumed by scoring, and writes the bulk feature table used for
//! training.

pub mod extractor;
pub mod table;
pub mod vector;
pub mod view;

pub use extractor::{parse_hour, FeatureExtractor, TransactionContext};
pub use table::{feature_table_header, write_feature_table};
pub use vector::{FeatureVector, FEATURE_COUNT, FEATURE_NAMES};
pub use view::{transaction_view, TransactionView};
