//! Graph traversal algorithms
//!
//! Currently the investigative fraud-path search between accounts.

pub mod fraud_paths;

pub use fraud_paths::{find_fraud_paths, FraudPath, PathFinder, PathStep, FRAUD_PATH_RELS};
