//! # tzindex-types
//!
//! Envelopes for the decoded operations that indexer handlers consume, plus a
//! few helpers for turning Michelson-encoded values into Rust scalars.

#![deny(unused_crate_dependencies)]

pub mod operation;
pub mod scalar;

pub use operation::{OperationData, OperationType, Origination, Transaction};

use thiserror::Error;

/// Result type returned when decoding operation payloads.
pub type DecodeResult<T> = core::result::Result<T, DecodeError>;

/// Error type returned when decoding operation payloads.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Operation {0} carries no parameter")]
    MissingParameter(u64),
    #[error("Operation {0} carries no storage")]
    MissingStorage(u64),
    #[error("Expected a {expected} operation, got {actual}")]
    UnexpectedOperationType {
        expected: OperationType,
        actual: OperationType,
    },
    #[error("Invalid value for `{field}`: {value:?}")]
    InvalidValue { field: &'static str, value: String },
    #[error("JSON error: {0:?}")]
    Json(#[from] serde_json::Error),
}
