use std::num::ParseIntError;

use thiserror::Error;

/// Why a webhook signature was not accepted.
///
/// Callers answer every variant the same way (403, no body); the detail is
/// for logs only.
#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("unexpected signature segment '{0}'")]
    MalformedSegment(String),

    #[error("signature has more than one '{0}'")]
    DuplicateKey(&'static str),

    #[error("failed to parse timestamp '{value}': {source}")]
    InvalidTimestamp {
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("failed to decode signature value '{value}' as hex: {source}")]
    InvalidMac {
        value: String,
        #[source]
        source: hex::FromHexError,
    },

    #[error("signature '{0}' incomplete")]
    Incomplete(String),

    #[error("signature doesn't match")]
    Mismatch,

    #[error("signature timestamp {timestamp} is {age}s away from now (max {max_age}s)")]
    Stale { timestamp: i64, age: u64, max_age: u64 },
}
