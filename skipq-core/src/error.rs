//! Error vocabulary shared by the queue and its benchmark driver
//!
//! The queue's hot paths never fail — `insert` retries internally and
//! `delete_min`/`remove` express absence as `None` — so errors here cover
//! only the fallible edges: constructing a queue from an invalid
//! configuration, handing in a key that collides with the tail sentinel,
//! and I/O from the benchmark driver's output plumbing.

use crate::types::Key;
use thiserror::Error;

/// The error type for the fallible edges of the SkipQ API
#[derive(Error, Debug)]
pub enum Error {
    /// An I/O error occurred (benchmark harness output, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A `SkipListConfig` value was out of range
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A key outside the representable range was supplied (collides with the
    /// tail sentinel)
    #[error("key out of range: {0}")]
    KeyOutOfRange(Key),
}

/// A specialized Result type for SkipQ operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_out_of_range_message() {
        let err = Error::KeyOutOfRange(u64::MAX);
        assert_eq!(err.to_string(), "key out of range: 18446744073709551615");
    }

    #[test]
    fn invalid_config_message() {
        let err = Error::InvalidConfig("num_levels must be >= 1".to_string());
        assert_eq!(
            err.to_string(),
            "invalid configuration: num_levels must be >= 1"
        );
    }
}
