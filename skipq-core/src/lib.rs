//! Core types and traits for SkipQ
//!
//! This crate contains the fundamental types and error handling shared by the
//! skip-list priority queue and its benchmark harness. It provides:
//!
//! - Common error types with [`Error`] and [`Result`]
//! - The key type used throughout the queue
//!
//! # Example
//!
//! ```
//! use skipq_core::Key;
//!
//! let key: Key = 42;
//! ```

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::*;
