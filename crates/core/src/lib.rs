//! Tether Core - Core types shared by the Tether relation view crates.
//!
//! This crate provides the foundational types used across the workspace:
//!
//! - `Value`: A single table cell (Null, Boolean, Int64, Float64, String)
//! - `CaseSensitivity`: How string comparisons and wildcard patterns treat case
//! - `pattern_match`: Wildcard (`*`, `?`) matching used by LIKE clauses
//! - `Error`: Error types for table and view operations
//!
//! # Example
//!
//! ```rust
//! use tether_core::{CaseSensitivity, Value};
//! use core::cmp::Ordering;
//!
//! let a = Value::from("Alice");
//! let b = Value::from("alice");
//!
//! assert_ne!(a, b);
//! assert_eq!(a.compare(&b, CaseSensitivity::Insensitive), Some(Ordering::Equal));
//! assert_eq!(Value::Null.compare(&Value::Null, CaseSensitivity::Sensitive), None);
//! ```

#![no_std]

extern crate alloc;

mod error;
pub mod pattern_match;
mod value;

pub use error::{Error, Result, TableRole};
pub use value::{CaseSensitivity, Value};
