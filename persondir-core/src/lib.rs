//! # persondir Core
//!
//! Core types, errors, and traits shared by every persondir crate.
//!
//! - **Types**: seeds, attribute records, cache keys, and the case-insensitive record view
//! - **Errors**: a single error enum with classification helpers
//! - **Constants**: well-known attribute names and store defaults
//! - **Traits**: the [`AttributeLookup`] and [`CacheStore`] seams
//!
//! ## Example
//!
//! ```rust
//! use persondir_core::{AttributeRecord, Seed};
//!
//! let seed: Seed = Seed::new().with("username", "jdoe".to_string());
//! let mut record: AttributeRecord = AttributeRecord::new();
//! record.push("mail", "jdoe@example.edu".to_string());
//!
//! assert_eq!(seed.get("username").map(String::as_str), Some("jdoe"));
//! assert_eq!(record.first("mail").map(String::as_str), Some("jdoe@example.edu"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod constants;
pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use constants::*;
pub use error::{PersonDirError, Result};
pub use traits::*;
pub use types::*;
