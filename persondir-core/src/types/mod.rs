//! Domain types for persondir.
//!
//! - [`Seed`]: partial identity supplied by a caller
//! - [`AttributeRecord`]: resolved attribute name → values mapping
//! - [`CacheKey`]: structural key derived from a seed
//! - [`CaseInsensitiveRecord`]: record view that ignores attribute-name case

mod case_insensitive;
mod key;
mod record;
mod seed;

use std::fmt::Debug;
use std::hash::Hash;

pub use case_insensitive::*;
pub use key::*;
pub use record::*;
pub use seed::*;

/// Bound shared by every attribute value type.
///
/// Values must be hashable and comparable so that they can take part in
/// cache keys, and shareable so that records can cross task boundaries.
pub trait AttributeValue: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

impl<T> AttributeValue for T where T: Clone + Eq + Hash + Debug + Send + Sync + 'static {}
