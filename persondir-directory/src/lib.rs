//! # persondir Directory
//!
//! Person directories implementing [`AttributeLookup`](persondir_core::AttributeLookup).
//!
//! - **Memory**: records held in a concurrent map, indexed on one attribute
//! - **File**: records loaded from a JSON file into a memory directory
//!
//! ## Example
//!
//! ```rust,ignore
//! use persondir_directory::FileDirectory;
//!
//! let directory = FileDirectory::open("people.json").await?;
//! let record = directory.resolve(&seed).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod file;
mod memory;

pub use file::FileDirectory;
pub use memory::MemoryDirectory;
