//! Explore Types
//!
//! This crate defines the plain data exchanged between the explore index and the
//! collaborators that feed it: playlist entries, keyed-database items and core
//! descriptions. Keeping them here lets providers depend on the types without
//! pulling in the index itself.

#![deny(clippy::all)]
#![deny(missing_docs)]

mod types;
pub use types::{CoreInfo, FieldValue, PlaylistEntry};
