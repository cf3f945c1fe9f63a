//! Data structures and algorithms of the status engine.
//!
//! - `objects`: loose object types (blob, tree, commit) and identities
//! - `index`: index wire format (entries, header, trailer checksum)
//! - `ignore`: ignore-rule matching for the working-tree scan
//! - `diff`: delta records and rename classification
//! - `status`: three-way comparison and status aggregation

pub mod diff;
pub mod ignore;
pub mod index;
pub mod objects;
pub mod status;
