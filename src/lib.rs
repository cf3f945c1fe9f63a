//! A repository status and diff engine.
//!
//! `sift` reads real git-format repositories (loose objects, v2 index, HEAD
//! refs) and computes working-tree status with rename detection, without
//! shelling out to git or binding a native library.
//!
//! The crate is split the same way the data is:
//!
//! - `areas`: the long-lived places state lives in (repository handle,
//!   object database, index, workspace, refs)
//! - `artifacts`: the values flowing between them (objects, index entries,
//!   deltas, status classifications)

pub mod areas;
pub mod artifacts;
pub mod errors;
pub mod runtime;
