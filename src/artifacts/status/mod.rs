//! Status computation
//!
//! A status query merges three snapshots of the repository (HEAD tree,
//! index, working tree) into one ordered list of per-path entries:
//!
//! - `options`: the query configuration
//! - `status_flag`: the combined per-path state bitset
//! - `entry`: one reported path with its two deltas
//! - `comparator`: the three-way per-path classification
//! - `aggregator`: orchestration, rename refinement, filtering, sorting
//! - `display`: porcelain and long-format rendering

pub mod aggregator;
pub mod comparator;
pub mod display;
pub mod entry;
pub mod options;
pub mod status_flag;
