//! Core repository components
//!
//! This module contains the long-lived places repository state lives in:
//!
//! - `database`: Object database holding blobs, trees and commits
//! - `index`: Staging area snapshot (read, plus stat-cache refresh)
//! - `refs`: HEAD resolution
//! - `repository`: High-level handle and status entry points
//! - `workspace`: Working directory scanning and hashing

pub mod database;
pub mod index;
pub mod refs;
pub mod repository;
pub mod workspace;
