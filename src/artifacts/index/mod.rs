//! Index file format
//!
//! The index (staging area) records the snapshot that would be committed
//! next. The engine reads it to build the middle layer of the three-way
//! comparison.
//!
//! ## File Format (Version 2)
//!
//! ```text
//! Header (12 bytes):
//!   - Signature: "DIRC" (4 bytes)
//!   - Version: 2 (4 bytes)
//!   - Entry count (4 bytes)
//!
//! Entries (variable length):
//!   - Each entry padded to 8-byte alignment
//!   - Contains metadata, stage bits and path
//!
//! Checksum (20 bytes):
//!   - SHA-1 hash of all preceding bytes
//! ```

pub mod checksum;
pub mod index_entry;
pub mod index_header;

/// Size of SHA-1 checksum in bytes
pub const CHECKSUM_SIZE: usize = 20;

/// Size of index header in bytes
pub const HEADER_SIZE: usize = 12;

/// Magic signature identifying index files
pub const SIGNATURE: &str = "DIRC";

/// Index file format version
pub const VERSION: u32 = 2;
