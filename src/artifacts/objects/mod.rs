pub mod blob;
pub mod commit;
pub mod entry_mode;
pub mod object;
pub mod object_id;
pub mod object_type;
pub mod tree;

/// Length of an object id rendered as hex characters
pub const OBJECT_ID_HEX_LENGTH: usize = 40;

/// Length of an object id in raw bytes (SHA-1 digest width)
pub const OBJECT_ID_RAW_LENGTH: usize = 20;
