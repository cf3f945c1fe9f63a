//! Delta records and rename classification.

pub mod delta;
pub mod rename;
