use crate::errors::{Error, Result};

/// Mode of a tracked entry, as stored in trees and the index.
#[derive(Debug, Clone, Copy, Eq, Ord, Default, PartialEq, PartialOrd, Hash)]
pub enum EntryMode {
    #[default]
    Regular,
    Executable,
    Symlink,
    Directory,
    Submodule,
}

/// Coarse partition of modes driving typechange classification: flipping
/// the executable bit is a modification, crossing classes is a typechange.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ModeClass {
    Blob,
    Link,
    Tree,
    Gitlink,
}

impl EntryMode {
    pub fn as_str(&self) -> &str {
        match self {
            EntryMode::Regular => "100644",
            EntryMode::Executable => "100755",
            EntryMode::Symlink => "120000",
            EntryMode::Directory => "40000",
            EntryMode::Submodule => "160000",
        }
    }

    pub fn as_u32(&self) -> u32 {
        match self {
            EntryMode::Regular => 0o100644,
            EntryMode::Executable => 0o100755,
            EntryMode::Symlink => 0o120000,
            EntryMode::Directory => 0o40000,
            EntryMode::Submodule => 0o160000,
        }
    }

    pub fn try_from_u32(mode: u32) -> Result<Self> {
        match mode {
            0o100644 => Ok(EntryMode::Regular),
            0o100755 => Ok(EntryMode::Executable),
            0o120000 => Ok(EntryMode::Symlink),
            0o40000 => Ok(EntryMode::Directory),
            0o160000 => Ok(EntryMode::Submodule),
            _ => Err(Error::MalformedObject(format!("invalid entry mode {mode:o}"))),
        }
    }

    pub fn from_octal_str(mode: &str) -> Result<Self> {
        let raw = u32::from_str_radix(mode, 8)
            .map_err(|_| Error::MalformedObject(format!("invalid entry mode {mode:?}")))?;
        Self::try_from_u32(raw)
    }

    pub fn class(&self) -> ModeClass {
        match self {
            EntryMode::Regular | EntryMode::Executable => ModeClass::Blob,
            EntryMode::Symlink => ModeClass::Link,
            EntryMode::Directory => ModeClass::Tree,
            EntryMode::Submodule => ModeClass::Gitlink,
        }
    }

    pub fn is_tree(&self) -> bool {
        matches!(self, EntryMode::Directory)
    }

    pub fn is_submodule(&self) -> bool {
        matches!(self, EntryMode::Submodule)
    }
}
