//! Object identifier (SHA-1 hash)
//!
//! Object ids uniquely identify all stored objects (blobs, trees, commits).
//! They are held as the raw 20-byte digest; hex is a presentation format.
//!
//! ## Format
//!
//! - Full: 40 hex characters (e.g., "abc123...def")
//! - Short: First 7 characters (e.g., "abc123")
//!
//! ## Storage
//!
//! Objects are stored in `.git/objects/<first-2-chars>/<remaining-38-chars>`

use crate::artifacts::objects::{OBJECT_ID_HEX_LENGTH, OBJECT_ID_RAW_LENGTH};
use crate::errors::{Error, Result};
use std::fmt::Write as _;
use std::io;
use std::path::PathBuf;

/// Content-derived fixed-width identifier for a stored object.
///
/// Ordering and equality are byte-lexicographic over the raw digest, which
/// coincides with ordering over the lowercase hex rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct ObjectId([u8; OBJECT_ID_RAW_LENGTH]);

impl ObjectId {
    /// Parse and validate an object id from a hex string.
    ///
    /// Fails with `InvalidObjectId` when the string is not exactly 40
    /// characters or contains non-hex characters. Accepts mixed case.
    pub fn parse(id: &str) -> Result<Self> {
        if id.len() != OBJECT_ID_HEX_LENGTH {
            return Err(Error::InvalidObjectId(format!(
                "expected {} hex characters, got {}",
                OBJECT_ID_HEX_LENGTH,
                id.len()
            )));
        }

        let mut raw = [0u8; OBJECT_ID_RAW_LENGTH];
        for (i, chunk) in id.as_bytes().chunks_exact(2).enumerate() {
            let pair = std::str::from_utf8(chunk)
                .map_err(|_| Error::InvalidObjectId(id.to_string()))?;
            raw[i] = u8::from_str_radix(pair, 16)
                .map_err(|_| Error::InvalidObjectId(id.to_string()))?;
        }

        Ok(Self(raw))
    }

    /// Construct from a raw 20-byte digest.
    pub fn from_raw(raw: [u8; OBJECT_ID_RAW_LENGTH]) -> Self {
        Self(raw)
    }

    /// The all-zero id, used as a placeholder for content not hashed yet.
    pub fn zero() -> Self {
        Self([0u8; OBJECT_ID_RAW_LENGTH])
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; OBJECT_ID_RAW_LENGTH]
    }

    /// Lowercase hex rendering of the full digest.
    pub fn to_hex(&self) -> String {
        let mut hex = String::with_capacity(OBJECT_ID_HEX_LENGTH);
        for byte in &self.0 {
            // writing to a String cannot fail
            let _ = write!(hex, "{byte:02x}");
        }
        hex
    }

    /// Write the raw 20-byte digest to the given writer.
    ///
    /// Used when serializing tree objects and index entries.
    pub fn write_raw_to<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.0)?;
        Ok(())
    }

    /// Read a raw 20-byte digest from the given reader.
    pub fn read_raw_from<R: io::Read + ?Sized>(reader: &mut R) -> Result<Self> {
        let mut raw = [0u8; OBJECT_ID_RAW_LENGTH];
        reader.read_exact(&mut raw)?;
        Ok(Self(raw))
    }

    /// Convert to the fan-out path used by the loose object store.
    ///
    /// Splits the hash as `XX/YYYYYY...` where XX is the first 2 hex chars.
    pub fn to_path(&self) -> PathBuf {
        let hex = self.to_hex();
        let (dir, file) = hex.split_at(2);
        PathBuf::from(dir).join(file)
    }

    /// Abbreviated form: first 7 hex characters.
    pub fn to_short_oid(&self) -> String {
        self.to_hex().split_at(7).0.to_string()
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}
