use crate::artifacts::index::{HEADER_SIZE, SIGNATURE, VERSION};
use crate::artifacts::objects::object::Packable;
use crate::errors::{Error, Result};
use byteorder::{ByteOrder, WriteBytesExt};
use bytes::Bytes;
use derive_new::new;
use std::io::Write;

#[derive(Debug, Clone, new)]
pub struct IndexHeader {
    pub(crate) marker: String,
    pub(crate) version: u32,
    pub(crate) entries_count: u32,
}

impl IndexHeader {
    pub(crate) fn empty() -> Self {
        IndexHeader {
            marker: String::from(SIGNATURE),
            version: VERSION,
            entries_count: 0,
        }
    }

    pub(crate) fn parse(bytes: &Bytes) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(Error::CorruptIndex("truncated header".into()));
        }

        let marker = String::from_utf8(bytes[0..4].to_vec())
            .map_err(|_| Error::CorruptIndex("invalid marker in header".into()))?;
        let version = byteorder::NetworkEndian::read_u32(&bytes[4..8]);
        let entries_count = byteorder::NetworkEndian::read_u32(&bytes[8..12]);

        Ok(IndexHeader {
            marker,
            version,
            entries_count,
        })
    }
}

impl Packable for IndexHeader {
    fn serialize(&self) -> Result<Bytes> {
        let mut bytes = Vec::new();
        bytes.write_all(self.marker.as_bytes())?;
        bytes.write_u32::<byteorder::NetworkEndian>(self.version)?;
        bytes.write_u32::<byteorder::NetworkEndian>(self.entries_count)?;

        Ok(Bytes::from(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn header_round_trips() {
        let header = IndexHeader::new(SIGNATURE.to_string(), VERSION, 42);
        let bytes = header.serialize().unwrap();
        let parsed = IndexHeader::parse(&bytes).unwrap();

        assert_eq!(parsed.marker, SIGNATURE);
        assert_eq!(parsed.version, VERSION);
        assert_eq!(parsed.entries_count, 42);
    }

    #[test]
    fn truncated_header_is_corrupt() {
        assert!(matches!(
            IndexHeader::parse(&Bytes::from_static(b"DIRC")),
            Err(Error::CorruptIndex(_))
        ));
    }
}
