//! Blob object
//!
//! Blobs store file content. They contain only the raw bytes, without any
//! metadata like filename or permissions (those live in trees).
//!
//! ## Format
//!
//! On disk: `blob <size>\0<content>`

use crate::artifacts::objects::object::Unpackable;
use crate::artifacts::objects::object::{Object, Packable};
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::Result;
use bytes::Bytes;
use derive_new::new;
use std::io::{BufRead, Write};

/// File content, identified by the SHA-1 hash of its serialized form.
#[derive(Debug, Clone, new)]
pub struct Blob {
    data: Bytes,
}

impl Blob {
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Heuristic used for the delta BINARY flag: any NUL byte marks the
    /// content as binary.
    pub fn is_binary(&self) -> bool {
        self.data.contains(&0)
    }
}

impl Packable for Blob {
    fn serialize(&self) -> Result<Bytes> {
        let mut blob_bytes = Vec::with_capacity(self.data.len() + 16);
        let header = format!("{} {}\0", self.object_type().as_str(), self.data.len());
        blob_bytes.write_all(header.as_bytes())?;
        blob_bytes.write_all(&self.data)?;

        Ok(Bytes::from(blob_bytes))
    }
}

impl Unpackable for Blob {
    fn deserialize(reader: impl BufRead) -> Result<Self> {
        // the header has already been read
        let data = reader
            .bytes()
            .collect::<std::result::Result<Vec<u8>, std::io::Error>>()?;

        Ok(Self::new(Bytes::from(data)))
    }
}

impl Object for Blob {
    fn object_type(&self) -> ObjectType {
        ObjectType::Blob
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn serialized_form_carries_header() {
        let blob = Blob::new(Bytes::from_static(b"hello\n"));
        assert_eq!(blob.serialize().unwrap().as_ref(), b"blob 6\0hello\n");
    }

    #[test]
    fn known_content_hashes_to_known_oid() {
        // `echo 'hello' | git hash-object --stdin`
        let blob = Blob::new(Bytes::from_static(b"hello\n"));
        assert_eq!(
            blob.object_id().unwrap().to_hex(),
            "ce013625030ba8dba906f756967f9e9ca394464a"
        );
    }

    #[test]
    fn nul_byte_marks_binary() {
        assert!(Blob::new(Bytes::from_static(b"a\0b")).is_binary());
        assert!(!Blob::new(Bytes::from_static(b"plain text")).is_binary());
    }
}
