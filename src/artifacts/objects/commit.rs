//! Commit object
//!
//! The status engine only needs enough of a commit to reach its tree: the
//! `tree` line identifies the snapshot HEAD points at. Parent and
//! authorship lines are carried through untouched.

use crate::artifacts::objects::object::{Object, Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::{Error, Result};
use bytes::Bytes;
use derive_new::new;
use std::io::{BufRead, Write};

#[derive(Debug, Clone, new)]
pub struct Commit {
    tree: ObjectId,
    parents: Vec<ObjectId>,
    message: String,
}

impl Commit {
    pub fn tree_oid(&self) -> &ObjectId {
        &self.tree
    }

    pub fn parents(&self) -> &[ObjectId] {
        &self.parents
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Packable for Commit {
    fn serialize(&self) -> Result<Bytes> {
        let mut content = String::new();
        content.push_str(&format!("tree {}\n", self.tree));
        for parent in &self.parents {
            content.push_str(&format!("parent {parent}\n"));
        }
        // fixed identity keeps fixture commits deterministic
        content.push_str("author sift <sift@localhost> 0 +0000\n");
        content.push_str("committer sift <sift@localhost> 0 +0000\n");
        content.push('\n');
        content.push_str(&self.message);

        let mut commit_bytes = Vec::new();
        let header = format!("{} {}\0", self.object_type().as_str(), content.len());
        commit_bytes.write_all(header.as_bytes())?;
        commit_bytes.write_all(content.as_bytes())?;

        Ok(Bytes::from(commit_bytes))
    }
}

impl Unpackable for Commit {
    fn deserialize(reader: impl BufRead) -> Result<Self> {
        let mut tree = None;
        let mut parents = Vec::new();
        let mut message = String::new();
        let mut in_headers = true;

        for line in reader.lines() {
            let line = line?;

            if in_headers {
                if line.is_empty() {
                    in_headers = false;
                } else if let Some(oid) = line.strip_prefix("tree ") {
                    tree = Some(ObjectId::parse(oid)?);
                } else if let Some(oid) = line.strip_prefix("parent ") {
                    parents.push(ObjectId::parse(oid)?);
                }
                // author/committer and extension headers are irrelevant here
            } else {
                message.push_str(&line);
                message.push('\n');
            }
        }

        let tree =
            tree.ok_or_else(|| Error::MalformedObject("commit without tree line".into()))?;

        Ok(Commit::new(tree, parents, message))
    }
}

impl Object for Commit {
    fn object_type(&self) -> ObjectType {
        ObjectType::Commit
    }
}
