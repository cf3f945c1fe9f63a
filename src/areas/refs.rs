use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::Result;
use std::path::Path;

/// Read-only view of `.git/HEAD` and the references it points at.
#[derive(Debug)]
pub struct Refs {
    git_path: Box<Path>,
}

impl Refs {
    pub fn new(git_path: Box<Path>) -> Self {
        Refs { git_path }
    }

    /// Resolve HEAD to a commit id.
    ///
    /// Returns `None` for an unborn branch (HEAD names a ref that does not
    /// exist yet) and for a missing HEAD file, so an empty repository
    /// produces an empty HEAD tree rather than an error.
    pub fn read_head(&self) -> Result<Option<ObjectId>> {
        self.resolve(&self.git_path.join("HEAD"))
    }

    fn resolve(&self, ref_path: &Path) -> Result<Option<ObjectId>> {
        let content = match std::fs::read_to_string(ref_path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let content = content.trim();

        if let Some(target) = content.strip_prefix("ref: ") {
            self.resolve(&self.git_path.join(target))
        } else {
            Ok(Some(ObjectId::parse(content)?))
        }
    }
}
