use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::refs::Refs;
use crate::areas::workspace::{CancelFlag, Workspace};
use crate::artifacts::status::aggregator;
use crate::artifacts::status::entry::StatusEntry;
use crate::artifacts::status::options::StatusOptions;
use crate::errors::{Error, Result};
use crate::runtime;
use std::path::Path;

/// The one long-lived handle: a working tree plus its `.git` areas.
///
/// The handle is read-only for status computation; concurrent queries may
/// share one instance freely. Each query loads its own index snapshot.
#[derive(Debug)]
pub struct Repository {
    path: Box<Path>,
    git_path: Box<Path>,
    database: Database,
    workspace: Workspace,
    refs: Refs,
}

impl Repository {
    /// Open an existing repository.
    ///
    /// Fails with `NotFound` when the path does not exist and with
    /// `NotARepository` when it exists but carries no `.git` directory.
    /// The first open initializes the library runtime; after
    /// `runtime::shutdown()` every open fails with `Shutdown`.
    pub fn open(path: &Path) -> Result<Self> {
        runtime::ensure_ready()?;

        let path = match path.canonicalize() {
            Ok(path) => path,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::NotFound(path.to_path_buf()));
            }
            Err(err) => return Err(err.into()),
        };

        let git_path = path.join(".git");
        if !git_path.is_dir() {
            return Err(Error::NotARepository(path));
        }

        let database = Database::new(git_path.join("objects").into_boxed_path());
        let workspace = Workspace::new(path.clone().into_boxed_path());
        let refs = Refs::new(git_path.clone().into_boxed_path());

        Ok(Repository {
            path: path.into_boxed_path(),
            git_path: git_path.into_boxed_path(),
            database,
            workspace,
            refs,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn git_path(&self) -> &Path {
        &self.git_path
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }

    /// Load a fresh index snapshot from disk.
    pub fn load_index(&self) -> Result<Index> {
        let mut index = Index::new(self.git_path.join("index").into_boxed_path());
        index.rehydrate()?;
        Ok(index)
    }

    /// Compute the working-tree status under the given options.
    pub async fn status(&self, options: &StatusOptions) -> Result<Vec<StatusEntry>> {
        self.status_with_cancel(options, CancelFlag::new()).await
    }

    /// Like [`status`](Self::status), with a cancellation handle; a
    /// cancelled query fails with `Cancelled` and yields no partial
    /// results.
    pub async fn status_with_cancel(
        &self,
        options: &StatusOptions,
        cancel: CancelFlag,
    ) -> Result<Vec<StatusEntry>> {
        aggregator::compute(self, options, cancel).await
    }
}
