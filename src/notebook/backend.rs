//! Where a notebook's files really live.
//!
//! A plain notebook is its directory. A compressed notebook is a zip file
//! the user sees, plus a scratch directory the notebook actually works in;
//! the archive backend repacks the scratch copy on every save and deletes it
//! on close.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::archive;
use crate::notebook::error::{NotebookError, NotebookResult};

/// Which kind of backend a notebook uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Plain,
    Archive,
}

/// Lifecycle hooks that differ between plain and compressed notebooks.
pub trait StoreBackend: Send + fmt::Debug {
    fn kind(&self) -> BackendKind;

    /// The path the user knows the notebook by, when it differs from the
    /// working directory.
    fn external_path(&self) -> Option<&Path>;

    /// Bring the external representation up to date with `root`.
    fn sync(&self, root: &Path) -> NotebookResult<()>;

    /// Release whatever the backend holds.
    fn close(self: Box<Self>) -> NotebookResult<()>;
}

/// A notebook that is just a directory.
#[derive(Debug, Default)]
pub struct PlainBackend;

impl StoreBackend for PlainBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Plain
    }

    fn external_path(&self) -> Option<&Path> {
        None
    }

    fn sync(&self, _root: &Path) -> NotebookResult<()> {
        Ok(())
    }

    fn close(self: Box<Self>) -> NotebookResult<()> {
        Ok(())
    }
}

/// A notebook packed into a single archive file.
#[derive(Debug)]
pub struct ArchiveBackend {
    external_path: PathBuf,
    scratch: ScratchDir,
}

impl ArchiveBackend {
    pub fn new(external_path: PathBuf, scratch: ScratchDir) -> Self {
        Self {
            external_path,
            scratch,
        }
    }
}

impl StoreBackend for ArchiveBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Archive
    }

    fn external_path(&self) -> Option<&Path> {
        Some(&self.external_path)
    }

    fn sync(&self, root: &Path) -> NotebookResult<()> {
        archive::pack(root, &self.external_path).map_err(|source| NotebookError::ArchiveSyncFailed {
            path: self.external_path.clone(),
            source,
        })
    }

    fn close(self: Box<Self>) -> NotebookResult<()> {
        self.scratch.remove()?;
        Ok(())
    }
}

/// A directory that is removed when dropped unless removed explicitly first.
#[derive(Debug)]
pub struct ScratchDir {
    path: PathBuf,
    armed: bool,
}

impl ScratchDir {
    /// Create an empty directory at `path`, clearing out whatever a previous
    /// run left there.
    pub fn stage(path: PathBuf) -> io::Result<Self> {
        match fs::symlink_metadata(&path) {
            Ok(meta) if meta.is_dir() => fs::remove_dir_all(&path)?,
            Ok(_) => fs::remove_file(&path)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
        fs::create_dir_all(&path)?;

        debug!(path = %path.display(), "staged scratch directory");
        Ok(Self { path, armed: true })
    }

    /// Create a fresh directory below `parent` whose name starts with
    /// `prefix` and is not shared with any other caller.
    pub fn stage_unique(parent: &Path, prefix: &str) -> io::Result<Self> {
        fs::create_dir_all(parent)?;
        let path = tempfile::Builder::new()
            .prefix(&format!("{}-", prefix))
            .tempdir_in(parent)?
            .keep();

        debug!(path = %path.display(), "staged scratch directory");
        Ok(Self { path, armed: true })
    }

    /// Take ownership of an existing directory.
    pub fn adopt(path: PathBuf) -> Self {
        Self { path, armed: true }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the directory now, reporting failure.
    pub fn remove(mut self) -> io::Result<()> {
        self.armed = false;
        match fs::remove_dir_all(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Err(e) = fs::remove_dir_all(&self.path) {
            if e.kind() != io::ErrorKind::NotFound {
                warn!(path = %self.path.display(), error = %e, "failed to remove scratch directory");
            }
        }
    }
}
