//!   Core Git repository wrapper.
//!
//!  This is the central component of the storage layer.  It wraps `git2::Repository`
//!  with thread-safe access and provides the handful of working-tree operations
//!  a notebook needs: init, open, clean check, commit-all and tagged
//!  single-file commits.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use git2::{Repository, RepositoryInitOptions, Status, StatusOptions};
use parking_lot::Mutex;
use tracing::debug;

use crate::storage::commit::{self, CommitInfo};
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::refs::RefManager;
use crate::storage::types::{CommitId, GitSignature, TagName};

/// The main Git repository wrapper.
///
/// `git2::Repository` is `Send` but not `Sync`, so access is serialized
/// through a mutex. Clone this to share the handle - it uses Arc internally.
#[derive(Clone)]
pub struct GitRepository {
    inner: Arc<GitRepositoryInner>,
}

struct GitRepositoryInner {
    repo: Mutex<Repository>,
    path: PathBuf,
}

impl GitRepository {
    /// The branch new notebooks start on.
    pub const MAIN_BRANCH: &'static str = "main";

    /// Open an existing repository rooted exactly at `path`.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();
        let repo = Repository::open(path).map_err(|_| StorageError::NotInitialized(path.to_path_buf()))?;

        Ok(Self::wrap(repo, path))
    }

    /// Initialize a new repository and commit everything already in `path`.
    pub fn init_and_commit_all(
        path: impl AsRef<Path>,
        message: &str,
        signature: &GitSignature,
    ) -> StorageResult<Self> {
        let path = path.as_ref();
        let mut opts = RepositoryInitOptions::new();
        opts.initial_head(Self::MAIN_BRANCH);
        let repo = Repository::init_opts(path, &opts)?;

        let storage = Self::wrap(repo, path);
        let id = storage.add_and_commit_all(signature, message)?;
        debug!(path = %path.display(), commit = %id.short(), "initialized repository");

        Ok(storage)
    }

    fn wrap(repo: Repository, path: &Path) -> Self {
        Self {
            inner: Arc::new(GitRepositoryInner {
                repo: Mutex::new(repo),
                path: path.to_path_buf(),
            }),
        }
    }

    /// Get the repository path.
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Execute a function with exclusive access to the repository.
    pub fn with_repo<F, T>(&self, f: F) -> StorageResult<T>
    where
        F: FnOnce(&Repository) -> StorageResult<T>,
    {
        let repo = self.inner.repo.lock();
        f(&repo)
    }

    // ==================== Working Tree ====================

    /// Check whether the working tree matches HEAD, untracked files included.
    pub fn is_clean(&self) -> StorageResult<bool> {
        self.with_repo(|repo| {
            let mut opts = StatusOptions::new();
            opts.include_untracked(true)
                .recurse_untracked_dirs(true)
                .include_ignored(false);
            let statuses = repo.statuses(Some(&mut opts))?;
            Ok(statuses.is_empty())
        })
    }

    /// Stage every change in the working tree and commit it on top of HEAD.
    pub fn add_and_commit_all(&self, signature: &GitSignature, message: &str) -> StorageResult<CommitId> {
        self.with_repo(|repo| {
            let tree = commit::stage_all(repo)?;
            commit::commit_staged(repo, tree, message, signature)
        })
    }

    /// Check whether a single file differs from what HEAD records.
    ///
    /// Untracked files count as modified; ignored files never do.
    pub fn is_file_modified(&self, relative: impl AsRef<Path>) -> StorageResult<bool> {
        let relative = relative.as_ref();
        self.with_repo(|repo| match repo.status_file(relative) {
            Ok(status) => Ok(!(status - Status::IGNORED).is_empty()),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(false),
            Err(e) => Err(StorageError::Git(e)),
        })
    }

    /// Commit only `relative` and tag the resulting commit.
    pub fn commit_file_and_tag(
        &self,
        relative: impl AsRef<Path>,
        signature: &GitSignature,
        message: &str,
        tag: &TagName,
    ) -> StorageResult<CommitId> {
        let relative = relative.as_ref();
        if relative.is_absolute() {
            return Err(StorageError::OutsideWorkdir(relative.to_path_buf()));
        }

        self.with_repo(|repo| {
            let tree = commit::stage_path(repo, relative)?;
            let id = commit::commit_staged(repo, tree, message, signature)?;
            RefManager::create_tag(repo, tag, id)?;
            debug!(tag = %tag, commit = %id.short(), "tagged commit");
            Ok(id)
        })
    }

    // ==================== History ====================

    /// Get the current HEAD commit.
    pub fn head(&self) -> StorageResult<CommitId> {
        self.with_repo(RefManager::head_commit)
    }

    /// Get information about a commit.
    pub fn get_commit(&self, id: CommitId) -> StorageResult<CommitInfo> {
        self.with_repo(|repo| commit::get_commit(repo, id))
    }

    /// Get commit history from HEAD, newest first.
    pub fn history(&self, limit: Option<usize>) -> StorageResult<Vec<CommitInfo>> {
        self.with_repo(|repo| {
            let head = RefManager::head_commit(repo)?;
            let iter = commit::history(repo, head)?;
            match limit {
                Some(n) => iter.take(n).collect(),
                None => iter.collect(),
            }
        })
    }

    /// List tags, optionally filtered by prefix.
    pub fn tags(&self, prefix: Option<&str>) -> StorageResult<Vec<TagName>> {
        self.with_repo(|repo| RefManager::list_tags(repo, prefix))
    }

    /// The tag the next configuration commit should receive.
    pub fn next_config_tag(&self) -> StorageResult<TagName> {
        self.with_repo(RefManager::next_config_tag)
    }
}

impl std::fmt::Debug for GitRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitRepository")
            .field("path", &self.inner.path)
            .finish()
    }
}
