//!  HEAD and tag management.
//!
//!  Notebooks live on a single branch, so the refs we care about are HEAD
//!  and the `config/{n}` tags that mark configuration commits.

use git2::Repository;

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::types::{CommitId, TagName};

/// Manages Git references (HEAD and tags).
pub struct RefManager;

impl RefManager {
    /// Get the current HEAD commit.
    pub fn head_commit(repo: &Repository) -> StorageResult<CommitId> {
        let head = repo.head().map_err(|e| {
            if e.code() == git2::ErrorCode::UnbornBranch {
                StorageError::EmptyRepository
            } else {
                StorageError::Git(e)
            }
        })?;

        let commit = head.peel_to_commit()?;
        Ok(CommitId::new(commit.id()))
    }

    /// Check if a tag exists.
    pub fn tag_exists(repo: &Repository, tag: &TagName) -> bool {
        repo.find_reference(&tag.as_ref_path()).is_ok()
    }

    /// Create a lightweight tag pointing at the given commit.
    pub fn create_tag(repo: &Repository, tag: &TagName, target: CommitId) -> StorageResult<()> {
        if Self::tag_exists(repo, tag) {
            return Err(StorageError::TagAlreadyExists(tag.to_string()));
        }

        let object = repo.find_object(target.raw(), None)?;
        repo.tag_lightweight(tag.as_str(), &object, false)?;

        Ok(())
    }

    /// Resolve a tag to the commit it marks.
    pub fn resolve_tag(repo: &Repository, tag: &TagName) -> StorageResult<CommitId> {
        let reference = repo
            .find_reference(&tag.as_ref_path())
            .map_err(|_| StorageError::CommitNotFound(tag.to_string()))?;

        let commit = reference.peel_to_commit()?;
        Ok(CommitId::new(commit.id()))
    }

    /// List tags with an optional prefix filter, sorted by name.
    pub fn list_tags(repo: &Repository, prefix: Option<&str>) -> StorageResult<Vec<TagName>> {
        let names = repo.tag_names(None)?;

        let mut result = Vec::new();
        for name in names.iter().flatten() {
            let matches = match prefix {
                Some(p) => name.starts_with(p),
                None => true,
            };
            if matches {
                result.push(TagName::new(name)?);
            }
        }

        result.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        Ok(result)
    }

    /// The tag the next configuration commit should receive.
    pub fn next_config_tag(repo: &Repository) -> StorageResult<TagName> {
        let existing = Self::list_tags(repo, Some(TagName::CONFIG_PREFIX))?;
        Ok(TagName::config(existing.len() + 1))
    }
}
