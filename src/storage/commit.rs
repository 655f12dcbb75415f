//!  Commit creation and history traversal
//!
//!  commits are how a notebook remembers its past:
//! - creating a notebook makes the root commit
//! - every save with pending changes makes one content commit
//! - configuration changes get their own tagged commit first
//!
//! this module handles commit creation, staging and history walking

use chrono::{DateTime, TimeZone, Utc};
use git2::{IndexAddOption, Repository, Revwalk, Sort};

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::types::{CommitId, GitSignature, TreeId};

/// information about a commit
#[derive(Debug, Clone)]
pub struct CommitInfo {
    pub id: CommitId,
    pub tree_id: TreeId,
    pub parent_ids: Vec<CommitId>,
    pub message: String,
    pub author_name: String,
    pub author_email: String,
    pub timestamp: DateTime<Utc>,
}

impl CommitInfo {
    /// create CommitInfo from a git2::Commit
    pub(crate) fn from_git2(commit: &git2::Commit<'_>) -> Self {
        let author = commit.author();
        let time = commit.time();
        let timestamp = Utc
            .timestamp_opt(time.seconds(), 0)
            .single()
            .unwrap_or_else(Utc::now);

        Self {
            id: CommitId::new(commit.id()),
            tree_id: TreeId::new(commit.tree_id()),
            parent_ids: commit.parent_ids().map(CommitId::new).collect(),
            message: commit.message().unwrap_or("").to_string(),
            author_name: author.name().unwrap_or("Unknown").to_string(),
            author_email: author.email().unwrap_or("unknown@unknown").to_string(),
            timestamp,
        }
    }

    /// check if this is the root commit
    pub fn is_root(&self) -> bool {
        self.parent_ids.is_empty()
    }

    /// get the first (or only) parent
    pub fn first_parent(&self) -> Option<CommitId> {
        self.parent_ids.first().copied()
    }

    /// get a short summary of the commit (first line of message)
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or(&self.message)
    }
}

/// Assembles a commit from a staged tree.
///
/// Parents default to none (a root commit) and the signature to
/// [`GitSignature::gitnotes`].
pub struct CommitBuilder<'a> {
    repo: &'a Repository,
    tree_id: Option<TreeId>,
    parents: Vec<CommitId>,
    message: String,
    signature: GitSignature,
    update_ref: Option<String>,
}

impl<'a> CommitBuilder<'a> {
    pub fn new(repo: &'a Repository) -> Self {
        Self {
            repo,
            tree_id: None,
            parents: Vec::new(),
            message: String::new(),
            signature: GitSignature::gitnotes(),
            update_ref: None,
        }
    }

    pub fn tree(mut self, tree_id: TreeId) -> Self {
        self.tree_id = Some(tree_id);
        self
    }

    pub fn parents(mut self, parents: Vec<CommitId>) -> Self {
        self.parents = parents;
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// used as both author and committer
    pub fn signature(mut self, signature: GitSignature) -> Self {
        self.signature = signature;
        self
    }

    /// ref to move to the new commit, usually `HEAD`
    pub fn update_ref(mut self, refname: impl Into<String>) -> Self {
        self.update_ref = Some(refname.into());
        self
    }

    pub fn commit(self) -> StorageResult<CommitId> {
        let tree_id = self
            .tree_id
            .ok_or_else(|| StorageError::Internal("commit requires a tree".to_string()))?;
        let tree = self.repo.find_tree(tree_id.raw())?;
        let sig = self.signature.to_git2_signature()?;

        let parents = self
            .parents
            .iter()
            .map(|id| self.repo.find_commit(id.raw()))
            .collect::<Result<Vec<_>, _>>()?;
        let parents: Vec<&git2::Commit<'_>> = parents.iter().collect();

        let oid = self
            .repo
            .commit(self.update_ref.as_deref(), &sig, &sig, &self.message, &tree, &parents)?;
        Ok(CommitId::new(oid))
    }
}

/// get information about a commit
pub fn get_commit(repo: &Repository, id: CommitId) -> StorageResult<CommitInfo> {
    let commit = repo
        .find_commit(id.raw())
        .map_err(|_| StorageError::CommitNotFound(id.to_string()))?;

    Ok(CommitInfo::from_git2(&commit))
}

/// the commit HEAD points at, or None on an unborn branch
pub fn head_parent(repo: &Repository) -> StorageResult<Option<CommitId>> {
    match repo.head() {
        Ok(head) => Ok(Some(CommitId::new(head.peel_to_commit()?.id()))),
        Err(e) if e.code() == git2::ErrorCode::UnbornBranch => Ok(None),
        Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
        Err(e) => Err(StorageError::Git(e)),
    }
}

/// stage every addition, modification and deletion in the working tree
///
/// returns the tree the index now describes
pub fn stage_all(repo: &Repository) -> StorageResult<TreeId> {
    let mut index = repo.index()?;
    index.add_all(["*"].iter(), IndexAddOption::DEFAULT, None)?;
    index.update_all(["*"].iter(), None)?;
    index.write()?;
    Ok(TreeId::new(index.write_tree()?))
}

/// stage a single path relative to the working tree
pub fn stage_path(repo: &Repository, path: &std::path::Path) -> StorageResult<TreeId> {
    let mut index = repo.index()?;
    index.add_path(path)?;
    index.write()?;
    Ok(TreeId::new(index.write_tree()?))
}

/// commit the staged tree on top of HEAD and advance HEAD
pub fn commit_staged(
    repo: &Repository,
    tree_id: TreeId,
    message: &str,
    signature: &GitSignature,
) -> StorageResult<CommitId> {
    let parents = head_parent(repo)?.into_iter().collect();

    CommitBuilder::new(repo)
        .tree(tree_id)
        .parents(parents)
        .message(message)
        .signature(signature.clone())
        .update_ref("HEAD")
        .commit()
}

/// iterate over commit history starting from a commit
pub struct HistoryIterator<'repo> {
    repo: &'repo Repository,
    revwalk: Revwalk<'repo>,
}

impl<'repo> HistoryIterator<'repo> {
    /// create a new history iterator
    pub fn new(repo: &'repo Repository, start: CommitId) -> StorageResult<Self> {
        let mut revwalk = repo.revwalk()?;
        revwalk.push(start.raw())?;
        revwalk.set_sorting(Sort::TIME | Sort::TOPOLOGICAL)?;

        Ok(Self { repo, revwalk })
    }
}

impl<'repo> Iterator for HistoryIterator<'repo> {
    type Item = StorageResult<CommitInfo>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.revwalk.next()? {
            Ok(oid) => match self.repo.find_commit(oid) {
                Ok(commit) => Some(Ok(CommitInfo::from_git2(&commit))),
                Err(e) => Some(Err(StorageError::Git(e))),
            },
            Err(e) => Some(Err(StorageError::Git(e))),
        }
    }
}

/// get history for a commit
pub fn history(repo: &Repository, start: CommitId) -> StorageResult<HistoryIterator<'_>> {
    HistoryIterator::new(repo, start)
}

/// message formatting for notebook operations
pub struct CommitMessage;

impl CommitMessage {
    /// the root commit of a new notebook
    pub fn created_notebook(name: &str) -> String {
        format!("Created notebook {}", name)
    }

    /// a content commit made by save
    pub fn saved_notebook() -> String {
        "Saved Notebook".to_string()
    }

    /// a configuration-only commit
    pub fn config_update(name: &str) -> String {
        format!("Updated notebook configuration: {}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn setup_repo() -> (TempDir, Repository) {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        (dir, repo)
    }

    #[test]
    fn test_head_parent_unborn() {
        let (_dir, repo) = setup_repo();
        assert_eq!(head_parent(&repo).unwrap(), None);
    }

    #[test]
    fn test_commit_staged_chain() {
        let (dir, repo) = setup_repo();
        let sig = GitSignature::gitnotes();

        fs::write(dir.path().join("a.md"), "one").unwrap();
        let tree = stage_all(&repo).unwrap();
        let first = commit_staged(&repo, tree, "first", &sig).unwrap();

        fs::write(dir.path().join("b.md"), "two").unwrap();
        let tree = stage_all(&repo).unwrap();
        let second = commit_staged(&repo, tree, "second", &sig).unwrap();

        let info = get_commit(&repo, second).unwrap();
        assert_eq!(info.first_parent(), Some(first));
        assert_eq!(info.summary(), "second");
        assert!(get_commit(&repo, first).unwrap().is_root());
        assert_eq!(head_parent(&repo).unwrap(), Some(second));
    }

    #[test]
    fn test_stage_all_picks_up_deletions() {
        let (dir, repo) = setup_repo();
        let sig = GitSignature::gitnotes();

        fs::write(dir.path().join("gone.md"), "bye").unwrap();
        fs::write(dir.path().join("kept.md"), "hi").unwrap();
        let tree = stage_all(&repo).unwrap();
        commit_staged(&repo, tree, "both", &sig).unwrap();

        fs::remove_file(dir.path().join("gone.md")).unwrap();
        let tree_id = stage_all(&repo).unwrap();
        let tree = repo.find_tree(tree_id.raw()).unwrap();
        assert!(tree.get_name("kept.md").is_some());
        assert!(tree.get_name("gone.md").is_none());
    }

    #[test]
    fn test_history_iteration() {
        let (dir, repo) = setup_repo();
        let sig = GitSignature::gitnotes();

        let mut ids = Vec::new();
        for i in 0..3 {
            fs::write(dir.path().join(format!("{}.md", i)), "x").unwrap();
            let tree = stage_all(&repo).unwrap();
            ids.push(commit_staged(&repo, tree, &format!("commit {}", i), &sig).unwrap());
        }

        let commits: Vec<_> = history(&repo, ids[2]).unwrap().collect::<Result<_, _>>().unwrap();

        assert_eq!(commits.len(), 3);
        assert_eq!(commits[0].id, ids[2]);
        assert_eq!(commits[1].id, ids[1]);
        assert_eq!(commits[2].id, ids[0]);
    }

    #[test]
    fn test_commit_messages() {
        assert_eq!(
            CommitMessage::created_notebook("Test Notebook"),
            "Created notebook Test Notebook"
        );
        assert_eq!(CommitMessage::saved_notebook(), "Saved Notebook");
        assert_eq!(
            CommitMessage::config_update("Journal"),
            "Updated notebook configuration: Journal"
        );
    }
}
