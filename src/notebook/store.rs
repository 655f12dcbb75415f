//! Notebook lifecycle: create, open, save and close.
//!
//! Creating or opening a notebook returns a [`PendingNotebook`] first. Its
//! config, root path and collection tree are already valid; only the
//! repository attach is still running. [`PendingNotebook::wait`] turns it
//! into a usable [`Notebook`] or reports why the attach failed. The
//! [`Notebook::create`] and [`Notebook::open`] shortcuts do both steps.
//!
//! Compressed notebooks are regular notebooks living in a scratch directory,
//! with an [`ArchiveBackend`] that repacks the scratch copy into the external
//! zip file on every save.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::archive;
use crate::notebook::backend::{ArchiveBackend, BackendKind, PlainBackend, ScratchDir, StoreBackend};
use crate::notebook::collection::{CollectionTree, Note, Notes};
use crate::notebook::config::{self, NotebookConfig, CONFIG_FILE_NAME};
use crate::notebook::error::{NotebookError, NotebookResult};
use crate::notebook::init::InitTask;
use crate::notebook::options::NotebookOptions;
use crate::notebook::sanitize::{path_segment, sanitize};
use crate::storage::{CommitId, CommitInfo, CommitMessage, GitRepository};

/// Commits produced by one [`Notebook::save`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveSummary {
    /// Tagged commit holding only the config change.
    pub config_commit: Option<CommitId>,
    /// Commit holding every other change.
    pub content_commit: Option<CommitId>,
}

impl SaveSummary {
    /// Whether the save committed anything.
    pub fn is_empty(&self) -> bool {
        self.config_commit.is_none() && self.content_commit.is_none()
    }
}

/// A notebook whose repository is still being attached.
pub struct PendingNotebook {
    config: NotebookConfig,
    path: PathBuf,
    tree: CollectionTree,
    options: NotebookOptions,
    init: InitTask,
}

impl PendingNotebook {
    pub fn config(&self) -> &NotebookConfig {
        &self.config
    }

    /// Canonical notebook root.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn tree(&self) -> &CollectionTree {
        &self.tree
    }

    /// Whether the repository attach has finished, successfully or not.
    pub fn is_completed(&self) -> bool {
        self.init.is_completed()
    }

    /// The attach error, once it has finished with one.
    pub fn init_error(&self) -> Option<String> {
        self.init.error_message()
    }

    /// Block until the repository is attached.
    ///
    /// Fails with the recorded attach error, or with
    /// [`NotebookError::InitTimeout`] once the configured timeout passes.
    pub fn wait(self) -> NotebookResult<Notebook> {
        let repo = self.init.wait(self.options.init_timeout)?;
        info!(
            name = %self.config.display_name(),
            path = %self.path.display(),
            "notebook ready"
        );

        Ok(Notebook {
            config: self.config,
            path: self.path,
            tree: self.tree,
            repo,
            backend: Box::new(PlainBackend),
            options: self.options,
        })
    }
}

impl fmt::Debug for PendingNotebook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingNotebook")
            .field("config", &self.config)
            .field("path", &self.path)
            .field("completed", &self.is_completed())
            .finish()
    }
}

/// An open notebook.
#[derive(Debug)]
pub struct Notebook {
    config: NotebookConfig,
    path: PathBuf,
    tree: CollectionTree,
    repo: GitRepository,
    backend: Box<dyn StoreBackend>,
    options: NotebookOptions,
}

impl Notebook {
    // ==================== Create ====================

    /// Start creating a notebook named `name` in a new directory below `path`.
    ///
    /// The directory is named after the sanitized `name`; it must not exist
    /// yet or must be empty.
    pub fn begin_create(path: &Path, name: &str, options: &NotebookOptions) -> NotebookResult<PendingNotebook> {
        let segment = notebook_segment(name)?;

        match fs::symlink_metadata(path) {
            Ok(meta) if meta.file_type().is_symlink() => {
                return Err(NotebookError::PathIsSymlink(path.to_path_buf()))
            }
            Ok(meta) if !meta.is_dir() => return Err(NotebookError::PathNotDirectory(path.to_path_buf())),
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        let notebook_path = path.join(&segment);
        if let Ok(meta) = fs::symlink_metadata(&notebook_path) {
            if !meta.is_dir() {
                return Err(NotebookError::TargetExists(notebook_path));
            }
        }

        fs::create_dir_all(&notebook_path)?;
        if fs::read_dir(&notebook_path)?.next().is_some() {
            return Err(NotebookError::TargetNotEmpty(notebook_path));
        }
        let root = fs::canonicalize(&notebook_path)?;

        let config = NotebookConfig::create(&root, name)?;
        config.save()?;
        let tree = CollectionTree::build(&root)?;

        let repo_root = root.clone();
        let message = CommitMessage::created_notebook(name);
        let signature = options.signature.clone();
        let init = InitTask::spawn(&segment, move || {
            GitRepository::init_and_commit_all(&repo_root, &message, &signature)
                .map_err(|source| NotebookError::RepositoryInitFailed { path: repo_root, source })
        })?;

        info!(name = %name, path = %root.display(), "creating notebook");
        Ok(PendingNotebook {
            config,
            path: root,
            tree,
            options: options.clone(),
            init,
        })
    }

    /// Create a plain notebook and wait for its repository.
    pub fn create(path: &Path, name: &str, options: &NotebookOptions) -> NotebookResult<Self> {
        Self::begin_create(path, name, options)?.wait()
    }

    /// Create a compressed notebook stored as the zip file `external`.
    ///
    /// The notebook is built in a scratch directory and packed once its
    /// repository exists, so `external` is a complete archive on return.
    pub fn create_compressed(external: &Path, name: &str, options: &NotebookOptions) -> NotebookResult<Self> {
        let segment = notebook_segment(name)?;

        match fs::symlink_metadata(external) {
            Ok(meta) if meta.file_type().is_symlink() => {
                return Err(NotebookError::PathIsSymlink(external.to_path_buf()))
            }
            Ok(_) => return Err(NotebookError::TargetExists(external.to_path_buf())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        let parent = match external.parent() {
            Some(p) if p.as_os_str().is_empty() => Path::new("."),
            Some(p) => p,
            None => return Err(NotebookError::ArchivePathInvalid(external.to_path_buf())),
        };
        if external.file_name().is_none() || !parent.is_dir() {
            return Err(NotebookError::ArchivePathInvalid(external.to_path_buf()));
        }

        let scratch = ScratchDir::stage(options.create_staging_dir(&segment))?;
        let notebook = Self::create(scratch.path(), name, options)?;
        let notebook = notebook.into_archive(external.to_path_buf(), scratch);

        notebook.backend.sync(&notebook.path)?;
        info!(name = %name, archive = %external.display(), "created compressed notebook");
        Ok(notebook)
    }

    // ==================== Open ====================

    /// Start opening the notebook rooted at `path`.
    pub fn begin_open(path: &Path, options: &NotebookOptions) -> NotebookResult<PendingNotebook> {
        let config = NotebookConfig::load(path)?;
        let root = fs::canonicalize(path)?;
        let tree = CollectionTree::build(&root)?;

        let repo_root = root.clone();
        let init = InitTask::spawn(&sanitize(config.display_name()), move || {
            GitRepository::open(&repo_root)
                .map_err(|source| NotebookError::RepositoryOpenFailed { path: repo_root, source })
        })?;

        info!(name = %config.display_name(), path = %root.display(), "opening notebook");
        Ok(PendingNotebook {
            config,
            path: root,
            tree,
            options: options.clone(),
            init,
        })
    }

    /// Open a notebook by path: a directory is opened in place, anything else
    /// is treated as a compressed notebook.
    pub fn open(path: &Path, options: &NotebookOptions) -> NotebookResult<Self> {
        if fs::metadata(path)?.is_dir() {
            Self::open_dir(path, options)
        } else {
            Self::open_archive(path, options)
        }
    }

    /// Open a plain notebook and wait for its repository.
    pub fn open_dir(path: &Path, options: &NotebookOptions) -> NotebookResult<Self> {
        Self::begin_open(path, options)?.wait()
    }

    /// Unpack the compressed notebook `external` into a scratch directory of
    /// its own and open it.
    pub fn open_archive(external: &Path, options: &NotebookOptions) -> NotebookResult<Self> {
        let name = Self::archive_notebook_name(external)?;
        // the name comes from inside the archive
        let prefix = path_segment(&name).unwrap_or_else(|| "notebook".to_string());
        let scratch = ScratchDir::stage_unique(&options.open_staging_root(), &prefix)?;
        archive::unpack(external, scratch.path())?;
        debug!(archive = %external.display(), scratch = %scratch.path().display(), "unpacked notebook");

        let notebook = Self::open_dir(scratch.path(), options)?;
        Ok(notebook.into_archive(external.to_path_buf(), scratch))
    }

    /// Open a compressed notebook the caller already unpacked into `dir`.
    ///
    /// `nominal` is the archive the notebook is saved back to. The notebook
    /// takes ownership of `dir` and deletes it on close.
    pub fn open_unpacked_archive(
        dir: &Path,
        nominal: Option<&Path>,
        options: &NotebookOptions,
    ) -> NotebookResult<Self> {
        let nominal = nominal.ok_or(NotebookError::NominalPathRequired)?;
        let notebook = Self::open_dir(dir, options)?;
        let scratch = ScratchDir::adopt(notebook.path.clone());
        Ok(notebook.into_archive(nominal.to_path_buf(), scratch))
    }

    /// Open a notebook by its stable id.
    pub fn open_by_id(_stable_id: &str, _options: &NotebookOptions) -> NotebookResult<Self> {
        Err(NotebookError::NotImplemented("opening a notebook by id"))
    }

    /// Display name of a compressed notebook, read from its config entry
    /// without unpacking anything else.
    pub fn archive_notebook_name(path: &Path) -> NotebookResult<String> {
        let content = archive::read_entry(path, CONFIG_FILE_NAME)?
            .ok_or_else(|| NotebookError::ConfigEntryMissing(path.to_path_buf()))?;
        config::display_name_from_yaml(&content, &path.join(CONFIG_FILE_NAME))
    }

    fn into_archive(mut self, external: PathBuf, scratch: ScratchDir) -> Self {
        self.backend = Box::new(ArchiveBackend::new(external, scratch));
        self
    }

    // ==================== Accessors ====================

    pub fn config(&self) -> &NotebookConfig {
        &self.config
    }

    /// Canonical notebook root. For compressed notebooks this is the
    /// scratch copy.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn tree(&self) -> &CollectionTree {
        &self.tree
    }

    pub fn repository(&self) -> &GitRepository {
        &self.repo
    }

    /// The archive a compressed notebook is saved to.
    pub fn external_path(&self) -> Option<&Path> {
        self.backend.external_path()
    }

    pub fn is_compressed(&self) -> bool {
        self.backend.kind() == BackendKind::Archive
    }

    /// Every note in the notebook, depth-first.
    pub fn notes(&self) -> Notes<'_> {
        self.tree.notes()
    }

    /// Read a note's content.
    pub fn read_note(&self, note: &Note) -> NotebookResult<String> {
        Ok(fs::read_to_string(self.path.join(note.path()))?)
    }

    /// Commits on the current branch, newest first.
    pub fn history(&self, limit: Option<usize>) -> NotebookResult<Vec<CommitInfo>> {
        Ok(self.repo.history(limit)?)
    }

    // ==================== Mutation ====================

    /// Change the display name. Takes effect on disk at the next save; the
    /// notebook directory keeps its name.
    pub fn rename(&mut self, display_name: &str) -> NotebookResult<()> {
        self.config.set_display_name(display_name)
    }

    /// Rebuild the collection tree from disk.
    pub fn reload(&mut self) -> NotebookResult<()> {
        self.tree = CollectionTree::build(&self.path)?;
        Ok(())
    }

    /// Persist the config and commit pending changes.
    ///
    /// A config change gets its own tagged commit first so it can be told
    /// apart from content changes in history. For compressed notebooks the
    /// archive is rewritten afterwards.
    pub fn save(&self) -> NotebookResult<SaveSummary> {
        self.config.save()?;
        let signature = &self.options.signature;
        let mut summary = SaveSummary::default();

        if self.repo.is_file_modified(CONFIG_FILE_NAME)? {
            let tag = self.repo.next_config_tag()?;
            let message = CommitMessage::config_update(self.config.display_name());
            summary.config_commit = Some(self.repo.commit_file_and_tag(CONFIG_FILE_NAME, signature, &message, &tag)?);
        }

        if !self.repo.is_clean()? {
            summary.content_commit = Some(self.repo.add_and_commit_all(signature, &CommitMessage::saved_notebook())?);
        }

        self.backend.sync(&self.path)?;

        info!(
            name = %self.config.display_name(),
            config_commit = summary.config_commit.is_some(),
            content_commit = summary.content_commit.is_some(),
            "saved notebook"
        );
        Ok(summary)
    }

    /// Release the notebook. Compressed notebooks delete their scratch copy;
    /// unsaved changes there are lost.
    pub fn close(self) -> NotebookResult<()> {
        info!(name = %self.config.display_name(), "closing notebook");
        self.backend.close()
    }
}

/// The directory name for a new notebook called `name`.
fn notebook_segment(name: &str) -> NotebookResult<String> {
    if name.is_empty() {
        return Err(NotebookError::NameRequired);
    }
    path_segment(name).ok_or_else(|| NotebookError::UnusableName(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::TagName;
    use std::time::Duration;
    use tempfile::TempDir;

    fn options(dir: &TempDir) -> NotebookOptions {
        NotebookOptions::default()
            .scratch_root(dir.path().join("scratch"))
            .init_timeout(Duration::from_secs(30))
    }

    // ==================== Create ====================

    #[test]
    fn test_create_requires_name() {
        let dir = TempDir::new().unwrap();
        let result = Notebook::create(dir.path(), "", &options(&dir));
        assert!(matches!(result, Err(NotebookError::NameRequired)));
    }

    #[cfg(unix)]
    #[test]
    fn test_create_rejects_symlink() {
        let dir = TempDir::new().unwrap();
        let real = dir.path().join("real");
        let link = dir.path().join("link");
        fs::create_dir(&real).unwrap();
        std::os::unix::fs::symlink(&real, &link).unwrap();

        let result = Notebook::create(&link, "Test Notebook", &options(&dir));
        assert!(matches!(result, Err(NotebookError::PathIsSymlink(_))));
    }

    #[test]
    fn test_create_rejects_file_path() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("file");
        fs::write(&file, "").unwrap();

        let result = Notebook::create(&file, "Test Notebook", &options(&dir));
        assert!(matches!(result, Err(NotebookError::PathNotDirectory(_))));
    }

    #[test]
    fn test_create_rejects_file_at_target() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Test-Notebook"), "").unwrap();

        let result = Notebook::create(dir.path(), "Test Notebook", &options(&dir));
        assert!(matches!(result, Err(NotebookError::TargetExists(_))));
    }

    #[test]
    fn test_create_rejects_non_empty_target() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("Test-Notebook")).unwrap();
        fs::write(dir.path().join("Test-Notebook/existing.md"), "").unwrap();

        let result = Notebook::create(dir.path(), "Test Notebook", &options(&dir));
        assert!(matches!(result, Err(NotebookError::TargetNotEmpty(_))));
    }

    #[test]
    fn test_create_rejects_unusable_names() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("sibling.md"), "keep").unwrap();

        for name in ["..", "\u{1}"] {
            let result = Notebook::create(&dir.path().join("inner"), name, &options(&dir));
            assert!(matches!(result, Err(NotebookError::UnusableName(_))), "{:?}", name);
        }
        assert!(dir.path().join("sibling.md").is_file());
        assert!(!dir.path().join("inner").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_create_rejects_dangling_symlink_at_target() {
        let dir = TempDir::new().unwrap();
        std::os::unix::fs::symlink(dir.path().join("nowhere"), dir.path().join("Test-Notebook")).unwrap();

        let result = Notebook::create(dir.path(), "Test Notebook", &options(&dir));
        assert!(matches!(result, Err(NotebookError::TargetExists(_))));
    }

    #[test]
    fn test_create_into_missing_parent() {
        let dir = TempDir::new().unwrap();
        let notebook = Notebook::create(&dir.path().join("a/b"), "Deep", &options(&dir)).unwrap();
        assert!(notebook.path().ends_with("a/b/Deep"));
    }

    #[test]
    fn test_pending_exposes_structure() {
        let dir = TempDir::new().unwrap();
        let pending = Notebook::begin_create(dir.path(), "Test Notebook", &options(&dir)).unwrap();

        assert_eq!(pending.config().display_name(), "Test Notebook");
        assert!(pending.path().ends_with("Test-Notebook"));
        assert!(pending.tree().is_empty());

        let notebook = pending.wait().unwrap();
        assert!(notebook.repository().is_clean().unwrap());
    }

    // ==================== Open ====================

    #[test]
    fn test_open_blank_folder_mentions_config() {
        let dir = TempDir::new().unwrap();
        let err = Notebook::open(dir.path(), &options(&dir)).unwrap_err();
        assert!(matches!(err, NotebookError::ConfigNotFound(_)));
        assert!(err.to_string().contains("config.yml"));
    }

    #[test]
    fn test_open_without_repository_mentions_repository() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), "name: a\nuuid: a-b-c-d\n").unwrap();

        let pending = Notebook::begin_open(dir.path(), &options(&dir)).unwrap();
        assert_eq!(pending.config().display_name(), "a");

        let err = pending.wait().unwrap_err();
        assert!(matches!(err, NotebookError::RepositoryOpenFailed { .. }));
        assert!(err.to_string().contains("repository"));
    }

    #[test]
    fn test_open_by_id_not_implemented() {
        let dir = TempDir::new().unwrap();
        let result = Notebook::open_by_id("01jb7x0q4k9v8w2d3f5g6h7j8k", &options(&dir));
        assert!(matches!(result, Err(NotebookError::NotImplemented(_))));
    }

    #[test]
    fn test_open_unpacked_archive_requires_nominal_path() {
        let dir = TempDir::new().unwrap();
        let result = Notebook::open_unpacked_archive(dir.path(), None, &options(&dir));
        assert!(matches!(result, Err(NotebookError::NominalPathRequired)));
    }

    // ==================== Lifecycle ====================

    #[test]
    fn test_scenario_plain_notebook() {
        let dir = TempDir::new().unwrap();
        let opts = options(&dir);

        let notebook = Notebook::create(dir.path(), "Test Notebook", &opts).unwrap();
        assert_eq!(notebook.path().file_name().unwrap(), "Test-Notebook");
        assert!(!notebook.config().stable_id().is_empty());
        assert!(!notebook.is_compressed());
        assert!(notebook.external_path().is_none());
        let stable_id = notebook.config().stable_id().to_string();

        fs::write(notebook.path().join("first.md"), "# First").unwrap();
        let summary = notebook.save().unwrap();
        assert!(summary.config_commit.is_none());
        assert!(summary.content_commit.is_some());
        assert!(notebook.repository().is_clean().unwrap());

        let history = notebook.history(None).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].summary(), "Saved Notebook");
        assert_eq!(history[1].summary(), "Created notebook Test Notebook");

        let path = notebook.path().to_path_buf();
        notebook.close().unwrap();

        let reopened = Notebook::open(&path, &opts).unwrap();
        assert_eq!(reopened.config().display_name(), "Test Notebook");
        assert_eq!(reopened.config().stable_id(), stable_id);
        assert_eq!(reopened.notes().count(), 1);

        let again = Notebook::open(&path, &opts).unwrap();
        assert_eq!(again.config().stable_id(), stable_id);
    }

    #[test]
    fn test_save_without_changes_commits_nothing() {
        let dir = TempDir::new().unwrap();
        let notebook = Notebook::create(dir.path(), "Quiet", &options(&dir)).unwrap();

        let summary = notebook.save().unwrap();
        assert!(summary.is_empty());
        assert_eq!(notebook.history(None).unwrap().len(), 1);
    }

    #[test]
    fn test_rename_gets_tagged_config_commit() {
        let dir = TempDir::new().unwrap();
        let opts = options(&dir);
        let mut notebook = Notebook::create(dir.path(), "Old Name", &opts).unwrap();

        notebook.rename("New Name").unwrap();
        let summary = notebook.save().unwrap();
        assert!(summary.config_commit.is_some());
        assert!(summary.content_commit.is_none());

        let tags = notebook.repository().tags(Some(TagName::CONFIG_PREFIX)).unwrap();
        assert_eq!(tags, vec![TagName::config(1)]);
        let head = &notebook.history(Some(1)).unwrap()[0];
        assert_eq!(head.summary(), "Updated notebook configuration: New Name");

        let path = notebook.path().to_path_buf();
        assert!(path.ends_with("Old-Name"));
        notebook.close().unwrap();

        let reopened = Notebook::open(&path, &opts).unwrap();
        assert_eq!(reopened.config().display_name(), "New Name");
    }

    #[test]
    fn test_reload_and_read_note() {
        let dir = TempDir::new().unwrap();
        let mut notebook = Notebook::create(dir.path(), "Ideas", &options(&dir)).unwrap();

        fs::create_dir(notebook.path().join("drafts")).unwrap();
        fs::write(notebook.path().join("drafts/idea.md"), "a thought").unwrap();
        assert_eq!(notebook.notes().count(), 0);

        notebook.reload().unwrap();
        let note = notebook.notes().next().unwrap().clone();
        assert_eq!(note.path(), Path::new("drafts/idea.md"));
        assert_eq!(notebook.read_note(&note).unwrap(), "a thought");
    }

    // ==================== Compressed ====================

    #[test]
    fn test_scenario_compressed_notebook() {
        let dir = TempDir::new().unwrap();
        let opts = options(&dir);
        let external = dir.path().join("journal.zip");

        let notebook = Notebook::create_compressed(&external, "Journal", &opts).unwrap();
        assert!(notebook.is_compressed());
        assert_eq!(notebook.external_path(), Some(external.as_path()));
        assert!(external.is_file());
        assert_eq!(Notebook::archive_notebook_name(&external).unwrap(), "Journal");

        let scratch = notebook.path().to_path_buf();
        notebook.close().unwrap();
        assert!(!scratch.exists());

        let notebook = Notebook::open(&external, &opts).unwrap();
        assert!(notebook.is_compressed());
        assert_eq!(notebook.config().display_name(), "Journal");
        fs::write(notebook.path().join("entry.md"), "dear diary").unwrap();
        let summary = notebook.save().unwrap();
        assert!(summary.content_commit.is_some());
        notebook.close().unwrap();

        let check = dir.path().join("check");
        archive::unpack(&external, &check).unwrap();
        assert_eq!(fs::read_to_string(check.join("entry.md")).unwrap(), "dear diary");
        assert!(check.join(CONFIG_FILE_NAME).is_file());
        assert!(check.join(".git").is_dir());
    }

    #[test]
    fn test_open_unpacked_archive() {
        let dir = TempDir::new().unwrap();
        let opts = options(&dir);
        let external = dir.path().join("travel.zip");
        Notebook::create_compressed(&external, "Travel", &opts)
            .unwrap()
            .close()
            .unwrap();

        let unpacked = dir.path().join("unpacked");
        archive::unpack(&external, &unpacked).unwrap();

        let notebook = Notebook::open_unpacked_archive(&unpacked, Some(&external), &opts).unwrap();
        assert_eq!(notebook.external_path(), Some(external.as_path()));
        notebook.close().unwrap();
        assert!(!unpacked.exists());
    }

    #[test]
    fn test_unusable_compressed_name_leaves_other_scratch_alone() {
        let dir = TempDir::new().unwrap();
        let opts = options(&dir);

        let alpha = Notebook::create_compressed(&dir.path().join("a.zip"), "Alpha", &opts).unwrap();
        fs::write(alpha.path().join("unsaved.md"), "draft").unwrap();

        for name in ["..", "\u{1}"] {
            let result = Notebook::create_compressed(&dir.path().join("b.zip"), name, &opts);
            assert!(matches!(result, Err(NotebookError::UnusableName(_))), "{:?}", name);
        }
        assert!(!dir.path().join("b.zip").exists());
        assert_eq!(fs::read_to_string(alpha.path().join("unsaved.md")).unwrap(), "draft");
        alpha.close().unwrap();
    }

    #[test]
    fn test_same_name_archives_open_side_by_side() {
        let dir = TempDir::new().unwrap();
        let opts = options(&dir);
        let x = dir.path().join("x.zip");
        let y = dir.path().join("y.zip");
        Notebook::create_compressed(&x, "Journal", &opts).unwrap().close().unwrap();
        Notebook::create_compressed(&y, "Journal", &opts).unwrap().close().unwrap();

        let first = Notebook::open(&x, &opts).unwrap();
        fs::write(first.path().join("unsaved.md"), "draft").unwrap();
        let second = Notebook::open(&y, &opts).unwrap();
        assert_ne!(first.path(), second.path());
        assert!(first.path().join("unsaved.md").is_file());

        second.close().unwrap();
        assert!(first.path().join("unsaved.md").is_file());

        let again = Notebook::open(&x, &opts).unwrap();
        assert_ne!(first.path(), again.path());
        again.close().unwrap();
        assert!(first.path().join("unsaved.md").is_file());
        first.close().unwrap();
    }

    #[test]
    fn test_open_archive_with_parent_dir_name() {
        let dir = TempDir::new().unwrap();
        let opts = options(&dir);
        let source = dir.path().join("source");
        fs::create_dir(&source).unwrap();
        fs::write(source.join(CONFIG_FILE_NAME), "name: '..'\nuuid: x\n").unwrap();
        GitRepository::init_and_commit_all(&source, "Created notebook ..", &opts.signature).unwrap();
        let external = dir.path().join("odd.zip");
        archive::pack(&source, &external).unwrap();

        let keep = opts.open_staging_root().join("keep.md");
        fs::create_dir_all(opts.open_staging_root()).unwrap();
        fs::write(&keep, "x").unwrap();

        let notebook = Notebook::open(&external, &opts).unwrap();
        assert_eq!(notebook.config().display_name(), "..");
        assert!(notebook.path().starts_with(fs::canonicalize(opts.open_staging_root()).unwrap()));
        notebook.close().unwrap();
        assert!(keep.is_file());
    }

    #[test]
    fn test_create_compressed_rejects_existing_archive() {
        let dir = TempDir::new().unwrap();
        let external = dir.path().join("journal.zip");
        fs::write(&external, "").unwrap();

        let result = Notebook::create_compressed(&external, "Journal", &options(&dir));
        assert!(matches!(result, Err(NotebookError::TargetExists(_))));
    }

    #[test]
    fn test_archive_without_config_entry() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("source");
        fs::create_dir(&source).unwrap();
        fs::write(source.join("note.md"), "").unwrap();
        let external = dir.path().join("bare.zip");
        archive::pack(&source, &external).unwrap();

        let result = Notebook::archive_notebook_name(&external);
        assert!(matches!(result, Err(NotebookError::ConfigEntryMissing(_))));
    }
}
