//! The in-memory mirror of a notebook's directory tree.
//!
//! A notebook is a tree of collections (directories) holding notes (files)
//! and further collections. All collections live in one arena owned by
//! [`CollectionTree`]; parents and children refer to each other through
//! [`CollectionId`] indices.
//!
//! The tree is built once by walking the disk and is never patched
//! afterwards. Rebuild it to see structural changes.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::notebook::error::{NotebookError, NotebookResult};

/// File extensions recognized as notes.
pub const NOTE_EXTENSIONS: &[&str] = &["md", "txt"];

/// Directory excluded from every walk.
const VCS_DIR: &str = ".git";

/// Index of a collection inside its [`CollectionTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CollectionId(usize);

/// A single note file. Content is never loaded eagerly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    path: PathBuf,
}

impl Note {
    /// Path relative to the notebook root.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// One child of a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Collection(CollectionId),
    Note(Note),
}

/// One directory of the notebook.
#[derive(Debug, Clone)]
pub struct Collection {
    path: PathBuf,
    parent: Option<CollectionId>,
    children: Vec<Entry>,
}

impl Collection {
    /// Path relative to the notebook root; `.` for the root.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn parent(&self) -> Option<CollectionId> {
        self.parent
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Immediate children in directory-listing order.
    pub fn children(&self) -> &[Entry] {
        &self.children
    }
}

/// Arena of collections; index 0 is the root.
#[derive(Debug, Clone)]
pub struct CollectionTree {
    collections: Vec<Collection>,
}

impl CollectionTree {
    /// Walk `root` and build the whole tree.
    pub fn build(root: &Path) -> NotebookResult<Self> {
        let mut tree = Self {
            collections: Vec::new(),
        };
        tree.walk(root, None, PathBuf::from("."))?;

        debug!(
            root = %root.display(),
            collections = tree.collections.len(),
            "built collection tree"
        );
        Ok(tree)
    }

    // one listing per directory; entries are sorted by name so repeated
    // builds of the same tree agree on order
    fn walk(&mut self, root: &Path, parent: Option<CollectionId>, relative: PathBuf) -> NotebookResult<CollectionId> {
        let id = CollectionId(self.collections.len());
        self.collections.push(Collection {
            path: relative.clone(),
            parent,
            children: Vec::new(),
        });

        let absolute = root.join(&relative);
        let unreadable = |source| NotebookError::DirectoryUnreadable {
            path: absolute.clone(),
            source,
        };
        let mut listing: Vec<_> = fs::read_dir(&absolute)
            .map_err(unreadable)?
            .collect::<Result<_, _>>()
            .map_err(unreadable)?;
        listing.sort_by_key(|e| e.file_name());

        let mut children = Vec::new();
        for entry in listing {
            let name = entry.file_name();
            if name == VCS_DIR {
                continue;
            }

            let file_type = entry.file_type().map_err(unreadable)?;
            let child_path = child_path(&relative, Path::new(&name));

            if file_type.is_dir() {
                let child = self.walk(root, Some(id), child_path)?;
                children.push(Entry::Collection(child));
            } else if file_type.is_file() && is_note(&child_path) {
                children.push(Entry::Note(Note { path: child_path }));
            }
        }

        self.collections[id.0].children = children;
        Ok(id)
    }

    pub fn root(&self) -> CollectionId {
        CollectionId(0)
    }

    /// Look a collection up by id.
    ///
    /// Ids only come from this tree, so they are always in range.
    pub fn get(&self, id: CollectionId) -> &Collection {
        &self.collections[id.0]
    }

    pub fn root_collection(&self) -> &Collection {
        self.get(self.root())
    }

    /// Number of collections, root included.
    pub fn collection_count(&self) -> usize {
        self.collections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root_collection().children.is_empty()
    }

    /// Every note below `id`, depth-first in children order.
    ///
    /// Each call starts a fresh traversal.
    pub fn notes_in(&self, id: CollectionId) -> Notes<'_> {
        Notes {
            tree: self,
            stack: vec![(id, 0)],
        }
    }

    /// Every note in the notebook.
    pub fn notes(&self) -> Notes<'_> {
        self.notes_in(self.root())
    }

    /// Find a collection by its path relative to the notebook root.
    pub fn find(&self, relative: &Path) -> Option<CollectionId> {
        self.collections
            .iter()
            .position(|c| c.path == relative)
            .map(CollectionId)
    }
}

/// Lazy depth-first traversal over the notes of a subtree.
pub struct Notes<'a> {
    tree: &'a CollectionTree,
    stack: Vec<(CollectionId, usize)>,
}

impl<'a> Iterator for Notes<'a> {
    type Item = &'a Note;

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.tree;
        loop {
            let (id, index) = *self.stack.last()?;
            let children = &tree.get(id).children;

            let Some(entry) = children.get(index) else {
                self.stack.pop();
                continue;
            };
            if let Some(top) = self.stack.last_mut() {
                top.1 += 1;
            }

            match entry {
                Entry::Note(note) => return Some(note),
                Entry::Collection(child) => self.stack.push((*child, 0)),
            }
        }
    }
}

fn child_path(parent: &Path, name: &Path) -> PathBuf {
    if parent == Path::new(".") {
        name.to_path_buf()
    } else {
        parent.join(name)
    }
}

fn is_note(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| NOTE_EXTENSIONS.contains(&ext))
}
