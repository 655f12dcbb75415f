//! Notebook lifecycle on top of the storage and archive layers.
//!
//! A notebook is a directory holding a `config.yml`, a tree of collections
//! (subdirectories) and notes (`.md`/`.txt` files), and a git repository
//! recording its history. A compressed notebook is the same thing packed
//! into one zip file.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │              Notebook / PendingNotebook                  │
//! │        (create, open, save, rename, reload, close)       │
//! └──────────────────────────────────────────────────────────┘
//!       │             │              │               │
//!       ▼             ▼              ▼               ▼
//! ┌──────────┐ ┌────────────┐ ┌────────────┐ ┌──────────────┐
//! │  config  │ │ collection │ │    init    │ │   backend    │
//! │ (yaml)   │ │  (arena)   │ │ (worker)   │ │ (plain/zip)  │
//! └──────────┘ └────────────┘ └────────────┘ └──────────────┘
//!                                   │               │
//!                                   ▼               ▼
//!                              storage::GitRepository  archive
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use gitnotes::notebook::{Notebook, NotebookOptions};
//!
//! let options = NotebookOptions::from_env();
//! let notebook = Notebook::create("./notebooks".as_ref(), "Test Notebook", &options)?;
//!
//! std::fs::write(notebook.path().join("todo.md"), "- [ ] write")?;
//! notebook.save()?;
//! notebook.close()?;
//! ```

mod backend;
mod collection;
mod config;
mod error;
mod init;
mod options;
mod sanitize;
mod store;

// Re-export public API
pub use backend::{ArchiveBackend, BackendKind, PlainBackend, ScratchDir, StoreBackend};
pub use collection::{Collection, CollectionId, CollectionTree, Entry, Note, Notes, NOTE_EXTENSIONS};
pub use config::{NotebookConfig, CONFIG_FILE_NAME};
pub use error::{NotebookError, NotebookResult};
pub use options::{NotebookOptions, APP_DIR_NAME};
pub use sanitize::{normalize_notebook_path, path_segment, sanitize, sanitize_for, Platform};
pub use store::{Notebook, PendingNotebook, SaveSummary};
