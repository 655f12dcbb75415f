//! version-control layer for notebooks
//!
//! this module is the only place that talks to git2. The notebook layer uses
//! the contract below and never touches repository internals directly.
//!
//!  # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     GitRepository                           │
//! │   (init + commit all, open, clean check, tagged commits)    │
//! └─────────────────────────────────────────────────────────────┘
//!                   │                           │
//!                   ▼                           ▼
//!            ┌─────────────┐             ┌─────────────┐
//!            │   commit    │             │    refs     │
//!            │  (history)  │             │ (HEAD/tags) │
//!            └─────────────┘             └─────────────┘
//!  ```
//!
//! # Usage
//!
//! ```ignore
//! use gitnotes::storage::{GitRepository, GitSignature};
//!
//! let sig = GitSignature::gitnotes();
//! let repo = GitRepository::init_and_commit_all("./notebook", "Created notebook A", &sig)?;
//!
//! std::fs::write("./notebook/todo.md", "- [ ] write")?;
//! if !repo.is_clean()? {
//!     repo.add_and_commit_all(&sig, "Saved Notebook")?;
//! }
//! ```

mod commit;
mod error;
mod refs;
mod repository;
mod types;

// Re-export public API
pub use commit::{CommitInfo, CommitMessage};
pub use error::{StorageError, StorageResult};
pub use repository::GitRepository;
pub use types::{CommitId, GitSignature, InvalidNameError, TagName, TreeId};
