//! gitnotes - Git-backed notebooks
//!
//! A notebook is a directory of markdown and text notes whose history lives
//! in a git repository next to them. Every save is a commit, configuration
//! changes get their own tagged commits, and a notebook can also be carried
//! around as a single zip file.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use gitnotes::notebook::{Notebook, NotebookOptions};
//!
//! let options = NotebookOptions::default();
//! let notebook = Notebook::create(Path::new("./notebooks"), "Journal", &options).unwrap();
//! std::fs::write(notebook.path().join("today.md"), "# Today").unwrap();
//! notebook.save().unwrap();
//! ```

pub mod archive;
pub mod notebook;
pub mod storage;
