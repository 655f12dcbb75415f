//! The per-notebook configuration record (`config.yml`).
//!
//! The file holds two keys:
//!
//! ```yaml
//! name: Test Notebook
//! uuid: 01jb7x0q4k9v8w2d3f5g6h7j8k
//! ```
//!
//! `name` is the display name and may drift away from the sanitized
//! directory name. `uuid` is generated once at creation and never changes.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_yaml::Value;
use ulid::Ulid;

use crate::notebook::error::{NotebookError, NotebookResult};

/// File name of the notebook config, relative to the notebook root.
pub const CONFIG_FILE_NAME: &str = "config.yml";

/// A notebook's persisted identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotebookConfig {
    #[serde(rename = "name")]
    display_name: String,
    #[serde(rename = "uuid")]
    stable_id: String,
    #[serde(skip)]
    file: PathBuf,
}

impl NotebookConfig {
    /// Create a fresh config for the notebook rooted at `dir`.
    ///
    /// Nothing is written until [`save`](Self::save) is called.
    pub fn create(dir: &Path, display_name: &str) -> NotebookResult<Self> {
        if display_name.is_empty() {
            return Err(NotebookError::NameRequired);
        }

        Ok(Self {
            display_name: display_name.to_string(),
            stable_id: Ulid::new().to_string().to_lowercase(),
            file: dir.join(CONFIG_FILE_NAME),
        })
    }

    /// Load and validate the config of the notebook rooted at `dir`.
    pub fn load(dir: &Path) -> NotebookResult<Self> {
        let file = dir.join(CONFIG_FILE_NAME);
        let content = match fs::read_to_string(&file) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(NotebookError::ConfigNotFound(dir.to_path_buf()))
            }
            Err(e) => return Err(e.into()),
        };

        Self::from_yaml(&content, file)
    }

    /// Parse config text that belongs to the file at `file`.
    pub fn from_yaml(content: &str, file: PathBuf) -> NotebookResult<Self> {
        let fields = RawFields::parse(content, &file)?;

        let stable_id = fields.stable_id.ok_or_else(|| NotebookError::ConfigInvalid {
            path: file.clone(),
            field: "uuid",
        })?;
        let display_name = fields.display_name.ok_or_else(|| NotebookError::ConfigInvalid {
            path: file.clone(),
            field: "name",
        })?;

        Ok(Self {
            display_name,
            stable_id,
            file,
        })
    }

    /// Write the config to its file, replacing whatever is there.
    pub fn save(&self) -> NotebookResult<()> {
        let content = serde_yaml::to_string(self).map_err(|source| NotebookError::ConfigParse {
            path: self.file.clone(),
            source,
        })?;
        fs::write(&self.file, content)?;
        Ok(())
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn stable_id(&self) -> &str {
        &self.stable_id
    }

    /// Path of the backing `config.yml`.
    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Change the display name. The notebook directory keeps its name.
    pub fn set_display_name(&mut self, display_name: &str) -> NotebookResult<()> {
        if display_name.is_empty() {
            return Err(NotebookError::NameRequired);
        }
        self.display_name = display_name.to_string();
        Ok(())
    }
}

/// Just the display name from config text, without requiring `uuid`.
pub(crate) fn display_name_from_yaml(content: &str, file: &Path) -> NotebookResult<String> {
    RawFields::parse(content, file)?
        .display_name
        .ok_or_else(|| NotebookError::ConfigInvalid {
            path: file.to_path_buf(),
            field: "name",
        })
}

/// Whatever `name` and `uuid` the text contains, as non-empty strings.
struct RawFields {
    display_name: Option<String>,
    stable_id: Option<String>,
}

impl RawFields {
    fn parse(content: &str, file: &Path) -> NotebookResult<Self> {
        if content.trim().is_empty() {
            return Ok(Self {
                display_name: None,
                stable_id: None,
            });
        }

        let value: Value = serde_yaml::from_str(content).map_err(|source| NotebookError::ConfigParse {
            path: file.to_path_buf(),
            source,
        })?;

        Ok(Self {
            display_name: value.get("name").and_then(scalar_to_string),
            stable_id: value.get("uuid").and_then(scalar_to_string),
        })
    }
}

// hand-edited files sometimes carry `uuid: 5`
fn scalar_to_string(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
