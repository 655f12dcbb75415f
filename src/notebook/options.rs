//! Runtime options for the notebook lifecycle.
//!
//! Defaults can be overridden per field with the builder methods, or from
//! the environment:
//!
//! - `GITNOTES_AUTHOR_NAME` / `GITNOTES_AUTHOR_EMAIL`: commit identity
//! - `GITNOTES_SCRATCH_DIR`: where compressed notebooks are staged
//! - `GITNOTES_INIT_TIMEOUT_SECS`: how long create/open wait for the repository

use std::path::PathBuf;
use std::time::Duration;

use crate::storage::GitSignature;

/// Environment variable prefix
const ENV_PREFIX: &str = "GITNOTES";

/// Name of the directory under the system temp dir used for scratch copies.
pub const APP_DIR_NAME: &str = "restructured-notes";

/// Options shared by every create/open/save call.
#[derive(Debug, Clone)]
pub struct NotebookOptions {
    /// Identity used for every commit the notebook makes.
    pub signature: GitSignature,
    /// Root under which compressed notebooks are unpacked.
    pub scratch_root: PathBuf,
    /// Upper bound on waiting for the background repository init/open.
    pub init_timeout: Duration,
}

impl Default for NotebookOptions {
    fn default() -> Self {
        Self {
            signature: GitSignature::default(),
            scratch_root: std::env::temp_dir().join(APP_DIR_NAME),
            init_timeout: Duration::from_secs(30),
        }
    }
}

impl NotebookOptions {
    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        let mut options = Self::default();
        options.apply_env_overrides();
        options
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(format!("{}_AUTHOR_NAME", ENV_PREFIX)) {
            if !val.is_empty() {
                self.signature.name = val;
            }
        }

        if let Ok(val) = std::env::var(format!("{}_AUTHOR_EMAIL", ENV_PREFIX)) {
            if !val.is_empty() {
                self.signature.email = val;
            }
        }

        if let Ok(val) = std::env::var(format!("{}_SCRATCH_DIR", ENV_PREFIX)) {
            if !val.is_empty() {
                self.scratch_root = PathBuf::from(val);
            }
        }

        if let Ok(val) = std::env::var(format!("{}_INIT_TIMEOUT_SECS", ENV_PREFIX)) {
            if let Ok(secs) = val.parse::<u64>() {
                self.init_timeout = Duration::from_secs(secs);
            }
        }
    }

    /// Set the commit identity.
    pub fn signature(mut self, signature: GitSignature) -> Self {
        self.signature = signature;
        self
    }

    /// Set the scratch root.
    pub fn scratch_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.scratch_root = path.into();
        self
    }

    /// Set the init timeout.
    pub fn init_timeout(mut self, timeout: Duration) -> Self {
        self.init_timeout = timeout;
        self
    }

    /// Staging directory for a compressed notebook being created.
    pub(crate) fn create_staging_dir(&self, segment: &str) -> PathBuf {
        self.scratch_root.join("decompressed-notebooks").join(segment)
    }

    /// Parent of the per-open scratch directories of compressed notebooks.
    pub(crate) fn open_staging_root(&self) -> PathBuf {
        self.scratch_root.join("opened-notebooks")
    }
}
