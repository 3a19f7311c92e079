//! Configuration file and environment handling.
//!
//! Settings come from, in increasing priority: built-in defaults, a
//! `docsite-index.toml` file, the `DOCSITE_INDEX_DOC_DIR` environment variable
//! and command line flags.

use crate::error::Result;
use anyhow::Context;
use serde::Deserialize;
use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = "docsite-index.toml";
/// Environment variable overriding the documentation directory.
pub const DOC_DIR_ENV: &str = "DOCSITE_INDEX_DOC_DIR";

const DEFAULT_DOC_DIR: &str = "target/doc";

/// Settings read from `docsite-index.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// rustdoc output directory to index.
    pub doc_dir: Option<PathBuf>,
    /// Where index snapshots are stored.
    pub cache_dir: Option<PathBuf>,
    /// Set to `false` to always rescan.
    pub cache: Option<bool>,
    /// Default log directive, e.g. `debug` or `docsite_index=trace`.
    pub log_level: Option<String>,
}

impl Config {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Invalid configuration")
    }

    /// Loads the explicit config file, or `docsite-index.toml` from the
    /// working directory when present, or the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let candidate = PathBuf::from(CONFIG_FILE);
                if !candidate.is_file() {
                    return Ok(Self::default());
                }
                candidate
            }
        };

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Resolves the documentation directory from the flag, the environment
    /// value and this file, in that order.
    pub fn doc_dir(&self, flag: Option<&Path>, env: Option<&str>) -> PathBuf {
        let chosen = flag
            .map(Path::to_path_buf)
            .or_else(|| env.filter(|v| !v.is_empty()).map(PathBuf::from))
            .or_else(|| self.doc_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DOC_DIR));
        expand_tilde_path(&chosen)
    }

    /// Snapshot directory, or `None` when caching is disabled or no cache
    /// location is available.
    pub fn cache_dir(&self) -> Option<PathBuf> {
        if self.cache == Some(false) {
            return None;
        }
        self.cache_dir
            .as_deref()
            .map(expand_tilde_path)
            .or_else(|| dirs::cache_dir().map(|dir| dir.join("docsite-index")))
    }
}

/// Expand tilde (`~`) in paths to the user's home directory.
///
/// Examples:
/// - `~/projects/foo` becomes `/home/user/projects/foo`
/// - `~` becomes `/home/user`
/// - Other paths are returned unchanged
///
/// Returns `Cow::Borrowed` if no expansion needed, `Cow::Owned` if expanded.
pub fn expand_tilde(path: &str) -> Cow<'_, str> {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return Cow::Owned(home.join(stripped).display().to_string());
        }
    } else if path == "~"
        && let Some(home) = dirs::home_dir()
    {
        return Cow::Owned(home.display().to_string());
    }
    Cow::Borrowed(path)
}

fn expand_tilde_path(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(s) => PathBuf::from(expand_tilde(s).as_ref()),
        None => path.to_path_buf(),
    }
}
