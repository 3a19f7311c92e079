//! Shared test fixtures and utilities for integration tests.
//!
//! # Fixtures
//!
//! `tests/fixtures/doc` is a minimal rustdoc output tree holding two real
//! generated scripts:
//! - `implementors/core/marker/trait.Unpin.js` (crates `num_bigint`,
//!   `num_integer`, `num_traits` and `rust_eterm`)
//! - `rust_eterm/terms/sidebar-items.js`
//!
//! Tests that write to disk copy it into a [`TempWorkspace`] first.

use rstest::fixture;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[allow(dead_code)] // Used across different integration test crates
pub const UNPIN_SCRIPT: &str = "implementors/core/marker/trait.Unpin.js";
#[allow(dead_code)] // Used across different integration test crates
pub const TERMS_SIDEBAR: &str = "rust_eterm/terms/sidebar-items.js";

/// Returns the bundled documentation tree.
pub fn fixture_doc_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/doc")
}

/// Reads one of the bundled scripts.
#[allow(dead_code)] // Used across different integration test crates
pub fn fixture_source(relative: &str) -> String {
    let path = fixture_doc_dir().join(relative);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture '{}': {}", path.display(), e))
}

/// A temporary workspace directory for test isolation.
///
/// Provides basic filesystem operations within a temp directory that is
/// automatically cleaned up when dropped.
#[allow(dead_code)] // Methods used across different integration test crates
pub struct TempWorkspace {
    _temp: TempDir,
    root: PathBuf,
}

#[allow(dead_code)] // Methods used across different integration test crates
impl TempWorkspace {
    /// Creates a new empty temporary workspace.
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let root = temp.path().to_path_buf();
        Self { _temp: temp, root }
    }

    /// Creates a workspace with the bundled documentation tree under `doc/`.
    pub fn with_fixture_site() -> Self {
        let workspace = Self::new();
        for relative in [UNPIN_SCRIPT, TERMS_SIDEBAR] {
            workspace.copy_file(&fixture_doc_dir().join(relative), &format!("doc/{}", relative));
        }
        workspace
    }

    /// Returns the root path of this workspace.
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// The documentation directory used by [`Self::with_fixture_site`].
    pub fn doc_dir(&self) -> PathBuf {
        self.root.join("doc")
    }

    /// Creates a file with the given content within this workspace.
    ///
    /// Parent directories are created automatically if they don't exist.
    ///
    /// # Panics
    /// Panics if file creation fails.
    pub fn create_file(&self, path: &str, content: &str) {
        let full_path = self.root.join(path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).unwrap_or_else(|e| {
                panic!("Failed to create parent directory for '{}': {}", path, e)
            });
        }
        std::fs::write(&full_path, content)
            .unwrap_or_else(|e| panic!("Failed to write file '{}': {}", path, e));
    }

    /// Copies a file from the real filesystem into this workspace.
    ///
    /// # Panics
    /// Panics if copying fails.
    pub fn copy_file(&self, source: &Path, dest_relative: &str) {
        let dest = self.root.join(dest_relative);
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).unwrap_or_else(|e| {
                panic!(
                    "Failed to create parent directory for '{}': {}",
                    dest_relative, e
                )
            });
        }
        std::fs::copy(source, &dest).unwrap_or_else(|e| {
            panic!(
                "Failed to copy '{}' to '{}': {}",
                source.display(),
                dest_relative,
                e
            )
        });
    }
}

impl Default for TempWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

/// A workspace holding a copy of the bundled documentation tree.
#[allow(dead_code)] // Used across different integration test crates
#[fixture]
pub fn fixture_site() -> TempWorkspace {
    TempWorkspace::with_fixture_site()
}
