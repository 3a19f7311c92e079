//! Error handling types and utilities.

use std::path::PathBuf;

/// A specialized Result type for site-level operations.
///
/// This is an alias for `anyhow::Result` with context added via `.context()` and
/// `.with_context()` methods throughout the codebase.
pub type Result<T> = anyhow::Result<T>;

/// Failure to parse a generated documentation script.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    /// None of the known script shapes matched the source.
    #[error("unrecognized documentation script")]
    Unrecognized,
    /// A `implementors["..."] = ` assignment was not followed by a valid record array.
    #[error("invalid implementors entry for crate '{crate_name}': {source}")]
    InvalidRecords {
        crate_name: String,
        #[source]
        source: serde_json::Error,
    },
    /// The `initSidebarItems(...)` argument was not a valid item table.
    #[error("invalid sidebar items table: {0}")]
    InvalidSidebar(#[source] serde_json::Error),
    /// A sidebar table used a kind tag rustdoc does not emit.
    #[error("unknown sidebar item kind '{0}'")]
    UnknownKind(String),
    /// The script shape was recognized but ended before the table was closed.
    #[error("truncated script: expected {0}")]
    Truncated(&'static str),
}

/// A single invariant violation found while validating a table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableIssue {
    /// A record lists a type that lives outside the crate it is filed under.
    #[error("record in crate '{crate_name}' lists foreign type '{type_path}'")]
    CrateMismatch {
        crate_name: String,
        type_path: String,
    },
    /// A record names no implementing type at all.
    #[error("record #{index} in crate '{crate_name}' lists no types")]
    MissingTypes { crate_name: String, index: usize },
    /// Two sidebar entries of the same kind share a name.
    #[error("duplicate {kind} '{name}' in sidebar")]
    DuplicateName { kind: String, name: String },
}

/// All invariant violations found in one table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{} invariant violation(s)", .issues.len())]
pub struct TableError {
    pub issues: Vec<TableIssue>,
}

impl TableError {
    /// Returns `Ok(())` when no issues were collected.
    pub(crate) fn check(issues: Vec<TableIssue>) -> std::result::Result<(), Self> {
        if issues.is_empty() {
            Ok(())
        } else {
            Err(Self { issues })
        }
    }
}

/// Error returned when loading a documentation tree fails.
#[derive(Debug, Clone)]
pub enum LoadError {
    /// Documentation directory not found at the expected path.
    NotFound { path: PathBuf },
    /// Failed to read or parse one of the scripts.
    ParseError { path: PathBuf, error: String },
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { path } => {
                write!(f, "Documentation directory not found at {}", path.display())
            }
            Self::ParseError { path, error } => {
                write!(f, "Failed to load {}: {}", path.display(), error)
            }
        }
    }
}

impl std::error::Error for LoadError {}
