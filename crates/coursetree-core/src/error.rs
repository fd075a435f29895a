//! Content error types.
//!
//! These errors represent structural problems in the content metadata. They
//! are fatal to tree construction and surface to whoever asked for the tree.

use std::path::PathBuf;

use thiserror::Error;

use crate::treepath::TreePath;

/// Errors that can occur while loading metadata or building the content tree.
#[derive(Debug, Error)]
pub enum ContentError {
    /// No `metadata.toml` at the expected location.
    #[error("metadata file {0} does not exist")]
    MissingMetadata(PathBuf),

    /// The metadata file exists but could not be parsed.
    #[error("invalid metadata in {path}: {message}")]
    Metadata { path: PathBuf, message: String },

    /// A chain of links leads back to a directory that is still being resolved.
    #[error("link cycle detected at {0}")]
    LinkCycle(PathBuf),

    /// Exercise difficulty outside of 1..=20.
    #[error("exercise {path} has difficulty {difficulty}, expected a value between 1 and 20")]
    InvalidDifficulty { path: TreePath, difficulty: i64 },

    /// None of the preferred languages has documentation.
    #[error("{0} has no documentation in any of the preferred languages")]
    MissingLanguage(TreePath),

    /// Two children of the same section share an id.
    #[error("section {parent} contains more than one child named \"{child}\"")]
    DuplicateChild { parent: TreePath, child: String },

    /// A child id that cannot be a path segment.
    #[error("section {parent} has a child with invalid id \"{id}\": ids must be non-empty and must not contain ','")]
    InvalidId { parent: TreePath, id: String },

    /// Descending into the tree along a path that does not exist.
    #[error("{0} does not exist in the content tree")]
    InvalidDescent(TreePath),

    /// Judge metadata could not be turned into a judge.
    #[error("cannot create judge for {path}: {message}")]
    Judge { path: TreePath, message: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
