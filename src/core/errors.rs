//! Error taxonomy for analysis runs.
//!
//! Malformed input aborts the construction of the affected model. Missing
//! entities, files, or types are never errors; queries answer with empty
//! values so that downstream metrics still compute.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// A line with fewer columns than the format requires.
    #[error("malformed line: {line:?}")]
    MalformedLine { line: String },

    /// A field in the numeric tail of a dependency record that does not
    /// parse as the required integer type.
    #[error("invalid numeric field {value:?} in line {line:?}")]
    InvalidNumber { value: String, line: String },

    /// A supplemental refactoring line without an entity and a target file.
    #[error("invalid refactoring: {line:?}")]
    InvalidRefactoring { line: String },

    /// `DependencyGraph::diff` called on graphs with different vertex sets.
    /// This is a usage error, not a data condition.
    #[error("comparing graphs of different sizes: {left}, {right}")]
    GraphSizeMismatch { left: usize, right: usize },

    /// A vertex present in one graph but not in the other during a diff.
    #[error("vertex not found on other graph: {name:?}")]
    VertexNotFound { name: String },

    #[error("could not read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
