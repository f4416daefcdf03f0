//! Error types for the chain rewrite engine.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for chain matching and rewriting.
///
/// A pattern that does not match is *not* an error; it is reported through
/// [`crate::pattern::MatchResult`]. The variants here cover structural
/// precondition violations inside a rewrite recipe, which abort that single
/// recipe application, and host-layer failures (parsing, io).
#[derive(Error, Debug)]
pub enum ChainfixError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Tree-sitter parse error for {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Tree-sitter query error: {0}")]
    Query(#[from] tree_sitter::QueryError),

    #[error("Glob pattern error: {0}")]
    Glob(#[from] globset::Error),

    #[error("{operation}: no link named '{name}' anchors this operation")]
    AnchorNotFound {
        operation: &'static str,
        name: String,
    },

    #[error("{operation}: invocation '{name}' has no arguments")]
    MissingArgument {
        operation: &'static str,
        name: String,
    },

    #[error("{operation}: expected an indexer access before '{name}'")]
    ExpectedIndexer {
        operation: &'static str,
        name: String,
    },

    #[error("{operation}: first argument of '{name}' is not an invocation of a method on an expression")]
    ExpectedInvocationOnMember {
        operation: &'static str,
        name: String,
    },

    #[error("{operation}: first argument of '{name}' is not a lambda")]
    ExpectedLambda {
        operation: &'static str,
        name: String,
    },

    #[error("capture slot '{slot}' is empty; no earlier operation extracted arguments into it")]
    EmptySlot { slot: String },

    #[error("{operation} is not supported: {reason}")]
    Unsupported {
        operation: &'static str,
        reason: String,
    },
}

/// A specialized Result type for chain rewriting operations.
pub type Result<T> = std::result::Result<T, ChainfixError>;
