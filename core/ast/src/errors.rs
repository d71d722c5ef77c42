//! Plumbing errors for the AST crate: failures about the compiler's own environment
//! (unreadable files, internal invariant violations), as opposed to `Diagnostic`s,
//! which are facts about the input program.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
#[must_use = "errors must not be silently ignored"]
pub enum AstError {
    /// A linked capsule name has no corresponding entry in the capsule-file map.
    #[error("capsule '{name}' could not be located: {expected}")]
    CapsuleNotFound { name: String, expected: String },

    /// Failed to read a source file.
    #[error("failed to read {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An internal invariant the AST relies on was violated.
    #[error("internal invariant violated: {reason}")]
    IntegrityError { reason: String },
}
