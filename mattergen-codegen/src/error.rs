//! Error types for code generation.

use std::path::PathBuf;

use thiserror::Error;

/// Error type for code generation operations.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// Cluster XML parsing error.
    #[error("cluster parse error: {0}")]
    Parse(#[from] mattergen_schema::ParseError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Two input files map to the same module name.
    #[error("module '{module}' from '{second}' collides with '{first}'")]
    ModuleCollision {
        /// Module name.
        module: String,
        /// File that claimed the name first.
        first: String,
        /// File that was rejected.
        second: String,
    },

    /// Generated module failed to tokenize.
    #[error("generated module '{module}' is not valid Rust: {message}")]
    Lexical {
        /// Module name.
        module: String,
        /// Tokenizer message.
        message: String,
    },

    /// Input or output path is not a usable directory.
    #[error("not a directory: {}", path.display())]
    InvalidDirectory {
        /// Offending path.
        path: PathBuf,
    },
}

impl CodegenError {
    /// Creates an invalid directory error.
    pub fn invalid_directory(path: impl Into<PathBuf>) -> Self {
        Self::InvalidDirectory { path: path.into() }
    }
}
