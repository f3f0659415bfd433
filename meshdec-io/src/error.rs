//! Error types for I/O operations

use thiserror::Error;

/// Errors that can occur while loading a mesh
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Format not recognized: {path} ({reason})")]
    UnrecognizedFormat { path: String, reason: String },

    #[error("Malformed vertex record on line {line}")]
    MalformedVertex { line: usize },

    #[error("Malformed face record on line {line}")]
    MalformedFace { line: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while saving a mesh
#[derive(Error, Debug)]
pub enum SaveError {
    #[error("Cannot open output file {path}: {source}")]
    CannotOpenOutput {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
