use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ToolError>;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("timed out after {waited:?} waiting for '{}'", path.display())]
    Timeout { path: PathBuf, waited: Duration },

    #[error("failed to start '{}': {source}", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("editor exited with {status}")]
    EditorFailed { status: std::process::ExitStatus },

    #[error("invalid path '{}': {reason}", path.display())]
    InvalidPath { path: PathBuf, reason: String },

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid configuration in '{}': {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error(transparent)]
    Document(#[from] spine2d_doc::Error),
}
