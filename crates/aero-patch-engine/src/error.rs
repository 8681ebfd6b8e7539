use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PatchEngineError>;

/// Errors surfaced by the file-backed parts of the engine.
///
/// Malformed patch lines and speed-hack rows are not errors; they are dropped while loading.
#[derive(Debug, Error)]
pub enum PatchEngineError {
    #[error("failed to read ini file {}: {source}", .path.display())]
    ReadIni {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write ini file {}: {source}", .path.display())]
    WriteIni {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
