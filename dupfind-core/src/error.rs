use std::path::PathBuf;

use thiserror::Error;

/// Errors the core can raise.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("could not read `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
