use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures of the annotation store file.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read annotation store {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file exists but is not a valid annotation document. Never papered over with
    /// an empty store, the user's pins and comments live in that file.
    #[error("malformed annotation store {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize annotations: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("failed to write annotation store {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
