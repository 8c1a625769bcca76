//! Preference store error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading or writing the preference file.
#[derive(Debug, Error)]
pub enum PreferenceError {
    /// The preference file could not be read or written.
    #[error("preference file I/O failed at {path}: {source}")]
    Io {
        /// Location of the preference file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The preference file exists but is not a JSON object.
    #[error("preference file {path} is not valid JSON: {source}")]
    Parse {
        /// Location of the preference file
        path: PathBuf,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// No configuration directory is known for this platform.
    #[error("no configuration directory available; pass --prefs explicitly")]
    NoConfigDir,
}
