use thiserror::Error;

/// Errors thay may occur in this library.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// The configuration string could not be processed at all.
    ///
    /// An unknown mode is not an error, it falls back to echo.
    #[error("The configuration `{uri}` could not be parsed")]
    Configuration {
        /// The problematic configuration string.
        uri: String,

        /// What went wrong.
        #[source]
        source: UriError,
    },

    /// The simulator was asked to open while already open.
    #[error("The simulator is already open")]
    AlreadyOpen,

    /// The simulator was asked to do something which requires it to be open.
    #[error("The simulator is not open")]
    NotOpen,

    /// The simulator does not support the requested capability.
    #[error("Unsupported capability: {0}")]
    UnsupportedCapability(String),

    /// A configuration file was unreadable or malformed.
    #[error("Bad configuration file. Problem: `{0}`")]
    BadConfigFile(String),
}

impl Error {
    /// Get the problem description if this is a [`Error::BadConfigFile`].
    pub fn try_into_bad_config_file(self) -> Result<String, Self> {
        if let Self::BadConfigFile(v) = self {
            Ok(v)
        } else {
            Err(self)
        }
    }
}

/// Reasons a configuration string may be rejected.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum UriError {
    /// No `://` between scheme and mode.
    #[error("Missing `://` scheme separator")]
    MissingSchemeSeparator,

    /// Nothing in front of the `://`.
    #[error("Empty scheme")]
    EmptyScheme,
}
