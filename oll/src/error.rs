/// Errors that would host custom errors for classifiers, stores, etc.
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    //Configuration Errors
    #[error("{0} is not yet supported")]
    UnsupportedAlgorithm(String),
    #[error("N-gram range {min}..={max} is invalid")]
    InvalidNGramRange { min: usize, max: usize },

    //Storage Errors
    #[error("Weight store has not been opened")]
    StorageNotOpened,
    #[error("Weight store is corrupted or invalid: {0}")]
    CorruptedStorage(String),
    #[error("Weight store failure: {0}")]
    Storage(Box<dyn std::error::Error + Sync + Send>),
    #[error("{0}")]
    IoError(#[from] std::io::Error),
    #[error("{0}")]
    SerdeJsonError(#[from] serde_json::Error),

    //Input Errors
    #[error("Count for feature '{key}' is invalid: {count}")]
    InvalidCount { key: String, count: f64 },
    #[error("Label {0} is invalid. Must be either 1 or -1")]
    InvalidLabel(f64),
    #[error("Feature key '{0}' is not valid hex")]
    InvalidFeatureKey(String),

    //Misc
    #[error(transparent)]
    Any(#[from] anyhow::Error),
    #[error(transparent)]
    Boxed(Box<dyn std::error::Error + Sync + Send>),
    #[error("An unknown error has occurred")]
    Other,
}

/// Broad classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected up front, before any storage is touched
    Configuration,
    /// Raised by the durable layer underneath a store
    Storage,
    /// Malformed feature vector or label
    Input,
    Other,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::UnsupportedAlgorithm(_) | Error::InvalidNGramRange { .. } => {
                ErrorKind::Configuration
            }
            Error::StorageNotOpened
            | Error::CorruptedStorage(_)
            | Error::Storage(_)
            | Error::IoError(_)
            | Error::SerdeJsonError(_) => ErrorKind::Storage,
            Error::InvalidCount { .. } | Error::InvalidLabel(_) | Error::InvalidFeatureKey(_) => {
                ErrorKind::Input
            }
            Error::Any(_) | Error::Boxed(_) | Error::Other => ErrorKind::Other,
        }
    }

    pub fn is_storage(&self) -> bool {
        self.kind() == ErrorKind::Storage
    }

    pub fn is_configuration(&self) -> bool {
        self.kind() == ErrorKind::Configuration
    }
}
