use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    IoError(#[from] std::io::Error),
    #[error("{0}")]
    SerdeJsonError(#[from] serde_json::Error),
    #[error("Key is not valid hex: {0}")]
    HexError(#[from] hex::FromHexError),
    #[error("Value {0} cannot be written to a flatfile")]
    UnrepresentableValue(f64),
    #[error(transparent)]
    OllError(#[from] oll::error::Error),
}

impl From<Error> for oll::error::Error {
    fn from(error: Error) -> Self {
        match error {
            Error::OllError(error) => error,
            Error::HexError(error) => oll::error::Error::CorruptedStorage(error.to_string()),
            error => oll::error::Error::Storage(Box::new(error)),
        }
    }
}
