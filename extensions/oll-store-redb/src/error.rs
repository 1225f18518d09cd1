use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    DatabaseError(#[from] redb::DatabaseError),
    #[error("{0}")]
    TransactionError(#[from] redb::TransactionError),
    #[error("{0}")]
    TableError(#[from] redb::TableError),
    #[error("{0}")]
    StorageError(#[from] redb::StorageError),
    #[error("{0}")]
    CommitError(#[from] redb::CommitError),
    #[error(transparent)]
    OllError(#[from] oll::error::Error),
}

impl From<Error> for oll::error::Error {
    fn from(error: Error) -> Self {
        match error {
            Error::OllError(error) => error,
            error => oll::error::Error::Storage(Box::new(error)),
        }
    }
}
