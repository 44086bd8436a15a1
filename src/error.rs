//! Crate error

use std::sync::PoisonError;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A thread panicked while holding the ring lock.
    #[error("Lock poisoned: {0}")]
    Lock(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error(transparent)]
    IO(#[from] std::io::Error),
}

impl<T> From<PoisonError<T>> for Error {
    fn from(err: PoisonError<T>) -> Self {
        Error::Lock(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
