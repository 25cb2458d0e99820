//! Custom error types used by this crate

/// Custom `Result` to prepopulate `Error` type
pub type Result<T> = std::result::Result<T, Error>;

/// A general error in decoding a DGPS broadcast
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Error {
    Decode { msg: String },
}

impl std::error::Error for Error {}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Decode { msg } => write!(f, "Error decoding message content: {}", msg),
        }
    }
}

impl From<&str> for Error {
    fn from(err: &str) -> Self {
        Self::Decode { msg: err.into() }
    }
}

impl From<String> for Error {
    fn from(err: String) -> Self {
        Self::Decode { msg: err }
    }
}

impl<T: std::fmt::Debug> From<nom::Err<nom::error::Error<T>>> for Error {
    fn from(err: nom::Err<nom::error::Error<T>>) -> Self {
        Self::Decode {
            msg: format!("{:?}", err),
        }
    }
}
