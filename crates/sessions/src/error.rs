use {autodash_common::ContextError, thiserror::Error};

pub use autodash_common::Context;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("failed to load image: {0}")]
    Image(#[from] image::ImageError),

    #[error("{message}")]
    Message { message: String },
}

impl Error {
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }
}

impl From<ContextError> for Error {
    fn from(err: ContextError) -> Self {
        Self::Message {
            message: err.into_message(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
