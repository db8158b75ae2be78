use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Per-request failures. Every variant becomes an HTTP response; none of them
/// takes the server down.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{what} not found")]
    NotFound { what: String },

    #[error("session store not connected")]
    StoreNotReady,

    #[error("failed to build navigation: {0}")]
    Navigation(#[from] autodash_plugins::Error),

    #[error("failed to render {template}: {source}")]
    Render {
        template: &'static str,
        #[source]
        source: askama::Error,
    },

    #[error("failed to encode image: {0}")]
    Image(#[from] image::ImageError),
}

impl Error {
    #[must_use]
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::StoreNotReady | Self::Navigation(_) | Self::Render { .. } | Self::Image(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            },
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, self.to_string()).into_response()
    }
}

pub type Result<T> = std::result::Result<T, Error>;
