//! Error types module
//!
//! All errors crossing crate boundaries are unified under the `AppError`
//! enum, which can represent validation, upload, API, and image-processing
//! failures. Crate-internal error enums (e.g. the uploader's transport
//! errors) convert into `AppError` at the public seams.

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[error("Upload error: {0}")]
    Upload(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Image processing error: {0}")]
    ImageProcessing(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl AppError {
    /// Wrap an arbitrary error with a human-readable message.
    pub fn internal(message: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        AppError::InternalWithSource {
            message: message.into(),
            source: source.into(),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
