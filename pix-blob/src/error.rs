use thiserror::Error;

/// Boxed error carried as the source of backend failures
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result type for gateway and store operations
pub type BlobResult<T> = Result<T, BlobError>;

/// Errors that can occur while talking to object storage
#[derive(Error, Debug)]
pub enum BlobError {
    #[error("Listing {path} failed: {source}")]
    ListFailed {
        path: String,
        #[source]
        source: BoxError,
    },

    #[error("Could not resolve a download URL for {key}: {source}")]
    ResolveFailed {
        key: String,
        #[source]
        source: BoxError,
    },

    #[error("Upload to {key} failed: {source}")]
    UploadFailed {
        key: String,
        #[source]
        source: BoxError,
    },

    #[error("Object not found: {key}")]
    NotFound { key: String },

    #[error("Invalid request: {message}")]
    Invalid { message: String },

    #[error("Storage backend error: {source}")]
    Backend {
        #[source]
        source: BoxError,
    },

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl BlobError {
    /// Create a backend error from any error type
    pub fn backend<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend {
            source: Box::new(error),
        }
    }

    /// Create a listing failure for a namespace path
    pub fn list_failed<P: Into<String>, E: Into<BoxError>>(path: P, error: E) -> Self {
        Self::ListFailed {
            path: path.into(),
            source: error.into(),
        }
    }

    /// Create a locator resolution failure
    pub fn resolve_failed<K: Into<String>, E: Into<BoxError>>(key: K, error: E) -> Self {
        Self::ResolveFailed {
            key: key.into(),
            source: error.into(),
        }
    }

    /// Create an upload failure
    pub fn upload_failed<K: Into<String>, E: Into<BoxError>>(key: K, error: E) -> Self {
        Self::UploadFailed {
            key: key.into(),
            source: error.into(),
        }
    }

    /// Create an invalid request error
    pub fn invalid<S: Into<String>>(message: S) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found<S: Into<String>>(key: S) -> Self {
        Self::NotFound { key: key.into() }
    }

    /// True for failures of the read side (listing or URL resolution)
    pub fn is_transfer(&self) -> bool {
        matches!(self, Self::ListFailed { .. } | Self::ResolveFailed { .. })
    }
}
