use thiserror::Error;

/// Failures while reading catalog markup.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// Markup is not well-formed, or the document structure is broken.
    #[error("parse error at byte {position}: {message}")]
    Parse { position: u64, message: String },

    #[error("unknown translation status \"{status}\" in context \"{context}\"")]
    UnknownStatus { context: String, status: String },

    #[error("invalid message in context \"{context}\": {message}")]
    InvalidMessage { context: String, message: String },

    #[error("duplicate context \"{0}\"")]
    DuplicateContext(String),
}

impl CatalogError {
    pub fn parse(position: u64, message: impl Into<String>) -> Self {
        CatalogError::Parse {
            position,
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("io error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("translation memory error: {0}")]
    Memory(String),

    #[error("machine translation error: {0}")]
    Ai(String),
}

impl CoreError {
    pub fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        CoreError::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
