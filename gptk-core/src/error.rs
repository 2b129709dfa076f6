use gptk_model::SourceKind;
use thiserror::Error;

/// Problems with a run's configuration, caught before any network activity.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid {field} pattern: {source}")]
    InvalidRegex {
        field: &'static str,
        #[source]
        source: regex::Error,
    },

    #[error("lower size bound {lower} is greater than upper size bound {upper}")]
    InvertedSizeBounds { lower: u64, upper: u64 },

    #[error("lower date bound {lower} is after upper date bound {upper}")]
    InvertedDateBounds { lower: String, upper: String },

    #[error("missing {0}")]
    MissingTarget(&'static str),

    #[error("similarity threshold {0} is outside 0.0..=1.0")]
    InvalidThreshold(f64),

    #[error("action '{action}' is not available for the {kind} source")]
    ActionUnavailable {
        action: &'static str,
        kind: SourceKind,
    },
}

#[derive(Error, Debug)]
pub enum ToolkitError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("a run is already in progress")]
    AlreadyRunning,

    #[error("Remote call '{operation}' failed: {message}")]
    Remote {
        operation: &'static str,
        message: String,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Image decode error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ToolkitError {
    pub fn remote(operation: &'static str, message: impl Into<String>) -> Self {
        ToolkitError::Remote {
            operation,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ToolkitError>;
