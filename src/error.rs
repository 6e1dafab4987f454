//! Error handling.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by the subtitle post-processing core.
#[derive(Debug, Error)]
pub enum Error {
    /// A detected box did not carry exactly four corner points.
    #[error("malformed box: expected 4 points, got {points}")]
    MalformedBox { points: usize },

    /// A frame with no rows or no columns was handed to the region locator.
    #[error("empty frame ({width}x{height})")]
    EmptyFrame { width: u32, height: u32 },

    /// The correction dictionary could not be opened.
    #[error("correction dictionary not found: {}", path.display())]
    ResourceNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The correction dictionary is not a flat JSON object of strings.
    #[error("could not parse correction dictionary {}", path.display())]
    ResourceParseError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("config file {} does not exist", path.display())]
    ConfigNotFound { path: PathBuf },

    #[error("failed to parse config file {}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value {value} for '{field}'")]
    InvalidConfig { field: &'static str, value: String },

    /// OCR model files are missing from the model directory.
    #[error("OCR model not found: {}", path.display())]
    ModelNotFound { path: PathBuf },

    #[error("image error")]
    Image(#[from] image::ImageError),

    #[error("I/O error")]
    Io(#[from] std::io::Error),

    /// The OCR engine reported a failure.
    #[error("OCR engine error: {message}")]
    Engine { message: String },

    /// An input file is not a png, jpg or jpeg image.
    #[error("unsupported image file: {}", path.display())]
    UnsupportedImage { path: PathBuf },

    /// A pipeline step failed with an error from outside this crate.
    #[error("pipeline failed: {0:#}")]
    Pipeline(anyhow::Error),
}

impl Error {
    pub(crate) fn engine(message: impl std::fmt::Display) -> Self {
        Self::Engine {
            message: message.to_string(),
        }
    }

    /// Recover our own error from a pipeline failure when a step raised one.
    pub(crate) fn from_pipeline(err: anyhow::Error) -> Self {
        err.downcast::<Self>().unwrap_or_else(Self::Pipeline)
    }
}

/// Our result type.
pub type Result<T> = std::result::Result<T, Error>;
