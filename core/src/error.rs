//! Error types for the conversion pipeline

use std::path::PathBuf;

/// Result alias used throughout the pipeline
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Everything that can go wrong between a raster input and a written mesh.
///
/// Extraction, triangulation and serialization errors abort a conversion.
/// `TextureDecodeFailure` is the one recoverable kind: the texture mapper
/// records it as a warning and the mesh is emitted without UVs.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// Zero-sized image, unsupported channel count, or a sample buffer whose
    /// length does not match the declared dimensions
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// Height field too small (or too large) to triangulate
    #[error("invalid height field: {0}")]
    InvalidHeightField(String),

    /// Vector/CAD input that is deliberately not handled
    #[error("unsupported input format '.{extension}' for {path:?} (only raster images are supported)")]
    UnsupportedFormat { path: PathBuf, extension: String },

    /// Source image could not be opened or decoded
    #[error("failed to decode image {path:?}: {reason}")]
    Decode { path: PathBuf, reason: String },

    /// No image decoding capability was compiled in
    #[error("no image decoder available (build with the `image-decode` feature)")]
    DecoderUnavailable,

    /// Texture could not be decoded; the mesh is written without UVs
    #[error("texture {path:?} could not be applied: {reason}")]
    TextureDecodeFailure { path: PathBuf, reason: String },

    /// Output could not be created, written, or moved into place
    #[error("failed to write {path:?}: {source}")]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file unreadable, malformed, or out of range
    #[error("invalid configuration{}: {reason}", .path.as_ref().map(|p| format!(" in {p:?}")).unwrap_or_default())]
    Config {
        path: Option<PathBuf>,
        reason: String,
    },
}

/// Fieldless category of a [`ConvertError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidImage,
    InvalidHeightField,
    UnsupportedFormat,
    Decode,
    DecoderUnavailable,
    TextureDecodeFailure,
    WriteFailure,
    Config,
}

impl ConvertError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConvertError::InvalidImage(_) => ErrorKind::InvalidImage,
            ConvertError::InvalidHeightField(_) => ErrorKind::InvalidHeightField,
            ConvertError::UnsupportedFormat { .. } => ErrorKind::UnsupportedFormat,
            ConvertError::Decode { .. } => ErrorKind::Decode,
            ConvertError::DecoderUnavailable => ErrorKind::DecoderUnavailable,
            ConvertError::TextureDecodeFailure { .. } => ErrorKind::TextureDecodeFailure,
            ConvertError::WriteFailure { .. } => ErrorKind::WriteFailure,
            ConvertError::Config { .. } => ErrorKind::Config,
        }
    }

    /// Whether the pipeline may continue after this error
    pub fn is_recoverable(&self) -> bool {
        self.kind() == ErrorKind::TextureDecodeFailure
    }

    pub(crate) fn write_failure(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConvertError::WriteFailure {
            path: path.into(),
            source,
        }
    }
}
