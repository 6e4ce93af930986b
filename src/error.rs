//! Crate-level error types.

use std::fmt;

use crate::gpu::render_context::RenderContextError;

/// Errors produced by the picker crate.
#[derive(Debug)]
pub enum PickerError {
    /// GPU context initialization failure.
    Gpu(RenderContextError),
    /// Generic I/O failure (asset or options file).
    Io(std::io::Error),
    /// Malformed mesh asset.
    AssetParse(String),
    /// Material image could not be decoded.
    Image(image::ImageError),
    /// WGSL composition failed.
    Shader(String),
    /// Instance count does not fit below the "no object" identifier.
    InstanceLimit {
        /// Requested instance count.
        count: usize,
        /// Largest allowed count (exclusive bound is the sentinel).
        max: usize,
    },
    /// Synchronous GPU read-back failed.
    Readback(String),
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
    /// Viewer event-loop failure.
    Viewer(String),
}

impl fmt::Display for PickerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gpu(e) => write!(f, "GPU error: {e}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::AssetParse(msg) => write!(f, "asset parse error: {msg}"),
            Self::Image(e) => write!(f, "image decode error: {e}"),
            Self::Shader(msg) => write!(f, "shader error: {msg}"),
            Self::InstanceLimit { count, max } => {
                write!(
                    f,
                    "{count} instances requested, at most {max} can be picked"
                )
            }
            Self::Readback(msg) => write!(f, "pick read-back failed: {msg}"),
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
            Self::Viewer(msg) => write!(f, "viewer error: {msg}"),
        }
    }
}

impl std::error::Error for PickerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Gpu(e) => Some(e),
            Self::Io(e) => Some(e),
            Self::Image(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RenderContextError> for PickerError {
    fn from(e: RenderContextError) -> Self {
        Self::Gpu(e)
    }
}

impl From<std::io::Error> for PickerError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<image::ImageError> for PickerError {
    fn from(e: image::ImageError) -> Self {
        Self::Image(e)
    }
}
