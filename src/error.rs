//! Error types for GlanceTemp

use std::io;
use thiserror::Error;

/// Result type alias for GlanceTemp operations
pub type Result<T> = std::result::Result<T, GlanceError>;

/// Main error type
#[derive(Error, Debug)]
pub enum GlanceError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// NVML error (NVIDIA GPUs)
    #[cfg(feature = "nvidia")]
    #[error("NVML error: {0}")]
    Nvml(#[from] nvml_wrapper::error::NvmlError),

    /// A sensor read failed
    #[error("Sensor error: {0}")]
    Sensor(String),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Feature not available in this build or on this platform
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// Windowing or rendering failure
    #[error("GUI error: {0}")]
    Gui(String),
}

#[cfg(feature = "gui")]
impl From<eframe::Error> for GlanceError {
    fn from(err: eframe::Error) -> Self {
        GlanceError::Gui(err.to_string())
    }
}
