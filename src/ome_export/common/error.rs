use thiserror::Error;

/// Coarse classification of an [`ExportError`], for callers that only need to
/// know which stage failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input to model construction
    Validation,
    /// The encoder rejected the model or could not create the output
    EncoderBinding,
    /// The encoder could not switch to the requested series
    SeriesSwitch,
    /// The encoder rejected a single plane
    PlaneWrite,
    /// The output resource could not be released cleanly
    ResourceRelease,
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Invalid image dimensions: width={0}, height={1}")]
    InvalidDimensions(u32, u32),

    #[error("Invalid timepoint count: {0}")]
    InvalidTimepoints(usize),

    #[error("Delay label count {labels} does not match timepoint count {timepoints}")]
    ModuloLabelMismatch { labels: usize, timepoints: usize },

    #[error("Invalid plate layout: {0}")]
    InvalidPlateLayout(String),

    #[error("Failed to bind metadata to encoder: {0}")]
    EncoderBinding(String),

    #[error("Failed to switch to series {series}: {reason}")]
    SeriesSwitch { series: usize, reason: String },

    #[error("Failed to write plane {plane} of series {series}: {reason}")]
    PlaneWrite {
        series: usize,
        plane: usize,
        reason: String,
    },

    #[error("Failed to release output resource: {0}")]
    ResourceRelease(String),
}

impl ExportError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExportError::InvalidDimensions(..)
            | ExportError::InvalidTimepoints(_)
            | ExportError::ModuloLabelMismatch { .. }
            | ExportError::InvalidPlateLayout(_) => ErrorKind::Validation,
            ExportError::EncoderBinding(_) => ErrorKind::EncoderBinding,
            ExportError::SeriesSwitch { .. } => ErrorKind::SeriesSwitch,
            ExportError::PlaneWrite { .. } => ErrorKind::PlaneWrite,
            ExportError::ResourceRelease(_) => ErrorKind::ResourceRelease,
        }
    }

    pub fn is_recoverable(&self) -> bool {
        matches!(self.kind(), ErrorKind::SeriesSwitch | ErrorKind::PlaneWrite)
    }
}

pub type Result<T> = std::result::Result<T, ExportError>;
