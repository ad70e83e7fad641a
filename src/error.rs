//! Error types for the hanja-tracing library

use thiserror::Error;

/// Result type alias using WorksheetError
pub type Result<T> = std::result::Result<T, WorksheetError>;

/// Errors that can occur while building a worksheet
#[derive(Debug, Error)]
pub enum WorksheetError {
    /// Error from the underlying lopdf library
    #[error("PDF operation failed: {0}")]
    PdfError(#[from] lopdf::Error),

    /// Reading input data or writing the finished document failed
    #[error("I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed passage, gloss, override or configuration file
    #[error("Invalid JSON data: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid page geometry or layout parameters
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Invalid dimensions
    #[error("Invalid dimensions: {0}")]
    DimensionError(String),

    /// A passage without any characters reached the renderer
    #[error("Passage '{0}' has no characters to render")]
    EmptyPassage(String),

    /// Font data could not be parsed
    #[error("Font loading failed: {0}")]
    FontError(String),

    /// A drawing call was made before the first page was added
    #[error("No page has been added to the document")]
    NoActivePage,
}
