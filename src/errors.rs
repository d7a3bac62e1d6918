use thiserror::Error;

/// Represents errors that can occur while cleaning, filling or serializing an SVG document.
#[derive(Error, Debug)]
pub enum FillError {
    /// The input did not parse into a document whose root element is `<svg>`.
    ///
    /// Covers empty input, markup that is not well-formed XML, and XML rooted at
    /// some other element. The parser diagnostic is logged, not carried here.
    #[error("Invalid SVG input")]
    InvalidInput,

    /// Formatting error while writing the output markup.
    #[error("Formatting error during SVG serialization: {0}")]
    Format(#[from] std::fmt::Error),

    /// Fill parameters supplied as JSON could not be deserialized.
    #[error("Failed to deserialize fill parameters: {0}")]
    Json(#[from] serde_json::Error),

    /// An I/O error occurred while reading input or writing output files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A type alias for `Result<T, FillError>` for convenience within the crate.
pub type Result<T> = std::result::Result<T, FillError>;
