//! Error types for the transcription pipeline

use thiserror::Error;

/// Errors raised at the boundaries between pipeline stages.
///
/// Every variant is terminal for the current invocation: the pipeline is an
/// offline batch job and never retries or returns partial output.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TabError {
    /// The buffer cannot be analysed (shorter than one frame, zero sample rate, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The buffer has no meaningful amplitude to normalise against
    #[error("Degenerate input: {0}")]
    DegenerateInput(String),

    /// An empty note sequence reached the segmenter
    #[error("Empty input: no notes to segment")]
    EmptyInput,

    /// A note label with an unrecognised pitch class or octave
    #[error("Invalid note: {0:?}")]
    InvalidNote(String),

    /// A configuration value outside its accepted range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for pipeline operations
pub type TabResult<T> = Result<T, TabError>;
