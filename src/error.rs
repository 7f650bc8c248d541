use thiserror::Error;

/// Custom Result type for this crate.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// The Error type for pipeline operations.
///
/// Dropping a record that fails a predicate is *not* an error: stages drop
/// silently and the run summary accounts for it. Everything here terminates
/// the stream.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Configuration validation error: {0}")]
    ConfigValidationError(String),

    #[error("I/O error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    /// Upstream generation/read failure. Terminates the stream early; the
    /// executor cancels the run so every downstream handle closes.
    #[error("Source '{source_name}' failed: {reason}")]
    SourceError { source_name: String, reason: String },

    /// A predicate that is not total failed on some input. By contract this
    /// must not occur; when it does, it is fatal to the owning stage and
    /// propagates as a terminated stream rather than a silent drop.
    #[error("Predicate failure in stage '{stage_name}': {source}")]
    PredicateFailed {
        stage_name: String,
        source: Box<PipelineError>,
    },

    /// A send on an already-released handle while the run was not cancelled.
    /// Programming error, fatal, never retried.
    #[error("Handle for stage '{stage_name}' closed before end of stream")]
    HandleClosed { stage_name: String },

    #[error("Stage task failed to complete: {source}")]
    TaskJoin {
        #[from]
        source: tokio::task::JoinError,
    },

    #[error("Serialization/Deserialization error: {source}")]
    SerializationError {
        #[from]
        source: serde_json::Error,
    },

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}
