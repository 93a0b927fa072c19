//! Errors in the library.
use thiserror::Error;

/// Errors in the library.
#[derive(Error, Debug)]
pub enum EvalError {
    /// The base name of a checkpoint path does not follow the naming scheme.
    #[error("malformed checkpoint name: {0}")]
    MalformedCheckpointName(String),

    /// The algorithm tag of a checkpoint is not in the registry.
    #[error("unknown algorithm tag: {0}")]
    UnknownAlgorithm(String),

    /// No task count is known for the environment.
    #[error("no task count known for environment: {0}")]
    UnsupportedEnvironment(String),

    /// A task-specific parameter view was requested but not found.
    #[error("no parameter view for task {0}")]
    UnknownTaskView(i64),

    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKeyError(String),

    /// Record value type error.
    #[error("Record value type error: {0}")]
    RecordValueTypeError(String),
}
