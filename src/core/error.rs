use std::time::Duration;
use thiserror::Error;

/// Boxed error type carried by fatal worker failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// What a [`Worker`](crate::core::worker::Worker) can report back to the runner.
///
/// Only [`WorkerError::RateLimited`] is treated as transient. Everything else
/// aborts the run.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("rate limited: {message}")]
    RateLimited {
        message: String,
        /// Delay hinted by the provider, if it sent one.
        retry_after: Option<Duration>,
    },

    #[error(transparent)]
    Failed(BoxError),
}

impl WorkerError {
    pub fn rate_limited(message: impl Into<String>) -> Self {
        WorkerError::RateLimited {
            message: message.into(),
            retry_after: None,
        }
    }

    pub fn failed<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        WorkerError::Failed(err.into())
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, WorkerError::RateLimited { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("no input provided for placeholder '{{{0}}}'")]
    MissingInput(String),

    #[error("unterminated placeholder starting at byte {0}")]
    Unterminated(usize),
}

/// Coarse classification of a [`CrewError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Template,
    TaskFailed,
    ExhaustedRetries,
}

#[derive(Debug, Error)]
pub enum CrewError {
    #[error("failed to interpolate inputs into task {}: {source}", .index + 1)]
    Template {
        index: usize,
        #[source]
        source: TemplateError,
    },

    #[error("task {} failed: {source}", .index + 1)]
    Task {
        index: usize,
        #[source]
        source: WorkerError,
    },

    #[error("task {} still rate limited after {attempts} attempts: {last}", .index + 1)]
    ExhaustedRetries {
        index: usize,
        attempts: u32,
        last: String,
    },
}

impl CrewError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CrewError::Template { .. } => ErrorKind::Template,
            CrewError::Task { .. } => ErrorKind::TaskFailed,
            CrewError::ExhaustedRetries { .. } => ErrorKind::ExhaustedRetries,
        }
    }

    /// Position of the task that caused the failure.
    pub fn task_index(&self) -> usize {
        match self {
            CrewError::Template { index, .. }
            | CrewError::Task { index, .. }
            | CrewError::ExhaustedRetries { index, .. } => *index,
        }
    }
}
