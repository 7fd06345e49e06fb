use std::path::PathBuf;

use clap::error::ErrorKind;

/* ---------- */

/// Errors returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The command line doesn't have the expected shape, or help was asked for.
    #[error("{0}")]
    Usage(clap::Error),

    /// An argument, option or environment variable holds a malformed value.
    #[error("{0}")]
    InvalidArgument(clap::Error),

    /// A worker context was missing something to build its worker.
    #[error("invalid context: {0}")]
    InvalidContext(String),

    /// The activity file couldn't be created.
    #[error("failed to create the activity file {}: {source}", path.display())]
    LogFile {
        /// Path of the activity file.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A worker thread couldn't be spawned.
    #[error(transparent)]
    ThreadStart(#[from] std::io::Error),

    /// A worker thread panicked before the run completed.
    #[error("worker {0} panicked")]
    WorkerPanicked(String),

    /// An activity sink couldn't be written to or flushed.
    #[error("failed to write the activity log: {0}")]
    Sink(std::io::Error),
}

impl Error {
    #[inline]
    pub(crate) fn context(msg: impl Into<String>) -> Self {
        Self::InvalidContext(msg.into())
    }

    /// Returns `true` if the error comes from malformed user input,
    /// in which case nothing was created before it was detected.
    #[inline]
    pub fn is_usage(&self) -> bool {
        matches!(self, Self::Usage(_) | Self::InvalidArgument(_))
    }
}

impl From<clap::Error> for Error {
    fn from(err: clap::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidValue | ErrorKind::ValueValidation | ErrorKind::InvalidUtf8 => {
                Self::InvalidArgument(err)
            }
            _ => Self::Usage(err),
        }
    }
}
