//! Error types for voice-clone-demo.

use std::fmt;

use crate::demo::Stage;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Candle tensor or ONNX graph evaluation error.
    #[error("candle: {0}")]
    Candle(#[from] candle_core::Error),

    /// Audio processing error (WAV I/O, resampling).
    #[error("audio: {0}")]
    Audio(String),

    /// Model file or graph could not be loaded.
    #[error("model load: {0}")]
    ModelLoad(String),

    /// A model produced or expected tensors of the wrong shape or count.
    #[error("model contract: {0}")]
    ModelContract(String),

    /// Invalid configuration.
    #[error("config: {0}")]
    Config(String),

    /// Status display error.
    #[error("display: {0}")]
    Display(String),

    /// Audio output device error.
    #[error("playback: {0}")]
    Playback(String),

    /// Interactive input ran out (stdin closed).
    #[error("input closed")]
    InputClosed,

    /// I/O error.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    /// An iteration step failed.
    #[error("{stage}: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: Box<Error>,
    },

    /// The consecutive-failure bound was reached.
    #[error("{count} consecutive iterations failed, last error: {last}")]
    TooManyFailures { count: u32, last: Box<Error> },
}

/// How a per-iteration failure should be reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Environment trouble that may clear up on its own: missing files,
    /// unreadable audio, a busy audio device.
    Transient,
    /// Model or configuration faults that will repeat until someone fixes them.
    Internal,
}

impl fmt::Display for FailureClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transient => f.write_str("transient"),
            Self::Internal => f.write_str("internal"),
        }
    }
}

impl Error {
    /// Classify the error for logging and retry bookkeeping.
    pub fn class(&self) -> FailureClass {
        match self {
            Error::Audio(_)
            | Error::Display(_)
            | Error::Playback(_)
            | Error::InputClosed
            | Error::Io(_) => FailureClass::Transient,
            Error::Candle(_)
            | Error::ModelLoad(_)
            | Error::ModelContract(_)
            | Error::Config(_)
            | Error::Json(_) => FailureClass::Internal,
            Error::Stage { source, .. } => source.class(),
            Error::TooManyFailures { last, .. } => last.class(),
        }
    }

    /// The stage an iteration failed at, if the error carries one.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Error::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Strip stage wrappers and return the underlying error.
    pub fn root(&self) -> &Error {
        match self {
            Error::Stage { source, .. } => source.root(),
            other => other,
        }
    }
}

impl From<hound::Error> for Error {
    fn from(error: hound::Error) -> Self {
        match error {
            hound::Error::IoError(io) => Error::Io(io),
            other => Error::Audio(other.to_string()),
        }
    }
}

/// Attach the failing [`Stage`] to a result.
pub(crate) trait StageExt<T> {
    fn at(self, stage: Stage) -> Result<T>;
}

impl<T> StageExt<T> for Result<T> {
    fn at(self, stage: Stage) -> Result<T> {
        self.map_err(|source| Error::Stage {
            stage,
            source: Box::new(source),
        })
    }
}
