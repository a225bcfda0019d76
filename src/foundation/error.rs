use std::path::PathBuf;

use crate::foundation::core::Stage;

/// Convenience result type used across reelkit.
pub type ReelResult<T> = Result<T, ReelError>;

/// Top-level error taxonomy used by pipeline APIs.
#[derive(thiserror::Error, Debug)]
pub enum ReelError {
    /// A source could not be decoded as a supported still image (JPEG or PNG).
    #[error("unsupported format{}: {reason}", fmt_index(.index))]
    UnsupportedFormat {
        /// Position of the failing image in the job, when known.
        index: Option<usize>,
        /// Decoder or gate message.
        reason: String,
    },

    /// A decoded image has degenerate geometry.
    #[error("invalid dimensions{}: {width}x{height}", fmt_index(.index))]
    InvalidDimensions {
        /// Position of the failing image in the job, when known.
        index: Option<usize>,
        /// Source width in pixels.
        width: u32,
        /// Source height in pixels.
        height: u32,
    },

    /// Transition window or still duration is misconfigured.
    #[error("invalid duration: {0}")]
    InvalidDuration(String),

    /// A clip does not match the timeline resolution.
    #[error(
        "resolution mismatch at clip {clip}: got {}, expected {}",
        fmt_dims(.got),
        fmt_dims(.expected)
    )]
    ResolutionMismatch {
        /// Position of the offending clip.
        clip: usize,
        /// Timeline resolution.
        expected: (u32, u32),
        /// Clip resolution.
        got: (u32, u32),
    },

    /// The encoder could not write the output.
    #[error("encoding failure{}: {reason}", fmt_index(.clip))]
    EncodingFailure {
        /// Clip being written when the failure happened, when known.
        clip: Option<usize>,
        /// Encoder message.
        reason: String,
    },

    /// Cooperative cancellation was observed.
    #[error("canceled during {stage} after {completed} item(s)")]
    Canceled {
        /// Stage that observed the cancellation.
        stage: Stage,
        /// Items fully completed in that stage.
        completed: usize,
    },

    /// Invalid user-provided configuration.
    #[error("validation error: {0}")]
    Validation(String),

    /// A source file could not be read.
    #[error("io error{} reading '{}': {source}", fmt_index(.index), .path.display())]
    Io {
        /// Position of the failing image in the job, when known.
        index: Option<usize>,
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A failure annotated with the pipeline stage it happened in.
    #[error("{stage} stage failed: {source}")]
    Stage {
        /// Stage that failed.
        stage: Stage,
        /// Underlying failure.
        #[source]
        source: Box<ReelError>,
    },

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn fmt_index(index: &Option<usize>) -> String {
    match index {
        Some(i) => format!(" at index {i}"),
        None => String::new(),
    }
}

fn fmt_dims(dims: &(u32, u32)) -> String {
    format!("{}x{}", dims.0, dims.1)
}

impl ReelError {
    /// Build a [`ReelError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ReelError::InvalidDuration`] value.
    pub fn invalid_duration(msg: impl Into<String>) -> Self {
        Self::InvalidDuration(msg.into())
    }

    /// Build a [`ReelError::UnsupportedFormat`] value without an index.
    pub fn unsupported_format(reason: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            index: None,
            reason: reason.into(),
        }
    }

    /// Build a [`ReelError::EncodingFailure`] value without a clip index.
    pub fn encoding(reason: impl Into<String>) -> Self {
        Self::EncodingFailure {
            clip: None,
            reason: reason.into(),
        }
    }

    /// Attach the position of the failing item. Existing indices are kept.
    pub fn at_index(mut self, i: usize) -> Self {
        match &mut self {
            Self::UnsupportedFormat { index, .. }
            | Self::InvalidDimensions { index, .. }
            | Self::Io { index, .. } => {
                index.get_or_insert(i);
            }
            Self::EncodingFailure { clip, .. } => {
                clip.get_or_insert(i);
            }
            _ => {}
        }
        self
    }

    /// Wrap with the stage that failed. Cancellation and already-wrapped errors are returned as-is.
    pub fn in_stage(self, stage: Stage) -> Self {
        match self {
            Self::Canceled { .. } | Self::Stage { .. } => self,
            other => Self::Stage {
                stage,
                source: Box::new(other),
            },
        }
    }

    /// Stage recorded on this error, if any.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Stage { stage, .. } | Self::Canceled { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Error with any stage wrappers removed.
    pub fn root_cause(&self) -> &ReelError {
        let mut cur = self;
        while let Self::Stage { source, .. } = cur {
            cur = source.as_ref();
        }
        cur
    }

    /// Item index carried by the root error, if any.
    pub fn index(&self) -> Option<usize> {
        match self.root_cause() {
            Self::UnsupportedFormat { index, .. }
            | Self::InvalidDimensions { index, .. }
            | Self::Io { index, .. } => *index,
            Self::EncodingFailure { clip, .. } => *clip,
            Self::ResolutionMismatch { clip, .. } => Some(*clip),
            _ => None,
        }
    }

    /// `true` when the root cause is cooperative cancellation.
    pub fn is_canceled(&self) -> bool {
        matches!(self.root_cause(), Self::Canceled { .. })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
