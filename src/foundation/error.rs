use std::path::PathBuf;

/// Convenience result type used across framemaker.
pub type FramerResult<T> = Result<T, FramerError>;

/// Error taxonomy for the framing pipeline and the batch runner.
#[derive(thiserror::Error, Debug)]
pub enum FramerError {
    /// The requested frame name is not registered.
    #[error("unknown frame type: {name}. Available: {available}")]
    UnknownFrameType {
        /// Name that was looked up.
        name: String,
        /// Comma-separated list of registered names.
        available: String,
    },

    /// The input pattern matched nothing and is not an existing file either.
    #[error("no files found matching: {0}")]
    NoMatchingInput(String),

    /// The source screenshot could not be decoded or re-encoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// Filesystem failure on a concrete path.
    #[error("io error on '{}': {source}", path.display())]
    Io {
        /// Path being read or written.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The vector template could not be read or is not well-formed.
    #[error("template error: {0}")]
    TemplateLoad(String),

    /// The template lacks a single well-defined screenshot insertion point.
    #[error("template placeholder error: {0}")]
    PlaceholderMissing(String),

    /// The composed vector document could not be parsed.
    #[error("svg parse error: {0}")]
    Parse(String),

    /// The renderer could not produce or encode pixels.
    #[error("render error: {0}")]
    Render(String),

    /// A pipeline failure tagged with the screenshot that caused it.
    #[error("{}: {source}", input.display())]
    Job {
        /// Input screenshot path.
        input: PathBuf,
        /// Failure raised by one of the pipeline steps.
        #[source]
        source: Box<FramerError>,
    },

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FramerError {
    /// Build a [`FramerError::UnknownFrameType`] value.
    pub fn unknown_frame_type<'a>(
        name: impl Into<String>,
        available: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        Self::UnknownFrameType {
            name: name.into(),
            available: available.into_iter().collect::<Vec<_>>().join(", "),
        }
    }

    /// Build a [`FramerError::NoMatchingInput`] value.
    pub fn no_matching_input(pattern: impl Into<String>) -> Self {
        Self::NoMatchingInput(pattern.into())
    }

    /// Build a [`FramerError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`FramerError::Io`] value.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Build a [`FramerError::TemplateLoad`] value.
    pub fn template_load(msg: impl Into<String>) -> Self {
        Self::TemplateLoad(msg.into())
    }

    /// Build a [`FramerError::PlaceholderMissing`] value.
    pub fn placeholder_missing(msg: impl Into<String>) -> Self {
        Self::PlaceholderMissing(msg.into())
    }

    /// Build a [`FramerError::Parse`] value.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Build a [`FramerError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Attach the input path of the job that failed.
    pub fn in_job(self, input: impl Into<PathBuf>) -> Self {
        Self::Job {
            input: input.into(),
            source: Box::new(self),
        }
    }

    /// Innermost error, looking through [`FramerError::Job`] wrappers.
    pub fn root(&self) -> &FramerError {
        match self {
            Self::Job { source, .. } => source.root(),
            other => other,
        }
    }

    /// True when the failure points at a broken template asset rather than a bad input.
    pub fn is_template_defect(&self) -> bool {
        matches!(
            self.root(),
            Self::TemplateLoad(_) | Self::PlaceholderMissing(_)
        )
    }

    /// True when the failure must abort a whole batch instead of a single file.
    pub fn is_batch_fatal(&self) -> bool {
        self.is_template_defect()
            || matches!(
                self.root(),
                Self::UnknownFrameType { .. } | Self::NoMatchingInput(_)
            )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
