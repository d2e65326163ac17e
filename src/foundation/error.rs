/// Convenience result type used across retype.
pub type RetypeResult<T> = Result<T, RetypeError>;

/// Top-level error taxonomy.
///
/// `Config` is fatal at startup. `Repository`, `Render` and `Encode` are scoped to the commit or
/// clip in progress. `Invariant` marks a broken internal precondition and should never fire for
/// well-formed input.
#[derive(thiserror::Error, Debug)]
pub enum RetypeError {
    /// Invalid flags, paths, fonts or other user-provided settings.
    #[error("configuration error: {0}")]
    Config(String),

    /// The commit history could not be walked or file content could not be read.
    #[error("repository error: {0}")]
    Repository(String),

    /// Text layout or rasterization failed.
    #[error("render error: {0}")]
    Render(String),

    /// Frame capture or video encoding failed.
    #[error("encode error: {0}")]
    Encode(String),

    /// Out-of-range cursor, empty diff sequence and similar programmer errors.
    #[error("invariant violation: {0}")]
    Invariant(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RetypeError {
    /// Build a [`RetypeError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`RetypeError::Repository`] value.
    pub fn repository(msg: impl Into<String>) -> Self {
        Self::Repository(msg.into())
    }

    /// Build a [`RetypeError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`RetypeError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`RetypeError::Invariant`] value.
    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::Invariant(msg.into())
    }

    /// Whether this error only affects the clip or commit in progress.
    ///
    /// Scoped errors are logged and the run moves on to the next file.
    pub fn is_scoped(&self) -> bool {
        matches!(self, Self::Repository(_) | Self::Render(_) | Self::Encode(_))
    }
}

impl From<std::io::Error> for RetypeError {
    fn from(err: std::io::Error) -> Self {
        Self::Other(anyhow::Error::new(err))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
