use std::sync::Arc;

/// Represents a result type for operations in this crate.
///
/// This `Result` type is a standard Rust `Result` type where the error variant is defined by the
/// [`Error`] enum.
pub type Result<T> = std::result::Result<T, Error>;

/// Enum representing possible errors.
///
/// `Error` is cheap to clone: the same value returned by a wrapped evaluator is handed to every
/// observer and then returned to the caller.
#[derive(thiserror::Error, Debug, Clone)]
#[non_exhaustive]
pub enum Error {
    /// A required collaborator was missing at construction time.
    #[error("{0}")]
    InvalidArgument(&'static str),

    /// The flag client has not been initialized yet.
    #[error("flag client is not ready")]
    ClientNotReady,

    /// The requested flag does not exist.
    #[error("flag not found")]
    FlagNotFound,

    /// The flag value does not match the type requested by the caller.
    #[error("flag value has the wrong type")]
    WrongType,

    /// The flag configuration could not be interpreted by the flag client.
    #[error("flag configuration is malformed")]
    MalformedFlag,

    /// Any other failure reported by the wrapped flag client.
    #[error(transparent)]
    // Arbitrary errors are not clonable, so we're wrapping them in an Arc.
    Evaluation(Arc<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Wrap an arbitrary error produced by a flag client.
    ///
    /// ```
    /// # use flaghook::Error;
    /// let err = Error::evaluation(std::io::Error::other("connection reset"));
    /// assert_eq!(err.to_string(), "connection reset");
    /// ```
    pub fn evaluation(err: impl std::error::Error + Send + Sync + 'static) -> Error {
        Error::Evaluation(Arc::new(err))
    }
}
