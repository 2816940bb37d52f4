use super::Error;

/// Error when the resolved mapping breaks a global invariant after all
/// classes were mapped.
#[derive(Debug)]
pub(super) struct ValidationFailure {
    message: Box<str>,
}

impl std::error::Error for ValidationFailure {}

impl core::fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "validation failed: {}", self.message)
    }
}

impl Error {
    /// Creates a validation failure error.
    pub fn validation_failure(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::ValidationFailure(ValidationFailure {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is a validation failure.
    pub fn is_validation_failure(&self) -> bool {
        self.any(|kind| matches!(kind, super::ErrorKind::ValidationFailure(_)))
    }
}
