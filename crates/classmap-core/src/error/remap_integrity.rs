use super::Error;

/// Error when existing data cannot be moved safely after a property changed
/// columns.
///
/// Raised for circular column moves that span more than one table and for
/// migration steps whose affected row count differs from the expected count.
#[derive(Debug)]
pub(super) struct RemapIntegrity {
    message: Box<str>,
}

impl std::error::Error for RemapIntegrity {}

impl core::fmt::Display for RemapIntegrity {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "remap integrity: {}", self.message)
    }
}

impl Error {
    /// Creates a remap integrity error.
    pub fn remap_integrity(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::RemapIntegrity(RemapIntegrity {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is a remap integrity error.
    pub fn is_remap_integrity(&self) -> bool {
        self.any(|kind| matches!(kind, super::ErrorKind::RemapIntegrity(_)))
    }
}
