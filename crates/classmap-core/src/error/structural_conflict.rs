use super::Error;

/// Error when the mapping declarations of a class contradict each other or
/// contradict the strategy inherited from its base classes.
///
/// Examples are two bases that both map to a shared table, a subclass that
/// re-declares a strategy under a shared-table ancestor, or a relationship
/// whose strength conflicts with its cardinality. The message names the
/// class and the attribute involved.
#[derive(Debug)]
pub(super) struct StructuralConflict {
    message: Box<str>,
}

impl std::error::Error for StructuralConflict {}

impl core::fmt::Display for StructuralConflict {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "structural conflict: {}", self.message)
    }
}

impl Error {
    /// Creates a structural conflict error.
    pub fn structural_conflict(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::StructuralConflict(StructuralConflict {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is a structural conflict.
    pub fn is_structural_conflict(&self) -> bool {
        self.any(|kind| matches!(kind, super::ErrorKind::StructuralConflict(_)))
    }
}
