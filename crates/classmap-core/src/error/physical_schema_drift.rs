use super::Error;

/// Error when the in-memory physical schema and the tables in storage no
/// longer agree, or when DDL that would reconcile them cannot be applied.
#[derive(Debug)]
pub(super) struct PhysicalSchemaDrift {
    message: Box<str>,
}

impl std::error::Error for PhysicalSchemaDrift {}

impl core::fmt::Display for PhysicalSchemaDrift {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "physical schema drift: {}", self.message)
    }
}

impl Error {
    /// Creates a physical schema drift error.
    pub fn physical_schema_drift(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::PhysicalSchemaDrift(PhysicalSchemaDrift {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is a physical schema drift error.
    pub fn is_physical_schema_drift(&self) -> bool {
        self.any(|kind| matches!(kind, super::ErrorKind::PhysicalSchemaDrift(_)))
    }
}
