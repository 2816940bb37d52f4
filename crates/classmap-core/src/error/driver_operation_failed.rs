use super::Error;

/// A statement or transaction call rejected by the storage driver.
#[derive(Debug)]
pub(super) struct DriverOperationFailed {
    pub(super) inner: Box<dyn std::error::Error + Send + Sync>,
}

impl std::error::Error for DriverOperationFailed {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.inner.as_ref())
    }
}

impl core::fmt::Display for DriverOperationFailed {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "storage operation failed: {}", self.inner)
    }
}

impl Error {
    pub fn driver_operation_failed(err: impl std::error::Error + Send + Sync + 'static) -> Error {
        Error::from(super::ErrorKind::DriverOperationFailed(
            DriverOperationFailed {
                inner: Box::new(err),
            },
        ))
    }

    /// Returns `true` if storage rejected a statement somewhere in the chain.
    pub fn is_driver_operation_failed(&self) -> bool {
        self.any(|kind| matches!(kind, super::ErrorKind::DriverOperationFailed(_)))
    }
}
