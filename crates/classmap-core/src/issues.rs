//! Diagnostics reporting.
//!
//! Every fatal mapping error is reported exactly once through an
//! [`IssueReporter`] before it is returned to the caller. Degraded mappings
//! that do not fail the import are reported as warnings.

use crate::Error;

use std::{fmt, sync::Arc, sync::Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
}

/// Receives diagnostics produced while mapping schemas.
pub trait IssueReporter: Send + Sync + fmt::Debug {
    fn report(&self, severity: Severity, message: &str);
}

/// Forwards diagnostics to the `log` facade.
#[derive(Debug, Default)]
pub struct LogReporter;

impl IssueReporter for LogReporter {
    fn report(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Error => log::error!("{message}"),
            Severity::Warning => log::warn!("{message}"),
        }
    }
}

/// Keeps every reported diagnostic in memory.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    issues: Mutex<Vec<(Severity, String)>>,
}

impl CollectingReporter {
    pub fn new() -> CollectingReporter {
        CollectingReporter::default()
    }

    /// All diagnostics reported so far, in order.
    pub fn issues(&self) -> Vec<(Severity, String)> {
        match self.issues.lock() {
            Ok(issues) => issues.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn errors(&self) -> Vec<String> {
        self.with_severity(Severity::Error)
    }

    pub fn warnings(&self) -> Vec<String> {
        self.with_severity(Severity::Warning)
    }

    fn with_severity(&self, severity: Severity) -> Vec<String> {
        self.issues()
            .into_iter()
            .filter(|(s, _)| *s == severity)
            .map(|(_, message)| message)
            .collect()
    }
}

impl IssueReporter for CollectingReporter {
    fn report(&self, severity: Severity, message: &str) {
        let mut issues = match self.issues.lock() {
            Ok(issues) => issues,
            Err(poisoned) => poisoned.into_inner(),
        };
        issues.push((severity, message.to_string()));
    }
}

/// Handle used by the mapping engine to emit diagnostics.
#[derive(Debug, Clone)]
pub struct Issues {
    reporter: Arc<dyn IssueReporter>,
}

impl Issues {
    pub fn new(reporter: Arc<dyn IssueReporter>) -> Issues {
        Issues { reporter }
    }

    /// Reports `err` as an error and hands it back for propagation.
    pub fn error(&self, err: Error) -> Error {
        self.reporter.report(Severity::Error, &err.to_string());
        err
    }

    pub fn warning(&self, message: impl AsRef<str>) {
        self.reporter.report(Severity::Warning, message.as_ref());
    }
}

impl Default for Issues {
    fn default() -> Issues {
        Issues::new(Arc::new(LogReporter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_is_reported_once_and_returned() {
        let reporter = Arc::new(CollectingReporter::new());
        let issues = Issues::new(reporter.clone());

        let err = issues.error(Error::structural_conflict("two shared-table bases"));
        issues.warning("relationship `ts:Owns` is not mapped");

        assert!(err.is_structural_conflict());
        assert_eq!(
            reporter.errors(),
            ["structural conflict: two shared-table bases"]
        );
        assert_eq!(reporter.warnings(), ["relationship `ts:Owns` is not mapped"]);
    }
}
