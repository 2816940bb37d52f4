mod catalog;

pub mod db_map;
pub use db_map::{Builder, DbMap, ValidationMode};

mod map;

mod persistence;

mod purge;

mod remap;

mod session;
pub use session::MappingSession;

mod verify;

pub use classmap_core::{
    driver::Storage,
    issues::{CollectingReporter, IssueReporter, Severity},
    schema::{self, app, db, mapping},
    Error, Result,
};
