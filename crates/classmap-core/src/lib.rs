pub mod driver;
pub use driver::Storage;

mod error;
pub use error::{Error, IntoError};

pub mod issues;
pub use issues::Issues;

pub mod schema;

pub mod stmt;

/// A Result type alias that uses the crate's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;
