pub mod config;
pub mod error;
pub mod gate;
pub mod report;
pub mod session;
pub mod store;
pub mod table;

pub use error::{ReportError, Result};
