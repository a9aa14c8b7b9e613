//! Reader for the Google Sheets tab that lists the records of a run.

pub mod client;
pub mod error;
pub mod gviz;
pub(crate) mod retry;

pub use client::SheetsClient;
pub use error::SheetsError;
