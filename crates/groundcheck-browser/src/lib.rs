//! Browser automation for the ground-check workflow.
//!
//! Everything above [`session::Session`] is written against the trait, so the
//! per-record workflow runs unchanged over a live CDP tab or a scripted fake.

pub mod batch;
pub mod cdp;
pub mod diagnostics;
pub mod dom;
pub mod error;
pub mod job;
pub mod locator;
pub mod login;
pub mod processor;
pub mod session;
pub mod settings;
pub mod submitter;
pub mod validator;

#[cfg(test)]
mod test_support;

pub use batch::{run_batch, RunContext, RunHandle};
pub use cdp::{CdpSession, CdpSessionProvider};
pub use diagnostics::Diagnostics;
pub use dom::{DomNode, DomSnapshot, NodeRef};
pub use error::SessionError;
pub use job::{check_login, run_job, JobError};
pub use locator::{locate, FocusedView, LocateTier, Located, NotFoundReason};
pub use login::{wait_for_login, LoginSignals};
pub use processor::{prefilter, ProcessRecord, RecordProcessor};
pub use session::{Session, SessionProvider};
pub use settings::{AutomationSettings, Timings, UiVocabulary};
pub use submitter::{submit, SubmitRejection, SubmitResult};
pub use validator::{validate, CoordinateCheck, FormCoordinates, ValidationRejection};
