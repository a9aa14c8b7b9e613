pub mod app_config;
pub mod config;
pub mod outcome;
pub mod record;
pub mod source;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use outcome::{Outcome, OutcomeStatus, ProcessStage, RunCounts};
pub use record::{Coordinates, ExistenceCode, Record};
pub use source::{RecordSource, SheetRange, SourceRow};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
