//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;
use crate::exitcode;
use crate::infrastructure::traits::StoreError;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

impl From<DomainError> for CliError {
    fn from(e: DomainError) -> Self {
        ApplicationError::from(e).into()
    }
}

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) => exitcode::USAGE,
            CliError::Infra(e) => match e {
                InfraError::Io { .. } => exitcode::IOERR,
                InfraError::Http { .. } => exitcode::SOFTWARE,
                InfraError::Application(app) => application_exit_code(app),
            },
        }
    }
}

fn application_exit_code(e: &ApplicationError) -> i32 {
    match e {
        ApplicationError::Domain(d) => match d {
            DomainError::Validation(_) => exitcode::USAGE,
            DomainError::GroupNotFound(_) | DomainError::AliasNotFound(_) => exitcode::NOINPUT,
            DomainError::AlreadyInState { .. } => exitcode::DATAERR,
        },
        ApplicationError::Store { source, .. } => match source {
            StoreError::NotFound(_) => exitcode::NOINPUT,
            StoreError::Cancelled | StoreError::DeadlineExceeded => exitcode::TEMPFAIL,
            StoreError::Decode(_) => exitcode::DATAERR,
            StoreError::Transport(_) | StoreError::Rejected { .. } => exitcode::UNAVAILABLE,
        },
        ApplicationError::Config { .. } => exitcode::CONFIG,
        ApplicationError::OperationFailed { .. } => exitcode::SOFTWARE,
    }
}
