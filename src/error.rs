use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("version control command `{command}` failed: {stderr}")]
    VersionControl { command: String, stderr: String },
    #[error("issue tracker error: {0}")]
    IssueTracker(String),
    #[error("code host error: {0}")]
    CodeHost(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
