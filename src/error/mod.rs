//! Unified error handling for Email Hook

use thiserror::Error;

/// Library-wide result type
pub type Result<T> = std::result::Result<T, EmailError>;

/// A single reason why a message cannot be sent
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    /// A required setting is absent or empty
    #[error("{0} is missing in Settings")]
    MissingConfiguration(String),

    /// A required call parameter is absent or empty
    #[error("{0} is missing in Email sending parameters")]
    MissingParameter(String),

    /// An address field holds something that is not an email address
    #[error("{field} has an invalid address: {value}")]
    InvalidAddress { field: String, value: String },
}

/// Email delivery error types
#[derive(Error, Debug)]
pub enum EmailError {
    #[error("Fix the following errors: {}", join_issues(.0))]
    Validation(Vec<ValidationIssue>),

    #[error("Client construction failed: {0}")]
    ClientConstruction(String),

    #[error("Email sending error: {0}")]
    Transport(String),

    #[error("Invalid email engine name {name}, choose from {valid:?}")]
    UnknownBackend {
        name: String,
        valid: Vec<&'static str>,
    },
}

impl EmailError {
    /// Validation issues carried by this error, empty for every other kind
    pub fn issues(&self) -> &[ValidationIssue] {
        match self {
            EmailError::Validation(issues) => issues,
            _ => &[],
        }
    }
}

fn join_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
