use shared::{domain::StudentId, error::DateFormatError};
use thiserror::Error;

pub type RosterResult<T> = Result<T, RosterError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RosterError {
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },
    #[error("roster service request failed: {0}")]
    Network(String),
    #[error("student {0} no longer exists on the roster service")]
    NotFound(StudentId),
    #[error("malformed birth date: {0}")]
    MalformedDate(#[from] DateFormatError),
    #[error("student {0} is not in the local roster")]
    UnknownStudent(StudentId),
    #[error("invalid roster service endpoint: {0}")]
    InvalidEndpoint(String),
}

impl RosterError {
    pub fn missing(field: &'static str) -> Self {
        Self::Validation {
            field,
            reason: "must not be empty".to_string(),
        }
    }

    /// True for failures detected before any request was sent.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. }
                | Self::MalformedDate(_)
                | Self::UnknownStudent(_)
                | Self::InvalidEndpoint(_)
        )
    }
}

impl From<reqwest::Error> for RosterError {
    fn from(value: reqwest::Error) -> Self {
        Self::Network(value.to_string())
    }
}
