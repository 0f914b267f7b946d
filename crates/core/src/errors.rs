use std::fmt;

use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("{kind} already exists with id {id}")]
    AlreadyExists { kind: &'static str, id: String },
    #[error("{kind} does not exist with id {id}")]
    DoesNotExist { kind: &'static str, id: String },
}

/// One failed field constraint. `location` is a JSON path such as `$.firstName`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    pub location: String,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.message)
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("{}", render_violations(.0))]
    Validation(Vec<Violation>),
    #[error("persistence failure: {0}")]
    Persistence(String),
}

fn render_violations(violations: &[Violation]) -> String {
    violations.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n")
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("not found")]
    NotFound { correlation_id: String },
}

impl InterfaceError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest { message: message.into(), correlation_id: "unassigned".to_owned() }
    }

    pub fn not_found() -> Self {
        Self::NotFound { correlation_id: "unassigned".to_owned() }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            Self::BadRequest { correlation_id, .. } | Self::NotFound { correlation_id } => {
                correlation_id
            }
        }
    }

    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        match &mut self {
            Self::BadRequest { correlation_id: id, .. } | Self::NotFound { correlation_id: id } => {
                *id = correlation_id.into()
            }
        }
        self
    }

    /// Text returned to the caller; empty for not-found.
    pub fn body(&self) -> &str {
        match self {
            Self::BadRequest { message, .. } => message,
            Self::NotFound { .. } => "",
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        InterfaceError::from(self).with_correlation_id(correlation_id)
    }
}

// Conflicts and missing ids surface as 400 with the message, not 404/409.
impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        Self::bad_request(value.to_string())
    }
}
