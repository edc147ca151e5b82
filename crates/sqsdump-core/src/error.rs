use std::fmt;

/// Errors that stop a drain before it starts.
///
/// Failures during the poll loop itself are logged and never surface here.
#[derive(Debug)]
pub enum DrainError {
    InvalidConfig(String),
    QueueResolution {
        name: String,
        source: anyhow::Error,
    },
    AttributeFetch(anyhow::Error),
    MalformedAttribute {
        name: String,
        value: Option<String>,
    },
    InvalidHandler,
}

impl fmt::Display for DrainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrainError::InvalidConfig(msg) => write!(f, "invalid configuration: {}", msg),
            DrainError::QueueResolution { name, source } => {
                write!(f, "error getting queue url for {}: {:#}", name, source)
            }
            DrainError::AttributeFetch(source) => {
                write!(f, "error getting queue attributes: {:#}", source)
            }
            DrainError::MalformedAttribute { name, value: Some(value) } => write!(
                f,
                "queue attribute {} is not a non-negative integer: {:?}",
                name, value
            ),
            DrainError::MalformedAttribute { name, value: None } => {
                write!(f, "queue attribute {} is missing", name)
            }
            DrainError::InvalidHandler => write!(f, "a message handler is missing, stopped"),
        }
    }
}

impl std::error::Error for DrainError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DrainError::QueueResolution { source, .. } | DrainError::AttributeFetch(source) => {
                Some(&**source)
            }
            _ => None,
        }
    }
}
