//! Error kinds surfaced by an audit run and the exit codes they map to.

use thiserror::Error;

/// Underlying failure attached to an [`AuditError`].
pub type Cause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Audit completed and the report was written.
pub const EXIT_SUCCESS: u8 = 0;
/// Missing URL, invalid credentials, bad flags.
pub const EXIT_CONFIG_ERROR: u8 = 1;
/// Server unreachable or answering unexpectedly.
pub const EXIT_API_ERROR: u8 = 2;
/// Marketplace catalogue unavailable, typically an air-gapped server.
pub const EXIT_MARKETPLACE_ERROR: u8 = 3;
/// Report could not be written.
pub const EXIT_OUTPUT_ERROR: u8 = 4;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("{message}")]
    Config {
        message: String,
        #[source]
        source: Option<Cause>,
    },

    #[error("{message}")]
    Api {
        message: String,
        #[source]
        source: Option<Cause>,
    },

    #[error("{message}")]
    Marketplace {
        message: String,
        #[source]
        source: Option<Cause>,
    },

    #[error("{message}")]
    Output {
        message: String,
        #[source]
        source: Option<Cause>,
    },
}

impl AuditError {
    pub fn config(message: impl Into<String>) -> Self {
        AuditError::Config {
            message: message.into(),
            source: None,
        }
    }

    pub fn api(message: impl Into<String>, source: Option<Cause>) -> Self {
        AuditError::Api {
            message: message.into(),
            source,
        }
    }

    pub fn marketplace(message: impl Into<String>, source: Option<Cause>) -> Self {
        AuditError::Marketplace {
            message: message.into(),
            source,
        }
    }

    pub fn output(message: impl Into<String>, source: Option<Cause>) -> Self {
        AuditError::Output {
            message: message.into(),
            source,
        }
    }

    /// Attaches an underlying failure, replacing any existing one.
    pub fn with_source(mut self, cause: Cause) -> Self {
        match &mut self {
            AuditError::Config { source, .. }
            | AuditError::Api { source, .. }
            | AuditError::Marketplace { source, .. }
            | AuditError::Output { source, .. } => *source = Some(cause),
        }
        self
    }

    /// User-facing message without the underlying cause.
    pub fn message(&self) -> &str {
        match self {
            AuditError::Config { message, .. }
            | AuditError::Api { message, .. }
            | AuditError::Marketplace { message, .. }
            | AuditError::Output { message, .. } => message,
        }
    }

    /// Process exit code for this kind of failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            AuditError::Config { .. } => EXIT_CONFIG_ERROR,
            AuditError::Api { .. } => EXIT_API_ERROR,
            AuditError::Marketplace { .. } => EXIT_MARKETPLACE_ERROR,
            AuditError::Output { .. } => EXIT_OUTPUT_ERROR,
        }
    }
}

pub type Result<T> = std::result::Result<T, AuditError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn exit_codes_per_kind() {
        assert_eq!(AuditError::config("x").exit_code(), EXIT_CONFIG_ERROR);
        assert_eq!(AuditError::api("x", None).exit_code(), EXIT_API_ERROR);
        assert_eq!(AuditError::marketplace("x", None).exit_code(), EXIT_MARKETPLACE_ERROR);
        assert_eq!(AuditError::output("x", None).exit_code(), EXIT_OUTPUT_ERROR);
    }

    #[test]
    fn display_shows_message_and_keeps_cause() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let err = AuditError::output("error: failed to write output", Some(Box::new(io)));
        assert_eq!(err.to_string(), "error: failed to write output");
        assert_eq!(err.source().map(|s| s.to_string()).as_deref(), Some("disk full"));
    }

    #[test]
    fn with_source_attaches_cause() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        let err = AuditError::config("bad").with_source(Box::new(io));
        assert!(err.source().is_some());
        assert_eq!(err.message(), "bad");
    }
}
