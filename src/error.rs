//! Error taxonomy for the migration dispatchers

use std::fmt;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, MigrationError>;

/// Which dispatcher produced a fan-out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Export,
    Import,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Export => f.write_str("export"),
            Stage::Import => f.write_str("import"),
        }
    }
}

#[derive(Debug, Error)]
pub enum MigrationError {
    /// A required setting is missing or malformed. Raised before any gateway call.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A call to the launch or listing capability failed
    #[error("{operation} failed: {message}")]
    Gateway {
        operation: &'static str,
        message: String,
    },

    /// At least one submission of a fan-out failed.
    ///
    /// Submissions that did succeed have already started workers; nothing is rolled back.
    #[error(
        "{failed} of {total} {stage} launch submissions failed; workers for the other submissions may already be running"
    )]
    Dispatch {
        stage: Stage,
        failed: usize,
        total: usize,
        #[source]
        source: Box<MigrationError>,
    },
}

impl MigrationError {
    pub(crate) fn gateway(operation: &'static str, message: impl Into<String>) -> Self {
        MigrationError::Gateway {
            operation,
            message: message.into(),
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, MigrationError::Configuration(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_error_mentions_running_workers() {
        let err = MigrationError::Dispatch {
            stage: Stage::Export,
            failed: 1,
            total: 4,
            source: Box::new(MigrationError::gateway("ecs:RunTask", "throttled")),
        };

        let message = err.to_string();
        assert!(message.contains("1 of 4 export"));
        assert!(message.contains("may already be running"));

        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "ecs:RunTask failed: throttled");
    }
}
