use std::borrow::Cow;
use std::error::Error as StdError;

use thiserror::Error;

/// Top-level error type returned by docmigrate registries, stores and runners.
#[derive(Debug, Error)]
pub enum MigrateError {
    /// A registration identifier could not be split into version and description.
    #[error("can not extract version from {identifier:?}: {reason}")]
    InvalidIdentifier { identifier: String, reason: Cow<'static, str> },

    /// The same version was registered twice.
    #[error("migration with version {version} already registered")]
    DuplicateVersion { version: u64 },

    /// Underlying Redis command failed.
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// A ledger record or document could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A non-Redis store rejected an operation.
    #[error("store error: {message}")]
    Store { message: Cow<'static, str> },

    /// A migration's own up/down action reported a failure.
    #[error("{message}")]
    Action {
        message: String,
        #[source]
        source: Option<Box<dyn StdError + Send + Sync>>,
    },

    /// The process-wide migrator was used before a database was attached.
    #[error("no database set for the global migrator")]
    DatabaseNotSet,

    /// Configuration could not be read or resolved.
    #[error("configuration error: {message}")]
    Config { message: String },
}

impl MigrateError {
    pub(crate) fn invalid_identifier(identifier: &str, reason: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidIdentifier {
            identifier: identifier.to_string(),
            reason: reason.into(),
        }
    }

    /// Convenience helper for migrations reporting their own failure.
    pub fn action(message: impl Into<String>) -> Self {
        Self::Action {
            message: message.into(),
            source: None,
        }
    }

    /// Wraps an arbitrary error raised inside a migration action.
    pub fn action_source<E>(message: impl Into<String>, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Action {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn store(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Store { message: message.into() }
    }
}

pub type MigrateResult<T> = Result<T, MigrateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_identifier_message_names_input() {
        let err = MigrateError::invalid_identifier("test.rs", "missing '_' delimiter");
        assert_eq!(
            err.to_string(),
            "can not extract version from \"test.rs\": missing '_' delimiter"
        );
    }

    #[test]
    fn action_error_keeps_source() {
        let io = std::io::Error::other("disk gone");
        let err = MigrateError::action_source("seed failed", io);
        assert_eq!(err.to_string(), "seed failed");
        assert!(err.source().is_some());
    }

    #[test]
    fn duplicate_version_message() {
        let err = MigrateError::DuplicateVersion { version: 7 };
        assert_eq!(err.to_string(), "migration with version 7 already registered");
    }
}
