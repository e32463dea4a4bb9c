//! Error types for building and dispatching entry points.
//!
//! Two taxonomies are kept apart. [`SetupError`] covers everything that can
//! go wrong while an entry point is being built: the declaration does not
//! fit the function it wraps. [`DispatchError`] covers the call-time checks
//! that can only fail if a parser adapter broke its contract.

use thiserror::Error;

/// Result type for build-time operations
pub type SetupResult<T> = Result<T, SetupError>;

/// Errors raised while classifying a signature, merging specs or building
/// the parser. All of them mean the declaration is inconsistent with the
/// function and should abort start-up.
#[derive(Debug, Error)]
pub enum SetupError {
    /// A parameter kind the dispatcher cannot feed from parsed values
    #[error("`{kind}` parameter `{name}` in function signature not allowed")]
    InvalidParameterKind {
        /// Parameter name
        name: String,
        /// Declared kind
        kind: String,
    },

    /// The signature itself is malformed (ordering, duplicates, defaults)
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    /// A parameter spec is neither a help string nor an options mapping,
    /// or carries an unknown or malformed option
    #[error("spec for parameter `{name}` is invalid: {message}")]
    InvalidSpec {
        /// Declared spec key
        name: String,
        /// What is wrong with it
        message: String,
    },

    /// The parser was told to feed a parameter that does not exist and
    /// there is no variadic keyword parameter to absorb it
    #[error(
        "decorator attempts to feed data to `{name}` which is not a parameter \
         of the function and there is no variadic keyword parameter"
    )]
    UnknownParameter {
        /// Bound name that could not be routed
        name: String,
    },

    /// Required parameters that no parsed value will ever supply
    #[error(
        "positional parameters {positions:?} and/or keyword-only parameters {keywords:?} \
         have neither a default value nor a way to be supplied by the decorator"
    )]
    Unsupplied {
        /// Indices of unsupplied plain parameters
        positions: Vec<usize>,
        /// Names of unsupplied keyword-only parameters
        keywords: Vec<String>,
    },

    /// Two command-line elements would collide in the parser
    #[error("conflicting command-line element: {0}")]
    Conflict(String),

    /// A configuration key the chosen parser adapter does not accept
    #[error("unknown parser configuration key `{0}`")]
    UnknownConfigKey(String),

    /// Declarations file errors
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl SetupError {
    /// Create an invalid-signature error
    pub fn signature<S: Into<String>>(msg: S) -> Self {
        Self::InvalidSignature(msg.into())
    }

    /// Create an invalid-spec error for the given spec key
    pub fn spec(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidSpec {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a conflict error
    pub fn conflict<S: Into<String>>(msg: S) -> Self {
        Self::Conflict(msg.into())
    }

    /// Create a declarations-file error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::ConfigError(msg.into())
    }
}

/// Call-time failures of the dispatch contract. These never come from user
/// input: they mean the parser handed back a mapping that does not match
/// what was guaranteed at build time.
#[derive(Debug, Error, PartialEq)]
pub enum DispatchError {
    /// A slot was bound to a key the parsed mapping does not contain
    #[error("decorator failed to provide value for `{0}` arg")]
    MissingValue(String),

    /// The variadic positional slot did not resolve to a sequence
    #[error("value for variadic positional parameter from `{0}` is not a sequence")]
    NotASequence(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_parameter_message() {
        let error = SetupError::UnknownParameter {
            name: "ghost".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("`ghost`"));
        assert!(message.contains("no variadic keyword parameter"));
    }

    #[test]
    fn test_unsupplied_lists_both_kinds() {
        let error = SetupError::Unsupplied {
            positions: vec![0, 2],
            keywords: vec!["x".to_string()],
        };
        let message = error.to_string();
        assert!(message.contains("[0, 2]"));
        assert!(message.contains("\"x\""));
    }

    #[test]
    fn test_helpers() {
        assert!(matches!(
            SetupError::spec("foo", "bad"),
            SetupError::InvalidSpec { .. }
        ));
        assert!(SetupError::config("broken file")
            .to_string()
            .starts_with("Configuration error"));
        assert!(SetupError::conflict("-s").to_string().contains("-s"));
    }

    #[test]
    fn test_dispatch_error_display() {
        let error = DispatchError::NotASequence("args".to_string());
        assert!(error.to_string().contains("`args`"));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SetupError>();
        assert_send_sync::<DispatchError>();
    }
}
