//! Page error types.

use std::fmt;

use wikirec_wiki::WikiError;

/// Collaborator a page cannot be built without.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dependency {
    /// The wiki backend.
    Wiki,
    /// The configuration carrying the message table.
    Config,
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wiki => f.write_str("wiki"),
            Self::Config => f.write_str("config"),
        }
    }
}

/// Page operation error.
///
/// Variants carrying a `String` hold the configured message for the failed
/// condition, the same text a page records as its last error.
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    /// A collaborator was not supplied at construction.
    #[error("Configuration error: no {0} supplied")]
    Config(Dependency),

    /// Attribute name has no setter.
    #[error("Unknown attribute: {0}")]
    UnknownAttribute(String),

    /// Attribute value has the wrong type or an unknown format tag.
    #[error("Invalid value for attribute {name}: {message}")]
    InvalidAttribute {
        /// Attribute name.
        name: String,
        /// Why the value was rejected.
        message: String,
    },

    /// Validation failed before contacting the wiki.
    #[error("{0}")]
    Invalid(String),

    /// A required argument (commit or content) was not given.
    #[error("{0}")]
    MissingArgument(String),

    /// The operation needs a page loaded by `find`.
    #[error("{0}")]
    NoPageFetched(String),

    /// No page with the requested name.
    #[error("{0}")]
    NotFound(String),

    /// The wiki rejected the operation.
    #[error(transparent)]
    Wiki(#[from] WikiError),
}

impl PageError {
    /// Whether the wiki reported a duplicate-page conflict.
    #[must_use]
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Wiki(e) if e.is_duplicate())
    }
}
