//! Build-time error types.
//!
//! Construction failures are always fatal and fail fast: no malformed key
//! or pattern ever reaches a running engine. Every error carries the full
//! dot-joined path to the offending declaration.

use std::fmt;

use fluent_bundle::FluentError;
use fluent_syntax::parser::ParserError;
use thiserror::Error;
use unic_langid::LanguageIdentifier;

/// The path of key segments leading to a translation declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyPath(pub Vec<String>);

impl KeyPath {
    /// The root path, before any segment is entered.
    #[must_use]
    pub const fn root() -> Self {
        Self(Vec::new())
    }

    /// Returns this path extended by one segment.
    #[must_use]
    pub fn join(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<root>");
        }
        f.write_str(&self.0.join("."))
    }
}

/// An error aborting the construction of a phrasebook.
#[derive(Debug, Error)]
#[error("{path}: {kind}")]
pub struct BuildError {
    /// Full path to the declaration that failed.
    pub path: KeyPath,
    /// What went wrong.
    #[source]
    pub kind: BuildErrorKind,
}

impl BuildError {
    pub(crate) fn new(path: KeyPath, kind: BuildErrorKind) -> Self {
        Self { path, kind }
    }
}

/// Causes of a [`BuildError`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BuildErrorKind {
    /// A key segment did not match the segment grammar.
    #[error("invalid key {key:?}: segments must match [a-z0-9_]+")]
    InvalidKey {
        /// The rejected segment.
        key: String,
    },

    /// A message pattern failed to parse.
    #[error("message pattern is not a valid Fluent pattern")]
    Pattern {
        /// Parser errors emitted by Fluent.
        errors: Vec<ParserError>,
    },

    /// Fluent rejected a compiled pattern while registering it.
    #[error("failed to register message pattern for {locale}")]
    Registration {
        /// Locale of the bundle that rejected the pattern.
        locale: LanguageIdentifier,
        /// Errors returned by Fluent during registration.
        errors: Vec<FluentError>,
    },

    /// A locale name in a config document is not a language identifier.
    #[error("{locale:?} is not a valid language identifier")]
    Locale {
        /// The rejected locale text.
        locale: String,
    },

    /// A style value in a config document could not be interpreted.
    #[error("invalid style value: {message}")]
    Style {
        /// What was wrong with the value.
        message: String,
    },

    /// A config document failed to parse.
    #[error("failed to parse document: {message}")]
    Document {
        /// Rendered parser diagnostics.
        message: String,
    },
}
