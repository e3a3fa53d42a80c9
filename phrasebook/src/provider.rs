//! Strategies for handling unresolvable message lookups.
//!
//! Lookups never fail at call time: a missing key or a call with the wrong
//! message arity is delegated to the engine's [`InvalidMessageProvider`],
//! whose return value becomes the call's result.

use crate::Message;
use crate::text::Text;

/// The arity a message key was registered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// One message.
    Single,
    /// An ordered list of messages.
    Multiple,
}

/// Determines what a resolution call returns when no valid translation
/// exists for a key.
pub trait InvalidMessageProvider: Send + Sync {
    /// Handles a key that is absent from the store for every locale in the
    /// fallback chain.
    fn missing(&self, key: &str) -> Message;

    /// Handles a call whose operation does not match the arity the key was
    /// registered with.
    fn invalid_type(&self, key: &str, expected: MessageKind) -> Message;
}

fn echo(key: &str) -> Message {
    vec![Text::plain(key)]
}

/// Silently echoes the raw key as plain text.
#[derive(Debug, Default, Clone, Copy)]
pub struct EchoProvider;

impl InvalidMessageProvider for EchoProvider {
    fn missing(&self, key: &str) -> Message {
        echo(key)
    }

    fn invalid_type(&self, key: &str, _expected: MessageKind) -> Message {
        echo(key)
    }
}

/// Echoes the raw key as plain text and emits a `tracing` warning.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingProvider;

impl InvalidMessageProvider for LoggingProvider {
    fn missing(&self, key: &str) -> Message {
        tracing::warn!(key = %key, "no message registered for key");
        echo(key)
    }

    fn invalid_type(&self, key: &str, expected: MessageKind) -> Message {
        tracing::warn!(
            key = %key,
            expected = ?expected,
            "message registered with the wrong arity for this call"
        );
        echo(key)
    }
}
