//! Keyed, locale-aware message formatting with typed message proxies.
//!
//! A phrasebook maps dot-separated keys to locale-specific Fluent patterns.
//! Resolving a key formats the pattern for the requested locale (with
//! plural selection, number rendering and `DATETIME`), splits the output
//! into lines, applies the tag markup language and returns one styled
//! [`Text`] node per line. Missing keys and arity mismatches never fail a
//! call: they are delegated to a pluggable [`InvalidMessageProvider`].
//!
//! Lookup falls back by locale: the requested locale first, then the
//! engine's default locale, then the root locale (`und`).
//!
//! ```rust
//! use phrasebook::{langid, MessageArgs, Phrasebook, PhrasebookBuilder, Text};
//!
//! # fn main() -> Result<(), phrasebook::BuildError> {
//! let english = langid!("en-US");
//! let mut builder = PhrasebookBuilder::new(english.clone());
//! builder.translation(&english, |tr| {
//!     tr.message("hello_world", "Hello World!")?;
//!     tr.section("errors", |errors| {
//!         errors.message("timed_out", "Timed out after { $seconds } s.")?;
//!         Ok(())
//!     })?;
//!     Ok(())
//! })?;
//! let book = builder.build()?;
//!
//! assert_eq!(
//!     book.message(&english, "hello_world", &MessageArgs::new()),
//!     vec![Text::plain("Hello World!")],
//! );
//! assert_eq!(
//!     book.message(
//!         &english,
//!         "errors.timed_out",
//!         &MessageArgs::new().format("seconds", 5),
//!     ),
//!     vec![Text::plain("Timed out after 5 s.")],
//! );
//! # Ok(())
//! # }
//! ```
//!
//! The `#[messages]` attribute macro derives a typed façade from a trait;
//! see [`MessageProxy`].

use std::fmt;
use std::sync::Arc;

pub use phrasebook_macros::messages;
pub use unic_langid::{LanguageIdentifier, langid};

pub mod ansi;
mod args;
mod builder;
pub mod config;
mod engine;
mod error;
pub mod markup;
mod provider;
mod proxy;
mod text;

pub use args::MessageArgs;
pub use builder::{PhrasebookBuilder, TranslationBuilder};
pub use engine::{FormattingIssue, FormattingIssueReporter, StandardPhrasebook};
pub use error::{BuildError, BuildErrorKind, KeyPath};
pub use provider::{EchoProvider, InvalidMessageProvider, LoggingProvider, MessageKind};
pub use proxy::{MessageProxy, MessageResolver, SectionProxy};
pub use text::{Rgb, Style, Text, join_lines, join_one_line};

/// The result of one message resolution: an ordered list of styled text
/// lines.
pub type Message = Vec<Text>;

/// The distinguished root locale (`und`), the last link of the fallback
/// chain.
#[must_use]
pub fn root_locale() -> LanguageIdentifier {
    LanguageIdentifier::default()
}

/// The message resolution interface.
///
/// Implementations are immutable and callable from any thread. The
/// canonical implementation is [`StandardPhrasebook`]; [`LocaleView`]
/// layers a fixed locale over any implementation.
pub trait Phrasebook: Send + Sync {
    /// The locale used when a lookup misses the requested locale, and by
    /// the `default_*` convenience methods.
    fn default_locale(&self) -> &LanguageIdentifier;

    /// Resolves a single message.
    fn message(&self, locale: &LanguageIdentifier, key: &str, args: &MessageArgs) -> Message;

    /// Resolves an ordered list of messages.
    fn message_list(
        &self,
        locale: &LanguageIdentifier,
        key: &str,
        args: &MessageArgs,
    ) -> Vec<Message>;

    /// Resolves a single message for the default locale.
    fn default_message(&self, key: &str, args: &MessageArgs) -> Message {
        let locale = self.default_locale().clone();
        self.message(&locale, key, args)
    }

    /// Resolves a message list for the default locale.
    fn default_message_list(&self, key: &str, args: &MessageArgs) -> Vec<Message> {
        let locale = self.default_locale().clone();
        self.message_list(&locale, key, args)
    }
}

/// A lightweight view binding a fixed locale over a shared phrasebook.
///
/// Runtime locale switching is modelled by constructing a new view, never
/// by mutating the underlying engine.
#[derive(Clone)]
pub struct LocaleView {
    book: Arc<dyn Phrasebook>,
    locale: LanguageIdentifier,
}

impl LocaleView {
    /// Creates a view resolving everything in `locale`.
    #[must_use]
    pub fn new(book: Arc<dyn Phrasebook>, locale: LanguageIdentifier) -> Self {
        Self { book, locale }
    }

    /// The locale this view is bound to.
    #[must_use]
    pub fn locale(&self) -> &LanguageIdentifier {
        &self.locale
    }

    /// Resolves a single message in the view's locale.
    #[must_use]
    pub fn message(&self, key: &str, args: &MessageArgs) -> Message {
        self.book.message(&self.locale, key, args)
    }

    /// Resolves a message list in the view's locale.
    #[must_use]
    pub fn message_list(&self, key: &str, args: &MessageArgs) -> Vec<Message> {
        self.book.message_list(&self.locale, key, args)
    }
}

impl fmt::Debug for LocaleView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocaleView")
            .field("locale", &self.locale)
            .finish()
    }
}
