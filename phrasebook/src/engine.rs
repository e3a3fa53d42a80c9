//! The standard resolution engine.
//!
//! [`StandardPhrasebook`] owns the flattened template store produced by the
//! builder and resolves `(locale, key, args)` triples into styled text. It
//! is immutable after construction and safe to share across threads; every
//! compiled pattern carries its own concurrent Fluent bundle.

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use fluent_bundle::concurrent::FluentBundle;
use fluent_bundle::{FluentArgs, FluentError, FluentResource, FluentValue};
use time::OffsetDateTime;
use unic_langid::LanguageIdentifier;

use crate::args::MessageArgs;
use crate::builder::PhrasebookBuilder;
use crate::error::BuildErrorKind;
use crate::markup::{self, TagResolver};
use crate::provider::{InvalidMessageProvider, MessageKind};
use crate::text::{Style, Text};
use crate::{Message, Phrasebook, root_locale};

/// Identifier under which every pattern is registered in its bundle.
pub(crate) const MESSAGE_ID: &str = "m";

/// Captures formatting failures surfaced by Fluent at call time.
///
/// Template patterns are validated at build time, so anything reported
/// here points at the call's runtime arguments (a missing placeholder, a
/// value of an unsupported type), not at translation content.
#[derive(Debug)]
pub struct FormattingIssue {
    /// Key of the message being formatted.
    pub key: String,
    /// Locale of the pattern that produced the failure.
    pub locale: LanguageIdentifier,
    /// Errors emitted by Fluent.
    pub errors: Vec<FluentError>,
}

/// Hook invoked when Fluent raises formatting errors.
pub type FormattingIssueReporter = Arc<dyn Fn(&FormattingIssue) + Send + Sync>;

#[must_use]
pub(crate) fn default_reporter() -> FormattingIssueReporter {
    Arc::new(|issue: &FormattingIssue| {
        tracing::warn!(
            key = %issue.key,
            locale = %issue.locale,
            errors = ?issue.errors,
            "failed to format message arguments"
        );
    })
}

/// Renders an epoch-seconds numeric argument as an ISO calendar date.
fn datetime_function<'a>(
    positional: &[FluentValue<'a>],
    _named: &FluentArgs,
) -> FluentValue<'a> {
    let Some(FluentValue::Number(number)) = positional.first() else {
        return FluentValue::Error;
    };
    #[allow(clippy::cast_possible_truncation, reason = "epoch seconds fit i64")]
    let seconds = number.value as i64;
    match OffsetDateTime::from_unix_timestamp(seconds) {
        Ok(moment) => FluentValue::String(Cow::Owned(moment.date().to_string())),
        Err(_) => FluentValue::Error,
    }
}

/// One pattern compiled for one locale: a single-message Fluent bundle.
pub(crate) struct CompiledPattern {
    bundle: FluentBundle<Arc<FluentResource>>,
}

impl CompiledPattern {
    pub(crate) fn compile(
        locale: &LanguageIdentifier,
        resource: &Arc<FluentResource>,
    ) -> Result<Self, BuildErrorKind> {
        let mut bundle = FluentBundle::new_concurrent(vec![locale.clone()]);
        bundle.set_use_isolating(false);
        bundle
            .add_function("DATETIME", datetime_function)
            .map_err(|error| BuildErrorKind::Registration {
                locale: locale.clone(),
                errors: vec![error],
            })?;
        bundle
            .add_resource(Arc::clone(resource))
            .map_err(|errors| BuildErrorKind::Registration {
                locale: locale.clone(),
                errors,
            })?;
        Ok(Self { bundle })
    }

    fn format(&self, args: &FluentArgs<'_>) -> (String, Vec<FluentError>) {
        let mut errors = Vec::new();
        let Some(pattern) = self
            .bundle
            .get_message(MESSAGE_ID)
            .and_then(|message| message.value())
        else {
            // Unreachable by construction: every resource carries `m`.
            return (String::new(), errors);
        };
        let rendered = self.bundle.format_pattern(pattern, Some(args), &mut errors);
        (rendered.into_owned(), errors)
    }
}

impl fmt::Debug for CompiledPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledPattern")
            .field("bundle", &"<fluent bundle>")
            .finish()
    }
}

/// A template store entry: the compiled pattern(s) of one key for one
/// locale.
#[derive(Debug)]
pub(crate) enum MessageData {
    Single(CompiledPattern),
    Multiple(Vec<CompiledPattern>),
}

/// Default implementation of [`Phrasebook`].
pub struct StandardPhrasebook {
    default_locale: LanguageIdentifier,
    messages: HashMap<String, HashMap<LanguageIdentifier, MessageData>>,
    substitutions: HashMap<String, Text>,
    styles: HashMap<String, Style>,
    provider: Arc<dyn InvalidMessageProvider>,
    reporter: FormattingIssueReporter,
}

impl StandardPhrasebook {
    pub(crate) fn new(
        default_locale: LanguageIdentifier,
        messages: HashMap<String, HashMap<LanguageIdentifier, MessageData>>,
        substitutions: HashMap<String, Text>,
        styles: HashMap<String, Style>,
        provider: Arc<dyn InvalidMessageProvider>,
        reporter: FormattingIssueReporter,
    ) -> Self {
        Self {
            default_locale,
            messages,
            substitutions,
            styles,
            provider,
            reporter,
        }
    }

    /// Starts building a phrasebook with the given default locale.
    #[must_use]
    pub fn builder(default_locale: LanguageIdentifier) -> PhrasebookBuilder {
        PhrasebookBuilder::new(default_locale)
    }

    /// Number of distinct message keys registered.
    #[must_use]
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Number of distinct locales any key is registered for.
    #[must_use]
    pub fn locale_count(&self) -> usize {
        let locales: HashSet<&LanguageIdentifier> =
            self.messages.values().flat_map(HashMap::keys).collect();
        locales.len()
    }

    /// Number of substitutions registered.
    #[must_use]
    pub fn substitution_count(&self) -> usize {
        self.substitutions.len()
    }

    /// Number of styles registered.
    #[must_use]
    pub fn style_count(&self) -> usize {
        self.styles.len()
    }

    /// Looks an entry up with the locale fallback chain: requested, then
    /// the default locale, then the root locale.
    fn entry(&self, locale: &LanguageIdentifier, key: &str) -> Option<&MessageData> {
        let for_key = self.messages.get(key)?;
        for_key
            .get(locale)
            .or_else(|| for_key.get(&self.default_locale))
            .or_else(|| for_key.get(&root_locale()))
    }

    fn render(
        &self,
        compiled: &CompiledPattern,
        resolver: &TagResolver<'_>,
        fluent_args: &FluentArgs<'_>,
        locale: &LanguageIdentifier,
        key: &str,
    ) -> Message {
        let (formatted, errors) = compiled.format(fluent_args);
        if !errors.is_empty() {
            (self.reporter)(&FormattingIssue {
                key: key.to_owned(),
                locale: locale.clone(),
                errors,
            });
        }
        formatted
            .split('\n')
            .map(|line| markup::parse(line.strip_suffix('\r').unwrap_or(line), resolver))
            .collect()
    }
}

impl Phrasebook for StandardPhrasebook {
    fn default_locale(&self) -> &LanguageIdentifier {
        &self.default_locale
    }

    fn message(&self, locale: &LanguageIdentifier, key: &str, args: &MessageArgs) -> Message {
        let Some(data) = self.entry(locale, key) else {
            return self.provider.missing(key);
        };
        let MessageData::Single(compiled) = data else {
            return self.provider.invalid_type(key, MessageKind::Single);
        };
        let resolver = TagResolver::assemble(&self.substitutions, &self.styles, &args.replace);
        self.render(compiled, &resolver, &args.fluent_args(), locale, key)
    }

    fn message_list(
        &self,
        locale: &LanguageIdentifier,
        key: &str,
        args: &MessageArgs,
    ) -> Vec<Message> {
        let Some(data) = self.entry(locale, key) else {
            return vec![self.provider.missing(key)];
        };
        let MessageData::Multiple(patterns) = data else {
            return vec![self.provider.invalid_type(key, MessageKind::Multiple)];
        };
        let resolver = TagResolver::assemble(&self.substitutions, &self.styles, &args.replace);
        let fluent_args = args.fluent_args();
        patterns
            .iter()
            .map(|compiled| self.render(compiled, &resolver, &fluent_args, locale, key))
            .collect()
    }
}

impl fmt::Debug for StandardPhrasebook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StandardPhrasebook")
            .field("default_locale", &self.default_locale)
            .field("messages", &self.messages.len())
            .field("substitutions", &self.substitutions.len())
            .field("styles", &self.styles.len())
            .finish()
    }
}
