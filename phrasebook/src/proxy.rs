//! Runtime support for generated message proxies.
//!
//! The `#[messages]` attribute macro turns a trait into a typed façade
//! over a [`Phrasebook`]: it derives a message key and placeholder mapping
//! for every method at compile time and emits a proxy struct whose methods
//! delegate here. [`MessageProxy`] hands out one cached proxy instance per
//! requested locale.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use unic_langid::LanguageIdentifier;

use crate::args::MessageArgs;
use crate::{Message, Phrasebook};

/// Handle through which a generated proxy reaches its engine: a shared
/// phrasebook, the proxy's locale and the key prefix of its section.
#[derive(Clone)]
pub struct MessageResolver {
    book: Arc<dyn Phrasebook>,
    locale: LanguageIdentifier,
    prefix: String,
}

impl MessageResolver {
    /// Creates a root resolver with an empty key prefix.
    #[must_use]
    pub fn new(book: Arc<dyn Phrasebook>, locale: LanguageIdentifier) -> Self {
        Self {
            book,
            locale,
            prefix: String::new(),
        }
    }

    /// Derives the resolver of a nested section, scoping keys under
    /// `prefix.key.`.
    #[must_use]
    pub fn section(&self, key: &str) -> Self {
        Self {
            book: Arc::clone(&self.book),
            locale: self.locale.clone(),
            prefix: format!("{}{key}.", self.prefix),
        }
    }

    /// The locale this resolver is bound to.
    #[must_use]
    pub fn locale(&self) -> &LanguageIdentifier {
        &self.locale
    }

    /// Resolves a single message under this resolver's prefix.
    #[must_use]
    pub fn message(&self, key: &str, args: &MessageArgs) -> Message {
        self.book
            .message(&self.locale, &format!("{}{key}", self.prefix), args)
    }

    /// Resolves a message list under this resolver's prefix.
    #[must_use]
    pub fn message_list(&self, key: &str, args: &MessageArgs) -> Vec<Message> {
        self.book
            .message_list(&self.locale, &format!("{}{key}", self.prefix), args)
    }
}

impl fmt::Debug for MessageResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageResolver")
            .field("locale", &self.locale)
            .field("prefix", &self.prefix)
            .finish()
    }
}

/// Implemented by every generated proxy type; constructs the proxy (and
/// its nested section proxies) from a resolver.
pub trait SectionProxy: Sized {
    /// Builds the proxy for the resolver's locale and section.
    fn from_resolver(resolver: MessageResolver) -> Self;
}

/// Factory handing out per-locale instances of a generated proxy type.
///
/// Instances are created lazily on first request for a locale and cached
/// for the factory's lifetime; the cache retains at most one instance per
/// locale even under concurrent first requests.
pub struct MessageProxy<T> {
    book: Arc<dyn Phrasebook>,
    proxies: RwLock<HashMap<LanguageIdentifier, Arc<T>>>,
}

impl<T: SectionProxy> MessageProxy<T> {
    /// Creates a factory over a shared phrasebook.
    #[must_use]
    pub fn new(book: Arc<dyn Phrasebook>) -> Self {
        Self {
            book,
            proxies: RwLock::new(HashMap::new()),
        }
    }

    /// The proxy bound to the phrasebook's default locale.
    #[must_use]
    pub fn default(&self) -> Arc<T> {
        let locale = self.book.default_locale().clone();
        self.for_locale(&locale)
    }

    /// The proxy bound to a specific locale.
    #[must_use]
    pub fn for_locale(&self, locale: &LanguageIdentifier) -> Arc<T> {
        {
            let cache = self.proxies.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(proxy) = cache.get(locale) {
                return Arc::clone(proxy);
            }
        }
        let mut cache = self.proxies.write().unwrap_or_else(PoisonError::into_inner);
        let proxy = cache.entry(locale.clone()).or_insert_with(|| {
            Arc::new(T::from_resolver(MessageResolver::new(
                Arc::clone(&self.book),
                locale.clone(),
            )))
        });
        Arc::clone(proxy)
    }
}

impl<T> fmt::Debug for MessageProxy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cached = self
            .proxies
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len();
        f.debug_struct("MessageProxy")
            .field("cached_locales", &cached)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PhrasebookBuilder;
    use crate::langid;
    use crate::text::Text;

    struct Probe {
        resolver: MessageResolver,
    }

    impl SectionProxy for Probe {
        fn from_resolver(resolver: MessageResolver) -> Self {
            Self { resolver }
        }
    }

    fn book() -> Arc<dyn Phrasebook> {
        let english = langid!("en");
        let mut builder = PhrasebookBuilder::new(english.clone());
        builder
            .translation(&english, |tr| {
                tr.message("greeting", "Hi!")?;
                tr.section("errors", |errors| {
                    errors.message("io", "IO error")?;
                    Ok(())
                })?;
                Ok(())
            })
            .expect("fixture translations should build");
        Arc::new(builder.build().expect("fixture book should build"))
    }

    #[test]
    fn resolver_prefixes_section_keys() {
        let resolver = MessageResolver::new(book(), langid!("en"));
        assert_eq!(
            resolver.message("greeting", &MessageArgs::new()),
            vec![Text::plain("Hi!")],
        );
        assert_eq!(
            resolver.section("errors").message("io", &MessageArgs::new()),
            vec![Text::plain("IO error")],
        );
    }

    #[test]
    fn factory_caches_one_proxy_per_locale() {
        let factory: MessageProxy<Probe> = MessageProxy::new(book());
        let first = factory.for_locale(&langid!("de"));
        let second = factory.for_locale(&langid!("de"));
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.resolver.locale(), &langid!("de"));

        let other = factory.for_locale(&langid!("en"));
        assert!(!Arc::ptr_eq(&first, &other));
    }
}
