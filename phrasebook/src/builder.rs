//! The hierarchical builder DSL.
//!
//! Translations are declared per locale as a tree of sections and message
//! leaves. Keys are validated and patterns compiled the moment they are
//! declared, so a malformed declaration aborts the build with its full
//! path. Declaring the same locale more than once merges the trees:
//! sections merge child-by-child, leaf entries are replaced wholesale by
//! the later declaration.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use fluent_bundle::FluentResource;
use unic_langid::LanguageIdentifier;

use crate::engine::{
    CompiledPattern, FormattingIssueReporter, MESSAGE_ID, MessageData, StandardPhrasebook,
    default_reporter,
};
use crate::error::{BuildError, BuildErrorKind, KeyPath};
use crate::markup::{self, TagResolver};
use crate::provider::{EchoProvider, InvalidMessageProvider};
use crate::text::{Style, Text};

/// Checks one key segment against the segment grammar.
pub(crate) fn validate_key(path: &KeyPath, key: &str) -> Result<(), BuildError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| matches!(c, 'a'..='z' | '0'..='9' | '_'));
    if valid {
        Ok(())
    } else {
        Err(BuildError::new(
            path.join(key),
            BuildErrorKind::InvalidKey {
                key: key.to_owned(),
            },
        ))
    }
}

/// Mounts a raw pattern as the body of a one-message Fluent resource.
///
/// Multi-line patterns become indented continuation lines, which Fluent
/// dedents and rejoins with `\n`. The empty pattern is mounted as a `{""}`
/// literal because a message without a value does not parse.
fn wrap_pattern(pattern: &str) -> String {
    if pattern.is_empty() {
        return format!("{MESSAGE_ID} = {{\"\"}}");
    }
    let mut source = String::with_capacity(pattern.len() + 16);
    source.push_str(MESSAGE_ID);
    source.push_str(" =");
    for line in pattern.split('\n') {
        source.push_str("\n    ");
        source.push_str(line);
    }
    source
}

fn compile_pattern(
    path: &KeyPath,
    key: &str,
    pattern: &str,
) -> Result<Arc<FluentResource>, BuildError> {
    FluentResource::try_new(wrap_pattern(pattern))
        .map(Arc::new)
        .map_err(|(_resource, errors)| {
            BuildError::new(path.join(key), BuildErrorKind::Pattern { errors })
        })
}

/// One node of a per-locale translation tree.
#[derive(Debug)]
pub(crate) enum TranslationNode {
    Section(SectionNode),
    Single(Arc<FluentResource>),
    Multiple(Vec<Arc<FluentResource>>),
}

/// A namespace node mapping key segments to children.
#[derive(Debug, Default)]
pub(crate) struct SectionNode {
    children: HashMap<String, TranslationNode>,
}

impl SectionNode {
    /// Deep-merges `other` into `self`. Sections merge recursively; any
    /// other collision is resolved in favour of the incoming node.
    fn merge_from(&mut self, other: Self) {
        for (key, incoming) in other.children {
            match (self.children.entry(key), incoming) {
                (Entry::Occupied(mut slot), TranslationNode::Section(incoming_section)) => {
                    if let TranslationNode::Section(existing) = slot.get_mut() {
                        existing.merge_from(incoming_section);
                    } else {
                        slot.insert(TranslationNode::Section(incoming_section));
                    }
                }
                (Entry::Occupied(mut slot), leaf) => {
                    slot.insert(leaf);
                }
                (Entry::Vacant(slot), incoming) => {
                    slot.insert(incoming);
                }
            }
        }
    }
}

/// Declares the content of one section of one locale's translation tree.
#[derive(Debug)]
pub struct TranslationBuilder<'a> {
    path: KeyPath,
    node: &'a mut SectionNode,
}

impl TranslationBuilder<'_> {
    /// Declares a subsection and populates it through `build`.
    ///
    /// Re-declaring an existing section merges into it; a leaf previously
    /// registered under the same key is replaced.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] when the key is invalid or `build` fails.
    pub fn section(
        &mut self,
        key: &str,
        build: impl FnOnce(&mut TranslationBuilder<'_>) -> Result<(), BuildError>,
    ) -> Result<&mut Self, BuildError> {
        validate_key(&self.path, key)?;
        let mut fresh = SectionNode::default();
        build(&mut TranslationBuilder {
            path: self.path.join(key),
            node: &mut fresh,
        })?;
        match self.node.children.entry(key.to_owned()) {
            Entry::Occupied(mut slot) => {
                if let TranslationNode::Section(existing) = slot.get_mut() {
                    existing.merge_from(fresh);
                } else {
                    slot.insert(TranslationNode::Section(fresh));
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(TranslationNode::Section(fresh));
            }
        }
        Ok(self)
    }

    /// Declares a single message under `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] when the key is invalid or the pattern does
    /// not compile.
    pub fn message(&mut self, key: &str, pattern: &str) -> Result<&mut Self, BuildError> {
        validate_key(&self.path, key)?;
        let resource = compile_pattern(&self.path, key, pattern)?;
        self.node
            .children
            .insert(key.to_owned(), TranslationNode::Single(resource));
        Ok(self)
    }

    /// Declares an ordered multi-message list under `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] when the key is invalid or any pattern does
    /// not compile.
    pub fn message_list<I>(&mut self, key: &str, patterns: I) -> Result<&mut Self, BuildError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        validate_key(&self.path, key)?;
        let compiled = patterns
            .into_iter()
            .map(|pattern| compile_pattern(&self.path, key, pattern.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        self.node
            .children
            .insert(key.to_owned(), TranslationNode::Multiple(compiled));
        Ok(self)
    }
}

/// Builds a [`StandardPhrasebook`].
pub struct PhrasebookBuilder {
    default_locale: LanguageIdentifier,
    provider: Arc<dyn InvalidMessageProvider>,
    reporter: FormattingIssueReporter,
    substitutions: HashMap<String, Text>,
    styles: HashMap<String, Style>,
    translations: HashMap<LanguageIdentifier, SectionNode>,
}

impl PhrasebookBuilder {
    /// Creates a builder with the given default locale, the silent
    /// key-echoing provider and the `tracing` formatting reporter.
    #[must_use]
    pub fn new(default_locale: LanguageIdentifier) -> Self {
        Self {
            default_locale,
            provider: Arc::new(EchoProvider),
            reporter: default_reporter(),
            substitutions: HashMap::new(),
            styles: HashMap::new(),
            translations: HashMap::new(),
        }
    }

    /// Replaces the invalid-message provider.
    #[must_use]
    pub fn with_invalid_message_provider(
        mut self,
        provider: impl InvalidMessageProvider + 'static,
    ) -> Self {
        self.provider = Arc::new(provider);
        self
    }

    /// Installs a hook invoked when Fluent reports formatting errors.
    #[must_use]
    pub fn with_formatting_issue_reporter(mut self, reporter: FormattingIssueReporter) -> Self {
        self.reporter = reporter;
        self
    }

    /// Registers a substitution, usable as an inserting markup tag.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] when the key is invalid.
    pub fn substitution(
        &mut self,
        key: &str,
        fragment: impl Into<Text>,
    ) -> Result<&mut Self, BuildError> {
        validate_key(&KeyPath::root(), key)?;
        self.substitutions.insert(key.to_owned(), fragment.into());
        Ok(self)
    }

    /// Parses a markup string against the tags registered so far and
    /// registers the result as a substitution.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] when the key is invalid.
    pub fn markup_substitution(&mut self, key: &str, markup: &str) -> Result<&mut Self, BuildError> {
        validate_key(&KeyPath::root(), key)?;
        let replacements = HashMap::new();
        let resolver = TagResolver::assemble(&self.substitutions, &self.styles, &replacements);
        let fragment = markup::parse(markup, &resolver);
        self.substitutions.insert(key.to_owned(), fragment);
        Ok(self)
    }

    /// Registers a style, usable as an enclosing markup tag.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] when the key is invalid.
    pub fn style(&mut self, key: &str, style: Style) -> Result<&mut Self, BuildError> {
        validate_key(&KeyPath::root(), key)?;
        self.styles.insert(key.to_owned(), style);
        Ok(self)
    }

    /// Declares (or extends) the translation tree for a locale.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] when any declaration inside `build` fails.
    pub fn translation(
        &mut self,
        locale: &LanguageIdentifier,
        build: impl FnOnce(&mut TranslationBuilder<'_>) -> Result<(), BuildError>,
    ) -> Result<&mut Self, BuildError> {
        let mut fresh = SectionNode::default();
        build(&mut TranslationBuilder {
            path: KeyPath::root(),
            node: &mut fresh,
        })?;
        match self.translations.entry(locale.clone()) {
            Entry::Occupied(mut slot) => slot.get_mut().merge_from(fresh),
            Entry::Vacant(slot) => {
                slot.insert(fresh);
            }
        }
        Ok(self)
    }

    /// Flattens the per-locale trees into the template store and builds the
    /// engine.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] when a compiled pattern fails to register.
    pub fn build(self) -> Result<StandardPhrasebook, BuildError> {
        let mut messages: HashMap<String, HashMap<LanguageIdentifier, MessageData>> =
            HashMap::new();
        for (locale, root) in self.translations {
            flatten(&locale, root, &KeyPath::root(), &mut messages)?;
        }
        Ok(StandardPhrasebook::new(
            self.default_locale,
            messages,
            self.substitutions,
            self.styles,
            self.provider,
            self.reporter,
        ))
    }
}

impl std::fmt::Debug for PhrasebookBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhrasebookBuilder")
            .field("default_locale", &self.default_locale)
            .field("substitutions", &self.substitutions.len())
            .field("styles", &self.styles.len())
            .field("translations", &self.translations.len())
            .finish()
    }
}

/// Depth-first walk concatenating segment names into flat dotted keys.
fn flatten(
    locale: &LanguageIdentifier,
    section: SectionNode,
    path: &KeyPath,
    out: &mut HashMap<String, HashMap<LanguageIdentifier, MessageData>>,
) -> Result<(), BuildError> {
    for (key, child) in section.children {
        let child_path = path.join(key.as_str());
        match child {
            TranslationNode::Section(sub) => flatten(locale, sub, &child_path, out)?,
            TranslationNode::Single(resource) => {
                let compiled = CompiledPattern::compile(locale, &resource)
                    .map_err(|kind| BuildError::new(child_path.clone(), kind))?;
                out.entry(child_path.to_string())
                    .or_default()
                    .insert(locale.clone(), MessageData::Single(compiled));
            }
            TranslationNode::Multiple(resources) => {
                let compiled = resources
                    .iter()
                    .map(|resource| {
                        CompiledPattern::compile(locale, resource)
                            .map_err(|kind| BuildError::new(child_path.clone(), kind))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                out.entry(child_path.to_string())
                    .or_default()
                    .insert(locale.clone(), MessageData::Multiple(compiled));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::plain("hello_world")]
    #[case::digits("line2")]
    #[case::underscore("a_b_c")]
    fn accepts_valid_keys(#[case] key: &str) {
        assert!(validate_key(&KeyPath::root(), key).is_ok());
    }

    #[rstest]
    #[case::uppercase("Hello")]
    #[case::dotted("a.b")]
    #[case::dashed("a-b")]
    #[case::empty("")]
    #[case::space("a b")]
    fn rejects_invalid_keys(#[case] key: &str) {
        let err = validate_key(&KeyPath::root().join("section"), key)
            .err()
            .map(|e| e.to_string())
            .unwrap_or_default();
        assert!(err.starts_with("section."), "got: {err}");
    }

    #[test]
    fn wraps_single_line_patterns() {
        assert_eq!(wrap_pattern("Hello!"), "m =\n    Hello!");
    }

    #[test]
    fn wraps_multi_line_patterns() {
        assert_eq!(
            wrap_pattern("Line one\nLine two"),
            "m =\n    Line one\n    Line two",
        );
    }

    #[test]
    fn wraps_empty_pattern_as_string_literal() {
        assert_eq!(wrap_pattern(""), "m = {\"\"}");
    }

    #[test]
    fn malformed_pattern_fails_with_path() {
        let english = crate::langid!("en");
        let mut builder = PhrasebookBuilder::new(english.clone());
        let err = builder
            .translation(&english, |tr| {
                tr.section("section", |s| {
                    s.message("broken", "dangling { brace")?;
                    Ok(())
                })?;
                Ok(())
            })
            .err()
            .map(|e| e.to_string())
            .unwrap_or_default();
        assert!(err.starts_with("section.broken:"), "got: {err}");
    }

    #[test]
    fn invalid_key_aborts_build() {
        let english = crate::langid!("en");
        let mut builder = PhrasebookBuilder::new(english.clone());
        let result = builder.translation(&english, |tr| {
            tr.message("Bad-Key", "text")?;
            Ok(())
        });
        assert!(result.is_err());
    }
}
