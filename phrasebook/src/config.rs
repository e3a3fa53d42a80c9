//! Declarative document ingestion.
//!
//! A [`Document`] mirrors the builder surface as plain data: a map node
//! becomes a subsection, a list of strings becomes a multi-message, a
//! scalar string becomes a single message. Applying a document replays it
//! as ordinary builder calls, so a configuration file and a programmatic
//! build are observationally identical.

use std::collections::BTreeMap;

use serde::Deserialize;
use unic_langid::LanguageIdentifier;

use crate::builder::{PhrasebookBuilder, TranslationBuilder};
use crate::error::{BuildError, BuildErrorKind, KeyPath};
use crate::text::{Rgb, Style};

/// A full phrasebook description.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct Document {
    /// Markup strings registered as substitutions, parsed against the
    /// document's styles.
    pub substitutions: BTreeMap<String, String>,
    /// Styles registered as enclosing markup tags.
    pub styles: BTreeMap<String, StyleSpec>,
    /// Translation trees, one per locale.
    pub translations: BTreeMap<String, BTreeMap<String, TranslationEntry>>,
}

/// One node of a translation tree.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TranslationEntry {
    /// A scalar string: a single message pattern.
    Message(String),
    /// A list of strings: an ordered multi-message.
    MessageList(Vec<String>),
    /// A map: a subsection.
    Section(BTreeMap<String, TranslationEntry>),
}

/// Declarative form of a [`Style`].
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct StyleSpec {
    /// Foreground colour as a `#rrggbb` hex string.
    pub color: Option<String>,
    /// Bold toggle.
    pub bold: Option<bool>,
    /// Italic toggle.
    pub italic: Option<bool>,
    /// Underline toggle.
    pub underlined: Option<bool>,
    /// Strikethrough toggle.
    pub strikethrough: Option<bool>,
}

impl StyleSpec {
    fn into_style(self, key: &str) -> Result<Style, BuildError> {
        let mut style = Style {
            color: None,
            bold: self.bold,
            italic: self.italic,
            underlined: self.underlined,
            strikethrough: self.strikethrough,
        };
        if let Some(hex) = self.color {
            let rgb = Rgb::from_hex(&hex).ok_or_else(|| {
                BuildError::new(
                    KeyPath::root().join(key),
                    BuildErrorKind::Style {
                        message: format!("{hex:?} is not a #rrggbb colour"),
                    },
                )
            })?;
            style.color = Some(rgb);
        }
        Ok(style)
    }
}

impl Document {
    /// Parses a YAML document.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] when the source is not valid YAML or does
    /// not match the document shape.
    #[cfg(feature = "yaml")]
    pub fn from_yaml(source: &str) -> Result<Self, BuildError> {
        serde_saphyr::from_str(source).map_err(|error| {
            BuildError::new(
                KeyPath::root(),
                BuildErrorKind::Document {
                    message: error.to_string(),
                },
            )
        })
    }

    /// Replays the document onto a builder: styles first, then
    /// substitutions (parsed against those styles), then translations.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] on invalid keys, colours, locales or
    /// patterns.
    pub fn apply(self, builder: &mut PhrasebookBuilder) -> Result<(), BuildError> {
        for (key, spec) in self.styles {
            builder.style(&key, spec.into_style(&key)?)?;
        }
        for (key, markup) in self.substitutions {
            builder.markup_substitution(&key, &markup)?;
        }
        for (locale_text, entries) in self.translations {
            let locale: LanguageIdentifier = locale_text.parse().map_err(|_| {
                BuildError::new(
                    KeyPath::root(),
                    BuildErrorKind::Locale {
                        locale: locale_text.clone(),
                    },
                )
            })?;
            builder.translation(&locale, |tr| apply_section(tr, entries))?;
        }
        Ok(())
    }
}

fn apply_section(
    tr: &mut TranslationBuilder<'_>,
    entries: BTreeMap<String, TranslationEntry>,
) -> Result<(), BuildError> {
    for (key, entry) in entries {
        match entry {
            TranslationEntry::Message(pattern) => {
                tr.message(&key, &pattern)?;
            }
            TranslationEntry::MessageList(patterns) => {
                tr.message_list(&key, &patterns)?;
            }
            TranslationEntry::Section(children) => {
                tr.section(&key, |sub| apply_section(sub, children))?;
            }
        }
    }
    Ok(())
}
