//! Per-call arguments for message resolution.

use std::collections::HashMap;

use fluent_bundle::{FluentArgs, FluentValue};

use crate::text::Text;

/// Arguments passed to a message resolution call.
///
/// `replace` entries substitute a placeholder tag with a pre-styled
/// fragment; `format` entries are handed to the formatter and rendered
/// locale-sensitively (plural selection, numbers, `DATETIME`). Both maps
/// merge associatively with later entries winning.
#[derive(Debug, Default, Clone)]
pub struct MessageArgs {
    pub(crate) replace: HashMap<String, Text>,
    pub(crate) format: HashMap<String, FluentValue<'static>>,
}

impl MessageArgs {
    /// Creates an empty argument set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a placeholder that is replaced by a styled fragment.
    #[must_use]
    pub fn replace(mut self, key: impl Into<String>, value: impl Into<Text>) -> Self {
        self.replace.insert(key.into(), value.into());
        self
    }

    /// Adds a placeholder that is formatted by the formatter.
    #[must_use]
    pub fn format(
        mut self,
        key: impl Into<String>,
        value: impl Into<FluentValue<'static>>,
    ) -> Self {
        self.format.insert(key.into(), value.into());
        self
    }

    /// Merges another argument set over this one; entries from `other`
    /// take priority for colliding keys.
    #[must_use]
    pub fn merged_with(mut self, other: Self) -> Self {
        self.replace.extend(other.replace);
        self.format.extend(other.format);
        self
    }

    /// Whether no arguments of either kind are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.replace.is_empty() && self.format.is_empty()
    }

    /// Projects the `format` entries into formatter arguments.
    pub(crate) fn fluent_args(&self) -> FluentArgs<'static> {
        let mut args = FluentArgs::with_capacity(self.format.len());
        for (key, value) in &self.format {
            args.set(key.clone(), value.clone());
        }
        args
    }
}
