//! Identifier-to-key derivation.
//!
//! Wherever a method or parameter carries no explicit override, its key or
//! placeholder name is derived from the identifier by splitting it into
//! words and re-joining them with the configured convention.

use heck::{ToKebabCase, ToSnakeCase};

/// The word-joining convention used for derived keys and placeholders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum NamingScheme {
    /// Words joined with `_` (the default).
    #[default]
    Snake,
    /// Words joined with `-`.
    Kebab,
}

impl NamingScheme {
    /// Parses a `rename_all` value.
    pub(crate) fn parse(value: &str) -> Option<Self> {
        match value {
            "snake_case" => Some(Self::Snake),
            "kebab-case" => Some(Self::Kebab),
            _ => None,
        }
    }

    /// Derives a key from an identifier.
    pub(crate) fn apply(self, identifier: &str) -> String {
        match self {
            Self::Snake => identifier.to_snake_case(),
            Self::Kebab => identifier.to_kebab_case(),
        }
    }
}
