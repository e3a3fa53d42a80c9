//! Styled text primitives returned by message resolution.
//!
//! A resolved message is a list of [`Text`] nodes, one per line. Each node
//! carries its own [`Style`] and an ordered list of children rendered after
//! the node's own content; effective styling cascades parent-to-child with
//! child values taking precedence.

/// An RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb {
    /// Creates a colour from its three channels.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses a `#rrggbb` hex string (leading `#` optional).
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| {
            digits.get(range).and_then(|s| u8::from_str_radix(s, 16).ok())
        };
        Some(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }

    /// Packs the colour into a `0xRRGGBB` integer.
    #[must_use]
    pub const fn packed(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | (self.b as u32)
    }
}

/// A text style: an optional colour plus four decoration toggles.
///
/// Every field is tri-state: `None` inherits from the enclosing style,
/// `Some(true)` enables the decoration and `Some(false)` disables it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Style {
    /// Foreground colour, if set.
    pub color: Option<Rgb>,
    /// Bold toggle.
    pub bold: Option<bool>,
    /// Italic toggle.
    pub italic: Option<bool>,
    /// Underline toggle.
    pub underlined: Option<bool>,
    /// Strikethrough toggle.
    pub strikethrough: Option<bool>,
}

impl Style {
    /// A style that sets nothing and inherits everything.
    pub const EMPTY: Self = Self {
        color: None,
        bold: None,
        italic: None,
        underlined: None,
        strikethrough: None,
    };

    /// Creates an empty style.
    #[must_use]
    pub const fn new() -> Self {
        Self::EMPTY
    }

    /// Creates a style that only sets a foreground colour.
    #[must_use]
    pub const fn colored(color: Rgb) -> Self {
        Self {
            color: Some(color),
            ..Self::EMPTY
        }
    }

    /// Sets the foreground colour.
    #[must_use]
    pub const fn color(mut self, color: Rgb) -> Self {
        self.color = Some(color);
        self
    }

    /// Sets the bold toggle.
    #[must_use]
    pub const fn bold(mut self, enabled: bool) -> Self {
        self.bold = Some(enabled);
        self
    }

    /// Sets the italic toggle.
    #[must_use]
    pub const fn italic(mut self, enabled: bool) -> Self {
        self.italic = Some(enabled);
        self
    }

    /// Sets the underline toggle.
    #[must_use]
    pub const fn underlined(mut self, enabled: bool) -> Self {
        self.underlined = Some(enabled);
        self
    }

    /// Sets the strikethrough toggle.
    #[must_use]
    pub const fn strikethrough(mut self, enabled: bool) -> Self {
        self.strikethrough = Some(enabled);
        self
    }

    /// Whether the style sets nothing at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.color.is_none()
            && self.bold.is_none()
            && self.italic.is_none()
            && self.underlined.is_none()
            && self.strikethrough.is_none()
    }

    /// Layers `self` over `base`: fields set on `self` win, unset fields
    /// fall through to `base`.
    #[must_use]
    pub const fn merged_over(self, base: Self) -> Self {
        Self {
            color: match self.color {
                Some(c) => Some(c),
                None => base.color,
            },
            bold: match self.bold {
                Some(b) => Some(b),
                None => base.bold,
            },
            italic: match self.italic {
                Some(b) => Some(b),
                None => base.italic,
            },
            underlined: match self.underlined {
                Some(b) => Some(b),
                None => base.underlined,
            },
            strikethrough: match self.strikethrough {
                Some(b) => Some(b),
                None => base.strikethrough,
            },
        }
    }
}

/// A styled text node.
///
/// Rendering order is the node's own `content` first, then each child in
/// declaration order, all under the node's style merged over the inherited
/// one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Text {
    /// Literal content rendered before any children.
    pub content: String,
    /// Style applied to the content and all children.
    pub style: Style,
    /// Child nodes rendered after the content.
    pub children: Vec<Text>,
}

impl Text {
    /// Creates an unstyled leaf node.
    #[must_use]
    pub fn plain(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            style: Style::EMPTY,
            children: Vec::new(),
        }
    }

    /// Creates a styled leaf node.
    #[must_use]
    pub fn styled(content: impl Into<String>, style: Style) -> Self {
        Self {
            content: content.into(),
            style,
            children: Vec::new(),
        }
    }

    /// Creates an unstyled container around an ordered list of children.
    #[must_use]
    pub fn group(children: Vec<Text>) -> Self {
        Self {
            content: String::new(),
            style: Style::EMPTY,
            children,
        }
    }

    /// Appends a child node, returning the modified node.
    #[must_use]
    pub fn append(mut self, child: Text) -> Self {
        self.children.push(child);
        self
    }

    /// Concatenates the literal content of the node and its children,
    /// ignoring styling.
    #[must_use]
    pub fn flattened(&self) -> String {
        let mut out = String::new();
        self.collect_content(&mut out);
        out
    }

    fn collect_content(&self, out: &mut String) {
        out.push_str(&self.content);
        for child in &self.children {
            child.collect_content(out);
        }
    }
}

/// Joins the lines of a message into one node, separated by newline
/// characters.
#[must_use]
pub fn join_lines(lines: &[Text]) -> Text {
    let mut children = Vec::with_capacity(lines.len() * 2);
    for (index, line) in lines.iter().enumerate() {
        if index > 0 {
            children.push(Text::plain("\n"));
        }
        children.push(line.clone());
    }
    Text::group(children)
}

/// Joins the lines of a message into one node with no separators.
#[must_use]
pub fn join_one_line(lines: &[Text]) -> Text {
    Text::group(lines.to_vec())
}

impl From<&str> for Text {
    fn from(content: &str) -> Self {
        Self::plain(content)
    }
}

impl From<String> for Text {
    fn from(content: String) -> Self {
        Self::plain(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::with_hash("#ff8800", Some(Rgb::new(0xff, 0x88, 0x00)))]
    #[case::bare("00aaff", Some(Rgb::new(0x00, 0xaa, 0xff)))]
    #[case::too_short("#fff", None)]
    #[case::not_hex("#zzzzzz", None)]
    fn parses_hex_colours(#[case] input: &str, #[case] expected: Option<Rgb>) {
        assert_eq!(Rgb::from_hex(input), expected);
    }

    #[test]
    fn packs_channels() {
        assert_eq!(Rgb::new(0xaa, 0xbb, 0xcc).packed(), 0x00aa_bbcc);
    }

    #[test]
    fn merge_prefers_overlay_fields() {
        let base = Style::colored(Rgb::new(1, 2, 3)).bold(true);
        let over = Style::new().italic(true).bold(false);
        let merged = over.merged_over(base);
        assert_eq!(merged.color, Some(Rgb::new(1, 2, 3)));
        assert_eq!(merged.bold, Some(false));
        assert_eq!(merged.italic, Some(true));
        assert_eq!(merged.underlined, None);
    }

    #[test]
    fn flattened_walks_children_in_order() {
        let node = Text::plain("a = ")
            .append(Text::styled("red", Style::colored(Rgb::new(255, 85, 85))))
            .append(Text::plain("!"));
        assert_eq!(node.flattened(), "a = red!");
    }

    #[test]
    fn joined_lines_interleave_newlines() {
        let message = vec![Text::plain("one"), Text::plain("two")];
        assert_eq!(join_lines(&message).flattened(), "one\ntwo");
        assert_eq!(join_one_line(&message).flattened(), "onetwo");
        assert_eq!(join_lines(&[]), Text::group(Vec::new()));
    }
}