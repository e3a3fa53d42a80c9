//! ANSI terminal rendering of styled text.
//!
//! A pure leaf converter: nothing in the resolution engine depends on it.
//! Colour capability follows the `COLORTERM` convention, defaulting to the
//! sixteen-colour indexed palette when the variable is absent or
//! ambiguous.

use std::env;

use crate::text::{Rgb, Style, Text};
use crate::Message;

const RESET: &str = "\u{1b}[0m";

/// Colour capability of the output terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorLevel {
    /// Terminals supporting all RGB colour combinations.
    TrueColor,
    /// Terminals supporting only the basic sixteen colours.
    Indexed16,
}

impl ColorLevel {
    /// Detects the colour level of the current terminal from `COLORTERM`.
    #[must_use]
    pub fn detect() -> Self {
        Self::from_colorterm(env::var("COLORTERM").ok().as_deref())
    }

    /// Maps a `COLORTERM` value to a colour level.
    #[must_use]
    pub fn from_colorterm(value: Option<&str>) -> Self {
        match value {
            Some("truecolor" | "24bit") => Self::TrueColor,
            _ => Self::Indexed16,
        }
    }

    /// The SGR foreground parameter for `color` at this level.
    fn fg_parameter(self, color: Rgb) -> String {
        match self {
            Self::TrueColor => format!("38;2;{};{};{}", color.r, color.g, color.b),
            Self::Indexed16 => indexed_parameter(color).to_owned(),
        }
    }
}

/// Maps the sixteen exact palette values to their SGR codes; anything else
/// falls back to the default foreground.
fn indexed_parameter(color: Rgb) -> &'static str {
    match color.packed() {
        0x0000_0000 => "30",
        0x0000_00aa => "34",
        0x0000_aa00 => "32",
        0x0000_aaaa => "36",
        0x00aa_0000 => "31",
        0x00aa_00aa => "35",
        0x00ff_aa00 => "33",
        0x00aa_aaaa => "37",
        0x0055_5555 => "90",
        0x0055_55ff => "94",
        0x0055_ff55 => "92",
        0x0055_ffff => "96",
        0x00ff_5555 => "91",
        0x00ff_55ff => "95",
        0x00ff_ff55 => "93",
        0x00ff_ffff => "97",
        _ => "39",
    }
}

/// Renders styled text to a string with ANSI SGR escape sequences.
#[derive(Debug, Clone, Copy)]
pub struct AnsiRenderer {
    level: ColorLevel,
}

impl AnsiRenderer {
    /// Creates a renderer for a specific colour level.
    #[must_use]
    pub const fn new(level: ColorLevel) -> Self {
        Self { level }
    }

    /// Creates a renderer for the detected colour level.
    #[must_use]
    pub fn detected() -> Self {
        Self::new(ColorLevel::detect())
    }

    /// Renders one styled text node.
    #[must_use]
    pub fn render(&self, text: &Text) -> String {
        let mut out = String::new();
        let mut current = Style::EMPTY;
        self.render_node(text, Style::EMPTY, &mut current, &mut out);
        if current != Style::EMPTY {
            out.push_str(RESET);
        }
        out
    }

    /// Renders a message, joining its lines with `\n`.
    #[must_use]
    pub fn render_message(&self, message: &Message) -> String {
        message
            .iter()
            .map(|line| self.render(line))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn render_node(&self, node: &Text, inherited: Style, current: &mut Style, out: &mut String) {
        let effective = node.style.merged_over(inherited);
        if !node.content.is_empty() {
            if *current != effective {
                self.emit_transition(*current, effective, out);
                *current = effective;
            }
            out.push_str(&node.content);
        }
        for child in &node.children {
            self.render_node(child, effective, current, out);
        }
    }

    /// Emits the escape sequence switching from one effective style to
    /// another: a reset when leaving a styled run, then the parameters of
    /// the new style.
    fn emit_transition(&self, from: Style, to: Style, out: &mut String) {
        let mut parameters: Vec<String> = Vec::new();
        if from != Style::EMPTY {
            parameters.push(String::from("0"));
        }
        if let Some(color) = to.color {
            parameters.push(self.level.fg_parameter(color));
        }
        for (enabled, code) in [
            (to.bold, "1"),
            (to.italic, "3"),
            (to.underlined, "4"),
            (to.strikethrough, "9"),
        ] {
            if enabled == Some(true) {
                parameters.push(String::from(code));
            }
        }
        if parameters.is_empty() {
            return;
        }
        out.push_str("\u{1b}[");
        out.push_str(&parameters.join(";"));
        out.push('m');
    }
}
