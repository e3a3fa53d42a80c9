//! The tag markup language applied to each formatted line.
//!
//! Two tag forms exist: `<name>` opens an enclosing style tag closed by
//! `</name>`, and `<name/>` (or a bare `<name>` resolving to a fragment)
//! inserts a fixed styled fragment. Tag names follow the key segment
//! grammar (`[a-z0-9_]+`). Anything that does not scan as a tag, or that
//! names a tag the resolver does not know, passes through as literal text;
//! `\<` escapes a literal `<`. Enclosing tags left open at the end of the
//! input are closed implicitly.

use std::collections::HashMap;

use crate::text::{Style, Text};

/// Resolved meaning of a markup tag name.
#[derive(Debug, Clone, Copy)]
pub enum Tag<'a> {
    /// Inserts a fixed fragment in place of the tag.
    Insert(&'a Text),
    /// Applies a style to the content wrapped by the tag pair.
    Styling(&'a Style),
}

/// A name → tag lookup table assembled from layered sources.
///
/// Later registrations override earlier ones for the same name, which is
/// how call-time replacements shadow engine-wide styles and substitutions.
#[derive(Debug, Default, Clone)]
pub struct TagResolver<'a> {
    tags: HashMap<&'a str, Tag<'a>>,
}

impl<'a> TagResolver<'a> {
    /// Creates an empty resolver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an inserting tag, overriding any prior meaning of `name`.
    pub fn tag_insert(&mut self, name: &'a str, fragment: &'a Text) {
        self.tags.insert(name, Tag::Insert(fragment));
    }

    /// Registers a styling tag, overriding any prior meaning of `name`.
    pub fn tag_style(&mut self, name: &'a str, style: &'a Style) {
        self.tags.insert(name, Tag::Styling(style));
    }

    /// Looks a tag name up.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<Tag<'a>> {
        self.tags.get(name).copied()
    }

    /// Assembles the per-call resolver. Substitutions are the lowest
    /// priority layer, styles override substitutions, call replacements
    /// override both.
    pub(crate) fn assemble(
        substitutions: &'a HashMap<String, Text>,
        styles: &'a HashMap<String, Style>,
        replacements: &'a HashMap<String, Text>,
    ) -> Self {
        let mut resolver = Self::new();
        for (name, fragment) in substitutions {
            resolver.tag_insert(name, fragment);
        }
        for (name, style) in styles {
            resolver.tag_style(name, style);
        }
        for (name, fragment) in replacements {
            resolver.tag_insert(name, fragment);
        }
        resolver
    }
}

/// One parse frame: an open styling tag and the nodes collected under it.
struct Frame {
    name: Option<String>,
    style: Style,
    nodes: Vec<Text>,
    buf: String,
}

impl Frame {
    fn root() -> Self {
        Self {
            name: None,
            style: Style::EMPTY,
            nodes: Vec::new(),
            buf: String::new(),
        }
    }

    fn open(name: &str, style: Style) -> Self {
        Self {
            name: Some(name.to_owned()),
            style,
            nodes: Vec::new(),
            buf: String::new(),
        }
    }

    fn flush(&mut self) {
        if !self.buf.is_empty() {
            self.nodes.push(Text::plain(std::mem::take(&mut self.buf)));
        }
    }

    fn close(mut self) -> Text {
        self.flush();
        if self.nodes.len() == 1 {
            // A style-transparent frame contributes nothing of its own.
            if self.style.is_empty() {
                return self.nodes.pop().unwrap_or_default();
            }
            // A lone plain leaf folds into the frame node itself.
            let only = &self.nodes[0];
            if only.style.is_empty() && only.children.is_empty() {
                let Some(only) = self.nodes.pop() else {
                    return Text::default();
                };
                return Text {
                    content: only.content,
                    style: self.style,
                    children: Vec::new(),
                };
            }
        }
        Text {
            content: String::new(),
            style: self.style,
            children: self.nodes,
        }
    }
}

fn is_tag_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| matches!(c, 'a'..='z' | '0'..='9' | '_'))
}

/// The three scannable tag token forms.
enum Token<'a> {
    Open(&'a str),
    Close(&'a str),
    SelfClosing(&'a str),
}

fn scan_token(token: &str) -> Option<Token<'_>> {
    if let Some(name) = token.strip_prefix('/') {
        return is_tag_name(name).then_some(Token::Close(name));
    }
    if let Some(name) = token.strip_suffix('/') {
        return is_tag_name(name).then_some(Token::SelfClosing(name));
    }
    is_tag_name(token).then_some(Token::Open(token))
}

/// Parses one line of formatted output into a styled text node.
#[must_use]
pub fn parse(input: &str, resolver: &TagResolver<'_>) -> Text {
    let mut stack = vec![Frame::root()];
    let mut rest = input;

    while let Some(pos) = rest.find(['\\', '<']) {
        let (literal, tail) = rest.split_at(pos);
        push_literal(&mut stack, literal);
        let mut chars = tail.chars();
        let Some(marker) = chars.next() else { break };

        if marker == '\\' {
            // Only `\<` is an escape; a stray backslash is literal.
            match chars.next() {
                Some('<') => {
                    push_literal(&mut stack, "<");
                    rest = chars.as_str();
                }
                _ => {
                    push_literal(&mut stack, "\\");
                    rest = &tail[1..];
                }
            }
            continue;
        }

        let Some(end) = tail.find('>') else {
            push_literal(&mut stack, tail);
            rest = "";
            break;
        };
        let token = &tail[1..end];
        let raw = &tail[..=end];
        rest = &tail[end + 1..];

        match scan_token(token) {
            Some(Token::Close(name)) => {
                if !close_tag(&mut stack, name) {
                    push_literal(&mut stack, raw);
                }
            }
            Some(Token::Open(name)) => match resolver.resolve(name) {
                Some(Tag::Styling(style)) => stack.push(Frame::open(name, *style)),
                Some(Tag::Insert(fragment)) => insert_fragment(&mut stack, fragment),
                None => push_literal(&mut stack, raw),
            },
            Some(Token::SelfClosing(name)) => match resolver.resolve(name) {
                Some(Tag::Insert(fragment)) => insert_fragment(&mut stack, fragment),
                _ => push_literal(&mut stack, raw),
            },
            None => push_literal(&mut stack, raw),
        }
    }
    push_literal(&mut stack, rest);

    // Implicitly close anything left open.
    while stack.len() > 1 {
        let Some(frame) = stack.pop() else { break };
        let node = frame.close();
        if let Some(parent) = stack.last_mut() {
            parent.flush();
            parent.nodes.push(node);
        }
    }
    stack.pop().map(Frame::close).unwrap_or_default()
}

fn push_literal(stack: &mut [Frame], literal: &str) {
    if literal.is_empty() {
        return;
    }
    if let Some(frame) = stack.last_mut() {
        frame.buf.push_str(literal);
    }
}

fn insert_fragment(stack: &mut [Frame], fragment: &Text) {
    if let Some(frame) = stack.last_mut() {
        frame.flush();
        frame.nodes.push(fragment.clone());
    }
}

/// Closes the innermost open tag named `name`, implicitly closing any tags
/// opened inside it. Returns false when no such tag is open.
fn close_tag(stack: &mut Vec<Frame>, name: &str) -> bool {
    let Some(target) = stack
        .iter()
        .rposition(|frame| frame.name.as_deref() == Some(name))
    else {
        return false;
    };
    while stack.len() > target {
        let Some(frame) = stack.pop() else { break };
        let node = frame.close();
        if let Some(parent) = stack.last_mut() {
            parent.flush();
            parent.nodes.push(node);
        }
    }
    true
}
