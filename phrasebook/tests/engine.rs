//! Behavioural tests for the resolution engine: locale fallback, provider
//! delegation, line splitting, tag resolution and formatter delegation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use phrasebook::{
    EchoProvider, InvalidMessageProvider, LanguageIdentifier, LocaleView, Message, MessageArgs,
    MessageKind, Phrasebook, PhrasebookBuilder, Rgb, StandardPhrasebook, Style, Text, langid,
    root_locale,
};

const PLAYERS_PATTERN: &str = "There { $players ->\n    [0] are no players\n    [one] is { $players } player\n   *[other] are { $players } players\n} online.";

fn english() -> LanguageIdentifier {
    langid!("en")
}

fn french() -> LanguageIdentifier {
    langid!("fr")
}

fn book() -> StandardPhrasebook {
    let mut builder = PhrasebookBuilder::new(english());
    builder
        .substitution(
            "heart",
            Text::styled("\u{2764}", Style::colored(Rgb::new(0xff, 0x55, 0x55))),
        )
        .expect("substitution should register");
    builder
        .style("accent", Style::colored(Rgb::new(0x55, 0xff, 0x55)))
        .expect("style should register");
    builder
        .translation(&english(), |tr| {
            tr.message("hello_world", "Hello World!")?;
            tr.message("a_message", "Simple message")?;
            tr.message("multiline", "Line one\nLine two")?;
            tr.message("three_lines", "one\ntwo\nthree")?;
            tr.message_list("a_message_list", ["Message one", "Message two"])?;
            tr.message_list(
                "splash",
                ["One", "Two", "Three\nFour"],
            )?;
            tr.section("section", |section| {
                section.message("child", "Child message")?;
                Ok(())
            })?;
            tr.message("with_replacement", "a = <a>")?;
            tr.message("with_substitution", "here: <heart/>")?;
            tr.message("with_style", "see <accent>green</accent>")?;
            tr.message("with_format_number", "num = { $num }")?;
            tr.message("with_format_date", "dt = { DATETIME($dt) }")?;
            tr.message("players", PLAYERS_PATTERN)?;
            Ok(())
        })
        .expect("english translations should build");
    builder
        .translation(&french(), |tr| {
            tr.message("hello_world", "FR Hello World!")?;
            tr.message("multiline", "FR Line one\nFR Line two")?;
            Ok(())
        })
        .expect("french translations should build");
    builder
        .translation(&root_locale(), |tr| {
            tr.message("root_only", "From root")?;
            Ok(())
        })
        .expect("root translations should build");
    builder.build().expect("book should build")
}

#[test]
fn builder_counts_registrations() {
    let mut builder = PhrasebookBuilder::new(english());
    builder
        .substitution("a", Text::plain("A"))
        .expect("substitution should register");
    builder
        .style("a", Style::new().bold(true))
        .expect("style should register");
    builder
        .translation(&english(), |tr| {
            tr.message("a", "A")?;
            tr.message("b", "B")?;
            tr.message("c", "C")?;
            Ok(())
        })
        .expect("english translations should build");
    builder
        .translation(&french(), |tr| {
            tr.message("a", "FR A")?;
            Ok(())
        })
        .expect("french translations should build");
    let book = builder.build().expect("book should build");

    assert_eq!(book.substitution_count(), 1);
    assert_eq!(book.style_count(), 1);
    assert_eq!(book.locale_count(), 2);
    assert_eq!(book.message_count(), 3);
}

#[test]
fn resolves_basic_messages() {
    let book = book();
    assert_eq!(
        book.message(&english(), "hello_world", &MessageArgs::new()),
        vec![Text::plain("Hello World!")],
    );
    assert_eq!(
        book.message(&english(), "section.child", &MessageArgs::new()),
        vec![Text::plain("Child message")],
    );
    assert_eq!(
        book.default_message("hello_world", &MessageArgs::new()),
        vec![Text::plain("Hello World!")],
    );
}

#[test]
fn locale_specific_entries_win() {
    let book = book();
    assert_eq!(
        book.message(&french(), "hello_world", &MessageArgs::new()),
        vec![Text::plain("FR Hello World!")],
    );
    assert_eq!(
        book.message(&english(), "hello_world", &MessageArgs::new()),
        vec![Text::plain("Hello World!")],
    );
}

#[test]
fn missing_locale_falls_back_to_default_then_root() {
    let book = book();
    // French has no entry: fall back to the default locale.
    assert_eq!(
        book.message(&french(), "a_message", &MessageArgs::new()),
        book.message(&english(), "a_message", &MessageArgs::new()),
    );
    // Neither German nor the default carries this key: fall back to root.
    assert_eq!(
        book.message(&langid!("de"), "root_only", &MessageArgs::new()),
        vec![Text::plain("From root")],
    );
}

#[test]
fn missing_key_echoes_through_default_provider() {
    let book = book();
    assert_eq!(
        book.message(&english(), "missing_key", &MessageArgs::new()),
        vec![Text::plain("missing_key")],
    );
    assert_eq!(
        book.message(&french(), "missing_key", &MessageArgs::new()),
        vec![Text::plain("missing_key")],
    );
}

#[test]
fn arity_mismatch_delegates_to_provider() {
    let book = book();
    assert_eq!(
        book.message_list(&english(), "a_message", &MessageArgs::new()),
        vec![vec![Text::plain("a_message")]],
    );
    assert_eq!(
        book.message(&english(), "a_message_list", &MessageArgs::new()),
        vec![Text::plain("a_message_list")],
    );
}

struct RecordingProvider {
    missing: Arc<AtomicBool>,
    invalid: Arc<AtomicBool>,
}

impl InvalidMessageProvider for RecordingProvider {
    fn missing(&self, _key: &str) -> Message {
        self.missing.store(true, Ordering::SeqCst);
        Vec::new()
    }

    fn invalid_type(&self, _key: &str, expected: MessageKind) -> Message {
        assert_eq!(expected, MessageKind::Multiple);
        self.invalid.store(true, Ordering::SeqCst);
        Vec::new()
    }
}

#[test]
fn custom_provider_sees_each_condition() {
    let missing = Arc::new(AtomicBool::new(false));
    let invalid = Arc::new(AtomicBool::new(false));
    let mut builder = PhrasebookBuilder::new(english()).with_invalid_message_provider(
        RecordingProvider {
            missing: Arc::clone(&missing),
            invalid: Arc::clone(&invalid),
        },
    );
    builder
        .translation(&english(), |tr| {
            tr.message("a_message", "Message")?;
            Ok(())
        })
        .expect("translations should build");
    let book = builder.build().expect("book should build");

    let resolved = book.message(&english(), "a_message", &MessageArgs::new());
    assert_eq!(resolved, vec![Text::plain("Message")]);
    assert!(!missing.load(Ordering::SeqCst));
    assert!(!invalid.load(Ordering::SeqCst));

    assert_eq!(
        book.message(&english(), "absent", &MessageArgs::new()),
        Vec::<Text>::new(),
    );
    assert!(missing.load(Ordering::SeqCst));
    assert!(!invalid.load(Ordering::SeqCst));

    assert_eq!(
        book.message_list(&english(), "a_message", &MessageArgs::new()),
        vec![Vec::<Text>::new()],
    );
    assert!(invalid.load(Ordering::SeqCst));
}

#[test]
fn newlines_split_into_separate_lines() {
    let book = book();
    assert_eq!(
        book.message(&english(), "multiline", &MessageArgs::new()),
        vec![Text::plain("Line one"), Text::plain("Line two")],
    );
    assert_eq!(
        book.message(&french(), "multiline", &MessageArgs::new()),
        vec![Text::plain("FR Line one"), Text::plain("FR Line two")],
    );
    // Two newlines yield exactly three lines.
    assert_eq!(
        book.message(&english(), "three_lines", &MessageArgs::new()).len(),
        3,
    );
}

#[test]
fn message_lists_preserve_order_and_split_lines() {
    let book = book();
    assert_eq!(
        book.message_list(&english(), "splash", &MessageArgs::new()),
        vec![
            vec![Text::plain("One")],
            vec![Text::plain("Two")],
            vec![Text::plain("Three"), Text::plain("Four")],
        ],
    );
    assert_eq!(
        book.message_list(&french(), "a_message_list", &MessageArgs::new()),
        vec![
            vec![Text::plain("Message one")],
            vec![Text::plain("Message two")],
        ],
    );
}

#[test]
fn replacements_substitute_styled_fragments() {
    let book = book();
    assert_eq!(
        book.message(
            &english(),
            "with_replacement",
            &MessageArgs::new().replace("a", Text::plain("Hello")),
        ),
        vec![Text::group(vec![
            Text::plain("a = "),
            Text::plain("Hello"),
        ])],
    );

    let red = Style::colored(Rgb::new(0xff, 0x55, 0x55));
    assert_eq!(
        book.message(
            &english(),
            "with_replacement",
            &MessageArgs::new().replace("a", Text::styled("Red", red)),
        ),
        vec![Text::group(vec![
            Text::plain("a = "),
            Text::styled("Red", red),
        ])],
    );
}

#[test]
fn substitutions_and_styles_resolve_as_tags() {
    let book = book();
    let heart = Text::styled("\u{2764}", Style::colored(Rgb::new(0xff, 0x55, 0x55)));
    assert_eq!(
        book.message(&english(), "with_substitution", &MessageArgs::new()),
        vec![Text::group(vec![Text::plain("here: "), heart])],
    );
    assert_eq!(
        book.message(&english(), "with_style", &MessageArgs::new()),
        vec![Text::group(vec![
            Text::plain("see "),
            Text::styled("green", Style::colored(Rgb::new(0x55, 0xff, 0x55))),
        ])],
    );
}

#[test]
fn call_replacements_override_substitutions() {
    let book = book();
    assert_eq!(
        book.message(
            &english(),
            "with_substitution",
            &MessageArgs::new().replace("heart", Text::plain("X")),
        ),
        vec![Text::group(vec![Text::plain("here: "), Text::plain("X")])],
    );
}

#[test]
fn formatter_renders_numbers() {
    let book = book();
    assert_eq!(
        book.message(
            &english(),
            "with_format_number",
            &MessageArgs::new().format("num", 123),
        ),
        vec![Text::plain("num = 123")],
    );
    assert_eq!(
        book.message(
            &english(),
            "with_format_number",
            &MessageArgs::new().format("num", 1234.5),
        ),
        vec![Text::plain("num = 1234.5")],
    );
}

#[test]
fn datetime_renders_calendar_dates() {
    let book = book();
    assert_eq!(
        book.message(
            &english(),
            "with_format_date",
            &MessageArgs::new().format("dt", 0),
        ),
        vec![Text::plain("dt = 1970-01-01")],
    );
}

#[test]
fn plural_selectors_pick_variants() {
    let book = book();
    let line = |count: i64| {
        book.message(
            &english(),
            "players",
            &MessageArgs::new().format("players", count),
        )
    };
    assert_eq!(line(0), vec![Text::plain("There are no players online.")]);
    assert_eq!(line(1), vec![Text::plain("There is 1 player online.")]);
    assert_eq!(line(10), vec![Text::plain("There are 10 players online.")]);
}

#[test]
fn later_submissions_merge_over_earlier_ones() {
    let mut builder = PhrasebookBuilder::new(english());
    builder
        .translation(&english(), |tr| {
            tr.message("kept", "Kept")?;
            tr.message("overridden", "Old")?;
            tr.section("section", |section| {
                section.message("first", "First")?;
                Ok(())
            })?;
            Ok(())
        })
        .expect("first submission should build");
    builder
        .translation(&english(), |tr| {
            tr.message("added", "Added")?;
            tr.message("overridden", "New")?;
            tr.section("section", |section| {
                section.message("second", "Second")?;
                Ok(())
            })?;
            Ok(())
        })
        .expect("second submission should build");
    let book = builder.build().expect("book should build");

    let resolve = |key: &str| book.message(&english(), key, &MessageArgs::new());
    assert_eq!(resolve("kept"), vec![Text::plain("Kept")]);
    assert_eq!(resolve("added"), vec![Text::plain("Added")]);
    assert_eq!(resolve("overridden"), vec![Text::plain("New")]);
    assert_eq!(resolve("section.first"), vec![Text::plain("First")]);
    assert_eq!(resolve("section.second"), vec![Text::plain("Second")]);
}

#[test]
fn locale_view_binds_a_fixed_locale() {
    let book: Arc<dyn Phrasebook> = Arc::new(book());
    let view = LocaleView::new(Arc::clone(&book), french());
    assert_eq!(
        view.message("hello_world", &MessageArgs::new()),
        vec![Text::plain("FR Hello World!")],
    );
    assert_eq!(view.locale(), &french());
    // The underlying engine is untouched.
    assert_eq!(book.default_locale(), &english());
}

#[test]
fn default_provider_is_silent_echo() {
    let mut builder =
        PhrasebookBuilder::new(english()).with_invalid_message_provider(EchoProvider);
    builder
        .translation(&english(), |tr| {
            tr.message("present", "Here")?;
            Ok(())
        })
        .expect("translations should build");
    let book = builder.build().expect("book should build");
    assert_eq!(
        book.message_list(&english(), "present", &MessageArgs::new()),
        vec![vec![Text::plain("present")]],
    );
}
