//! Character classes driving masking and line-breaking consolidation.
//!
//! Each class is a lazily compiled regex. Scripts are matched by their script
//! extensions, so CJK punctuation shared by Han and kana (「」、。ー) counts as
//! CJK here.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

/// Maximal runs that segmentation must never split: anything printable that
/// is not whitespace and not Han/Hangul/Hiragana/Katakana, plus the no-break
/// spaces.
pub static NO_BREAK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[[^\s\p{Cc}\p{scx=Han}\p{scx=Hangul}\p{scx=Hiragana}\p{scx=Katakana}]\x{A0}\x{202F}\x{FEFF}]+")
        .expect("no-break class")
});

/// Characters that may not start a line
static LINE_START: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^[[\p{Pe}\p{Pf}\p{Po}\x{2010}\x{2013}\x{301C}\x{30A0}\x{A0}",
        r"ぁぃぅぇぉっゃゅょゎゕゖァィゥェォッャュョヮヵヶ\x{31F0}-\x{31FF}ゝゞヽヾ々〻ー]",
        r"--[\x{2014}\x{2025}\x{2026}¡¿]]",
    ))
    .expect("line-start class")
});

/// Characters that may not end a line
static LINE_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\p{Ps}\p{Pi}\p{Sc}\x{A0}]").expect("line-end class"));

/// Characters that must never be separated from an adjacent one of the same class
static INSEPARABLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\x{2014}\x{2025}\x{2026}]").expect("inseparable class"));

static LINE_CONTROLS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\t\n\r]+").expect("line controls"));

static SPACE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r" {2,}").expect("space runs"));

/// Check whether a grapheme may not start a line
pub fn is_line_start_prohibited(grapheme: &str) -> bool {
    LINE_START.is_match(grapheme)
}

/// Check whether a grapheme may not end a line
pub fn is_line_end_prohibited(grapheme: &str) -> bool {
    LINE_END.is_match(grapheme)
}

/// Check whether a grapheme belongs to the inseparable class
pub fn is_inseparable(grapheme: &str) -> bool {
    INSEPARABLE.is_match(grapheme)
}

/// First extended grapheme cluster of `text`
pub fn first_grapheme(text: &str) -> Option<&str> {
    text.graphemes(true).next()
}

/// Last extended grapheme cluster of `text`
pub fn last_grapheme(text: &str) -> Option<&str> {
    text.graphemes(true).next_back()
}

/// Normalize leaf whitespace: drop tabs and line breaks, collapse space runs.
/// Every other code point is kept as written.
pub fn normalize(text: &str) -> String {
    let stripped = LINE_CONTROLS.replace_all(text, "");
    SPACE_RUNS.replace_all(&stripped, " ").into_owned()
}
