//! No-break masking.
//!
//! Before segmentation, each leaf is cut into plain stretches and masked runs.
//! A masked run is a maximal match of [`NO_BREAK`] and becomes exactly one word
//! token, so URLs, emoticons, numbers and Latin words inside CJK text are
//! never torn apart by the segmenter.

use crate::char_classes::NO_BREAK;

/// A piece of leaf text after masking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fragment<'a> {
    /// Text left to the segmenter
    Plain(&'a str),
    /// Atomic run that must stay whole
    Masked(&'a str),
}

impl<'a> Fragment<'a> {
    /// The fragment's text
    pub fn as_str(&self) -> &'a str {
        match self {
            Fragment::Plain(s) | Fragment::Masked(s) => s,
        }
    }

    /// Check if this is a masked run
    pub fn is_masked(&self) -> bool {
        matches!(self, Fragment::Masked(_))
    }
}

/// Cut `text` into plain and masked fragments whose concatenation is `text`.
pub fn mask(text: &str) -> Vec<Fragment<'_>> {
    let mut fragments = Vec::new();
    let mut last = 0;

    for m in NO_BREAK.find_iter(text) {
        if m.start() > last {
            fragments.push(Fragment::Plain(&text[last..m.start()]));
        }
        fragments.push(Fragment::Masked(m.as_str()));
        last = m.end();
    }

    if last < text.len() {
        fragments.push(Fragment::Plain(&text[last..]));
    }

    fragments
}
