//! Word and character segmentation.
//!
//! Word tokens come from masked runs (kept whole) and from the plain text
//! between them, which is cut either into letter/digit runs or, when the word
//! segmenter is enabled, at dictionary word boundaries for the leaf's
//! language. Character tokens are
//! derived afterwards from the finished word list, one per grapheme cluster.

use icu_locale_core::LanguageIdentifier;
use icu_segmenter::options::{WordBreakInvariantOptions, WordBreakOptions};
use icu_segmenter::WordSegmenter;
use log::warn;
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::char_classes::normalize;
use crate::list::TokenList;
use crate::masker::{mask, Fragment};
use crate::token::Token;

/// A run of raw text with its resolved language tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextLeaf {
    /// Raw text, before normalization
    pub text: String,
    /// Nearest explicit language tag, or the document default
    pub lang: String,
}

impl TextLeaf {
    /// Create a leaf
    pub fn new(text: impl Into<String>, lang: impl Into<String>) -> Self {
        TextLeaf {
            text: text.into(),
            lang: lang.into(),
        }
    }
}

/// How plain text is cut into word segments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WordMode {
    /// Maximal letter/digit runs; every other grapheme stands alone
    #[default]
    LetterRuns,
    /// Dictionary/heuristic word boundaries
    Dictionary,
}

/// Segmenter for one configuration
#[derive(Debug, Clone, Copy, Default)]
pub struct Segmenter {
    mode: WordMode,
}

impl Segmenter {
    /// Create a segmenter using the given word mode
    pub fn new(mode: WordMode) -> Self {
        Segmenter { mode }
    }

    /// The word mode in use
    pub fn mode(&self) -> WordMode {
        self.mode
    }

    /// Cut unmasked text in language `lang` into word segments
    pub fn segment_words<'a>(&self, text: &'a str, lang: &str) -> Vec<&'a str> {
        match self.mode {
            WordMode::LetterRuns => letter_runs(text),
            WordMode::Dictionary => dictionary_words(text, content_locale(lang).as_ref()),
        }
    }

    /// Word tokens for every leaf, in document order
    pub fn words(&self, leaves: &[TextLeaf]) -> TokenList {
        let mut list = TokenList::new();

        for (leaf_idx, leaf) in leaves.iter().enumerate() {
            let text = normalize(&leaf.text);
            for fragment in mask(&text) {
                match fragment {
                    Fragment::Masked(run) => {
                        list.push(Token::word(run, leaf.lang.as_str(), leaf_idx));
                    }
                    Fragment::Plain(plain) => {
                        for segment in self.segment_words(plain, &leaf.lang) {
                            list.push(Token::word(segment, leaf.lang.as_str(), leaf_idx));
                        }
                    }
                }
            }
        }

        list
    }

    /// Char tokens for every word, each pointing back at its word's position
    pub fn chars(&self, words: &TokenList) -> TokenList {
        let mut list = TokenList::new();
        for (pos, word) in words.iter().enumerate() {
            for g in word.text().graphemes(true) {
                list.push(Token::char(g, word.lang.as_str(), word.leaf, pos));
            }
        }
        list
    }
}

/// Concatenated normalized text of every leaf
pub fn normalized_source(leaves: &[TextLeaf]) -> String {
    leaves.iter().map(|leaf| normalize(&leaf.text)).collect()
}

fn letter_runs(text: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut run_start: Option<usize> = None;

    for (i, g) in text.grapheme_indices(true) {
        let alnum = g.chars().next().is_some_and(char::is_alphanumeric);
        if alnum {
            if run_start.is_none() {
                run_start = Some(i);
            }
        } else {
            if let Some(start) = run_start.take() {
                segments.push(&text[start..i]);
            }
            segments.push(g);
        }
    }

    if let Some(start) = run_start {
        segments.push(&text[start..]);
    }

    segments
}

/// Parse a language tag for the word segmenter. Unparseable tags give `None`.
fn content_locale(lang: &str) -> Option<LanguageIdentifier> {
    LanguageIdentifier::try_from_str(lang).ok()
}

fn word_break_options(locale: Option<&LanguageIdentifier>) -> WordBreakOptions<'_> {
    let mut options = WordBreakOptions::default();
    options.content_locale = locale;
    options
}

fn dictionary_words<'a>(text: &'a str, locale: Option<&LanguageIdentifier>) -> Vec<&'a str> {
    let breaks: Vec<usize> = match locale {
        Some(locale) => match WordSegmenter::try_new_auto(word_break_options(Some(locale))) {
            Ok(segmenter) => segmenter.as_borrowed().segment_str(text).collect(),
            Err(e) => {
                warn!("no word segmenter for {}: {}", locale, e);
                invariant_breaks(text)
            }
        },
        None => invariant_breaks(text),
    };
    breaks
        .windows(2)
        .map(|w| &text[w[0]..w[1]])
        .filter(|s| !s.is_empty())
        .collect()
}

fn invariant_breaks(text: &str) -> Vec<usize> {
    WordSegmenter::new_auto(WordBreakInvariantOptions::default())
        .segment_str(text)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letter_runs() {
        assert_eq!(letter_runs("日本語です、よ"), vec!["日本語です", "、", "よ"]);
        assert_eq!(letter_runs("「あ」"), vec!["「", "あ", "」"]);
        assert_eq!(letter_runs("a b"), vec!["a", " ", "b"]);
        assert!(letter_runs("").is_empty());
    }

    #[test]
    fn test_dictionary_words_cover_text() {
        let text = "今日は良い天気です";
        let ja = content_locale("ja");
        let segments = dictionary_words(text, ja.as_ref());
        assert!(segments.len() > 1);
        assert_eq!(segments.concat(), text);

        let segments = dictionary_words(text, None);
        assert_eq!(segments.concat(), text);
    }

    #[test]
    fn test_leaf_language_reaches_word_segmenter() {
        let ja = content_locale("ja-JP").unwrap();
        assert_eq!(ja.to_string(), "ja-JP");
        assert_eq!(word_break_options(Some(&ja)).content_locale, Some(&ja));
        assert_eq!(word_break_options(None).content_locale, None);

        assert!(content_locale("not a tag!").is_none());
    }

    #[test]
    fn test_dictionary_mode_tolerates_bad_tags() {
        let segmenter = Segmenter::new(WordMode::Dictionary);
        let text = "今日は良い天気です";
        for lang in ["ja", "zh-Hant", "not a tag!", ""] {
            let segments = segmenter.segment_words(text, lang);
            assert_eq!(segments.concat(), text, "{lang:?}");
        }

        let words = segmenter.words(&[TextLeaf::new(text, "ja")]);
        assert!(words.len() > 1);
        assert!(words.iter().all(|w| w.lang == "ja"));
    }

    #[test]
    fn test_words_masked_runs_stay_whole() {
        let segmenter = Segmenter::default();
        let leaves = vec![TextLeaf::new("contact user@example.com now", "en")];
        let words = segmenter.words(&leaves);
        assert_eq!(words.texts(), vec!["contact", " ", "user@example.com", " ", "now"]);

        let flags: Vec<bool> = words.iter().map(Token::is_whitespace).collect();
        assert_eq!(flags, vec![false, true, false, true, false]);
    }

    #[test]
    fn test_words_are_normalized_per_leaf() {
        let segmenter = Segmenter::default();
        let leaves = vec![
            TextLeaf::new("one  two\n", "en"),
            TextLeaf::new("\t", "en"),
            TextLeaf::new("日本", "ja"),
        ];
        let words = segmenter.words(&leaves);
        assert_eq!(words.texts(), vec!["one", " ", "two", "日本"]);
        assert_eq!(words.concat(), normalized_source(&leaves));

        let last = words.iter().last().unwrap();
        assert_eq!(last.leaf, 2);
        assert_eq!(last.lang, "ja");
    }

    #[test]
    fn test_chars_follow_words() {
        let segmenter = Segmenter::default();
        let words = segmenter.words(&[TextLeaf::new("hi 字", "en")]);
        let chars = segmenter.chars(&words);
        assert_eq!(chars.texts(), vec!["h", "i", " ", "字"]);

        let owners: Vec<Option<usize>> = chars.iter().map(|c| c.word).collect();
        assert_eq!(owners, vec![Some(0), Some(0), Some(1), Some(2)]);
        assert!(chars.iter().nth(2).unwrap().is_whitespace());
    }

    #[test]
    fn test_chars_keep_grapheme_clusters() {
        let segmenter = Segmenter::default();
        let words = segmenter.words(&[TextLeaf::new("👍🏽が", "ja")]);
        let chars = segmenter.chars(&words);
        assert_eq!(chars.texts(), vec!["👍🏽", "が"]);
    }
}
