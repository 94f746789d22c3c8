//! The splitting pipeline.
//!
//! mask → segment words → consolidate words (unless consolidating chars) →
//! segment chars → consolidate chars and refresh words (if requested) →
//! number tokens.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SplitError};
use crate::list::TokenList;
use crate::rules::{consolidate, refresh_words};
use crate::segmenter::{normalized_source, Segmenter, TextLeaf, WordMode};
use crate::token::Token;

/// Language used when neither the leaf nor the document names one
pub const FALLBACK_LANG: &str = "en";

/// Splitting configuration. Every key is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SplitOptions {
    /// Run the line-breaking consolidation at all
    pub line_breaking_rules: bool,
    /// Consolidate char tokens instead of word tokens
    pub concat_char: bool,
    /// Use dictionary word boundaries instead of letter/digit runs
    pub word_segmenter: bool,
    /// Document-wide language tag
    pub default_lang: Option<String>,
}

impl Default for SplitOptions {
    fn default() -> Self {
        SplitOptions {
            line_breaking_rules: true,
            concat_char: false,
            word_segmenter: false,
            default_lang: None,
        }
    }
}

impl SplitOptions {
    /// Parse options from JSON, e.g. `{"concatChar": true}`
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Document default language, or the fallback
    pub fn lang(&self) -> &str {
        self.default_lang.as_deref().unwrap_or(FALLBACK_LANG)
    }
}

/// Finished word and char tokens of one block
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Split {
    /// Word tokens in order
    pub words: Vec<Token>,
    /// Char tokens in order
    pub chars: Vec<Token>,
}

impl Split {
    /// Total number of word tokens
    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    /// Total number of char tokens
    pub fn char_count(&self) -> usize {
        self.chars.len()
    }

    /// Word texts in order
    pub fn word_texts(&self) -> Vec<&str> {
        self.words.iter().map(Token::text).collect()
    }

    /// Char texts in order
    pub fn char_texts(&self) -> Vec<&str> {
        self.chars.iter().map(Token::text).collect()
    }

    /// Chars belonging to the word at `index`
    pub fn chars_of(&self, index: usize) -> impl Iterator<Item = &Token> {
        self.chars.iter().filter(move |c| c.word == Some(index))
    }
}

/// Splits text leaves according to [`SplitOptions`]
#[derive(Debug, Clone, Default)]
pub struct Splitter {
    options: SplitOptions,
    segmenter: Segmenter,
}

impl Splitter {
    /// Create a splitter
    pub fn new(options: SplitOptions) -> Self {
        let mode = if options.word_segmenter {
            WordMode::Dictionary
        } else {
            WordMode::LetterRuns
        };
        Splitter {
            options,
            segmenter: Segmenter::new(mode),
        }
    }

    /// The options in use
    pub fn options(&self) -> &SplitOptions {
        &self.options
    }

    /// Split a single run of plain text in the default language
    pub fn split_text(&self, text: &str) -> Result<Split> {
        self.split_leaves(&[TextLeaf::new(text, self.options.lang())])
    }

    /// Split leaves given in document order
    pub fn split_leaves(&self, leaves: &[TextLeaf]) -> Result<Split> {
        let source = normalized_source(leaves);
        let rules = self.options.line_breaking_rules;

        let mut words = self.segmenter.words(leaves);
        debug!("segmented {} leaves into {} words", leaves.len(), words.len());

        if rules && !self.options.concat_char {
            let merges = consolidate(&mut words)?;
            debug!("word consolidation: {} merges, {} words left", merges, words.len());
        }

        let mut chars = self.segmenter.chars(&words);
        debug!("segmented {} chars", chars.len());

        if rules && self.options.concat_char {
            let merges = consolidate(&mut chars)?;
            let dropped = refresh_words(&mut words, &mut chars)?;
            debug!(
                "char consolidation: {} merges, {} chars left, {} words dropped",
                merges,
                chars.len(),
                dropped
            );
        }

        check_coverage(&source, &words)?;
        check_coverage(&source, &chars)?;

        Ok(Split {
            words: number(words),
            chars: number(chars),
        })
    }
}

fn check_coverage(source: &str, list: &TokenList) -> Result<()> {
    let found = list.concat();
    if found == source {
        Ok(())
    } else {
        Err(SplitError::CoverageMismatch {
            expected: source.to_string(),
            found,
        })
    }
}

fn number(list: TokenList) -> Vec<Token> {
    let mut tokens = list.into_vec();
    for (i, token) in tokens.iter_mut().enumerate() {
        token.index = i;
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = SplitOptions::default();
        assert!(options.line_breaking_rules);
        assert!(!options.concat_char);
        assert!(!options.word_segmenter);
        assert_eq!(options.lang(), FALLBACK_LANG);
    }

    #[test]
    fn test_options_from_json() {
        let options = SplitOptions::from_json(r#"{"concatChar": true, "defaultLang": "ja"}"#).unwrap();
        assert!(options.line_breaking_rules);
        assert!(options.concat_char);
        assert_eq!(options.lang(), "ja");

        let options = SplitOptions::from_json("{}").unwrap();
        assert_eq!(options, SplitOptions::default());

        assert!(matches!(
            SplitOptions::from_json("{\"concatChar\": 1}"),
            Err(SplitError::Config(_))
        ));
    }

    #[test]
    fn test_indices_are_sequential() {
        let split = Splitter::default().split_text("a b c").unwrap();
        let indices: Vec<usize> = split.words.iter().map(|t| t.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
        let indices: Vec<usize> = split.chars.iter().map(|t| t.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_empty_input() {
        let split = Splitter::default().split_text("\n\t").unwrap();
        assert_eq!(split.word_count(), 0);
        assert_eq!(split.char_count(), 0);
    }

    #[test]
    fn test_chars_of_word() {
        let split = Splitter::default().split_text("hi there").unwrap();
        let chars: Vec<&str> = split.chars_of(2).map(Token::text).collect();
        assert_eq!(chars, vec!["t", "h", "e", "r", "e"]);
    }

    #[test]
    fn test_language_falls_back() {
        let split = Splitter::default().split_text("x").unwrap();
        assert_eq!(split.words[0].lang, FALLBACK_LANG);

        let options = SplitOptions {
            default_lang: Some("ko".to_string()),
            ..Default::default()
        };
        let split = Splitter::new(options).split_text("x").unwrap();
        assert_eq!(split.chars[0].lang, "ko");
    }
}
