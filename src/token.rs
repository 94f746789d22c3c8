//! Token representation for split text.
//!
//! A Token is one addressable unit of output: a word or a character. Its text
//! only grows through merges; its whitespace flag is fixed at creation.

use serde::{Deserialize, Serialize};

/// The granularity a token belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Word-level token
    #[default]
    Word,
    /// Character-level token (one grapheme cluster before merges)
    Char,
}

impl Role {
    /// Convert to a string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Word => "word",
            Role::Char => "char",
        }
    }
}

/// A single token produced by segmentation
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Token {
    /// Word or char
    pub role: Role,

    text: String,

    #[serde(rename = "whitespace")]
    is_whitespace: bool,

    /// Position among tokens of the same role, assigned once merging is done
    pub index: usize,

    /// Effective language tag of the leaf this token came from
    pub lang: String,

    /// Ordinal of the text leaf this token came from
    pub leaf: usize,

    /// Position of the owning word (char tokens only)
    pub word: Option<usize>,
}

impl Token {
    /// Create a token. A segment made of exactly one space is whitespace.
    pub fn new(role: Role, text: impl Into<String>, lang: impl Into<String>, leaf: usize) -> Self {
        let text = text.into();
        let is_whitespace = text == " ";
        Token {
            role,
            text,
            is_whitespace,
            index: 0,
            lang: lang.into(),
            leaf,
            word: None,
        }
    }

    /// Create a word token
    pub fn word(text: impl Into<String>, lang: impl Into<String>, leaf: usize) -> Self {
        Token::new(Role::Word, text, lang, leaf)
    }

    /// Create a char token belonging to the word at position `word`
    pub fn char(text: impl Into<String>, lang: impl Into<String>, leaf: usize, word: usize) -> Self {
        let mut token = Token::new(Role::Char, text, lang, leaf);
        token.word = Some(word);
        token
    }

    /// The token's current text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the token was created as a whitespace segment
    pub fn is_whitespace(&self) -> bool {
        self.is_whitespace
    }

    /// Whether the text is empty once trimmed. Such tokens never absorb
    /// neighbours and act as a hard boundary for merges.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub(crate) fn push_str(&mut self, s: &str) {
        self.text.push_str(s);
    }

    pub(crate) fn prepend(&mut self, s: &str) {
        self.text.insert_str(0, s);
    }

    pub(crate) fn set_text(&mut self, text: String) {
        self.text = text;
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}
