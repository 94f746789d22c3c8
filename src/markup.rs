//! Markup tree collaborator.
//!
//! The splitter itself only sees [`TextLeaf`]s and produces a [`Split`]. This
//! module supplies the tree side: a small element tree, the [`TreeMutator`]
//! contract the pipeline needs from any tree, and [`Block`], which ties a tree
//! to one split/revert lifecycle.

use crate::error::{Result, SplitError};
use crate::segmenter::TextLeaf;
use crate::splitter::{Split, Splitter};
use crate::token::Token;

/// Attribute set on a committed root
pub const SPLIT_MARKER: &str = "data-split";

/// A node of the markup tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Element with attributes and children
    Element(Element),
    /// Raw text leaf
    Text(String),
}

impl Node {
    fn write_markup(&self, out: &mut String) {
        match self {
            Node::Element(el) => el.write_markup(out),
            Node::Text(text) => escape_into(text, false, out),
        }
    }
}

/// An element of the markup tree
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    /// Tag name
    pub tag: String,
    /// Attributes in insertion order
    pub attrs: Vec<(String, String)>,
    /// Child nodes in document order
    pub children: Vec<Node>,
}

impl Element {
    /// Create an empty element
    pub fn new(tag: impl Into<String>) -> Self {
        Element {
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// Builder: add an attribute
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Builder: append a text child
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    /// Builder: append an element child
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    /// Get an attribute value
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set or replace an attribute
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attrs.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name, value)),
        }
    }

    /// Serialize to markup
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        self.write_markup(&mut out);
        out
    }

    fn write_markup(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        for (name, value) in &self.attrs {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            escape_into(value, true, out);
            out.push('"');
        }
        out.push('>');
        for child in &self.children {
            child.write_markup(out);
        }
        out.push_str("</");
        out.push_str(&self.tag);
        out.push('>');
    }

    /// Number of text leaves below this element
    pub fn leaf_count(&self) -> usize {
        self.children
            .iter()
            .map(|child| match child {
                Node::Text(_) => 1,
                Node::Element(el) => el.leaf_count(),
            })
            .sum()
    }

    /// Swap every text leaf for the nodes produced for it, keeping tree order.
    /// `replacements[i]` replaces the i-th leaf in document order.
    pub fn replace_leaves(&mut self, mut replacements: Vec<Vec<Node>>) {
        let mut counter = 0;
        replace_in(self, &mut counter, &mut replacements);
    }
}

fn replace_in(el: &mut Element, counter: &mut usize, replacements: &mut [Vec<Node>]) {
    let children = std::mem::take(&mut el.children);
    for child in children {
        match child {
            Node::Text(_) => {
                if let Some(nodes) = replacements.get_mut(*counter) {
                    el.children.append(nodes);
                }
                *counter += 1;
            }
            Node::Element(mut inner) => {
                replace_in(&mut inner, counter, replacements);
                el.children.push(Node::Element(inner));
            }
        }
    }
}

fn collect_leaves<'a>(el: &'a Element, inherited: &'a str, out: &mut Vec<TextLeaf>) {
    let lang = el.attr("lang").filter(|l| !l.is_empty()).unwrap_or(inherited);
    for child in &el.children {
        match child {
            Node::Text(text) => out.push(TextLeaf::new(text.as_str(), lang)),
            Node::Element(inner) => collect_leaves(inner, lang, out),
        }
    }
}

fn escape_into(text: &str, attr: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attr => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

/// Materialize a char token
pub fn wrap_char(ch: &Token) -> Node {
    Node::Element(
        Element::new("span")
            .with_attr("class", "char")
            .with_attr("data-char", ch.text())
            .with_attr("aria-hidden", "true")
            .with_attr("style", format!("--char-index:{}", ch.index))
            .with_text(ch.text()),
    )
}

/// Materialize a word token with its chars.
/// Non-whitespace words also get a duplicate for screen readers.
pub fn wrap_word(word: &Token, chars: &[&Token]) -> Node {
    let mut span = Element::new("span")
        .with_attr("class", "word")
        .with_attr("data-word", word.text())
        .with_attr("style", format!("--word-index:{}", word.index));
    span.children.extend(chars.iter().map(|ch| wrap_char(ch)));
    if !word.is_whitespace() {
        span = span.with_child(
            Element::new("span")
                .with_attr("class", "sr-only")
                .with_text(word.text()),
        );
    }
    Node::Element(span)
}

/// What the splitting pipeline needs from a markup tree
pub trait TreeMutator {
    /// Saved copy of the original content
    type Snapshot;

    /// Snapshot the content for a later [`TreeMutator::restore`]
    fn clone_subtree(&self) -> Self::Snapshot;

    /// Text leaves in depth-first order, each with its resolved language
    fn leaves(&self, default_lang: &str) -> Vec<TextLeaf>;

    /// Whether the tree already carries committed tokens
    fn is_split(&self) -> bool;

    /// Apply finished tokens to the tree. Every token is materialized, so the
    /// committed indices run without gaps up to the totals.
    fn commit(&mut self, split: &Split);

    /// Put the snapshot back, exactly
    fn restore(&mut self, snapshot: Self::Snapshot);
}

impl TreeMutator for Element {
    type Snapshot = Element;

    fn clone_subtree(&self) -> Element {
        self.clone()
    }

    fn leaves(&self, default_lang: &str) -> Vec<TextLeaf> {
        let mut out = Vec::new();
        collect_leaves(self, default_lang, &mut out);
        out
    }

    fn is_split(&self) -> bool {
        self.attr(SPLIT_MARKER).is_some()
    }

    fn commit(&mut self, split: &Split) {
        let mut chars_by_word: Vec<Vec<&Token>> = vec![Vec::new(); split.word_count()];
        for ch in &split.chars {
            if let Some(slot) = ch.word.and_then(|w| chars_by_word.get_mut(w)) {
                slot.push(ch);
            }
        }

        let mut replacements: Vec<Vec<Node>> = vec![Vec::new(); self.leaf_count()];
        for (word, chars) in split.words.iter().zip(&chars_by_word) {
            if let Some(slot) = replacements.get_mut(word.leaf) {
                slot.push(wrap_word(word, chars));
            }
        }
        self.replace_leaves(replacements);

        let totals = format!(
            "--word-total:{};--char-total:{}",
            split.word_count(),
            split.char_count()
        );
        let style = match self.attr("style") {
            Some(existing) if !existing.is_empty() => format!("{};{}", existing, totals),
            _ => totals,
        };
        self.set_attr("style", style);
        self.set_attr(SPLIT_MARKER, "true");
    }

    fn restore(&mut self, snapshot: Element) {
        *self = snapshot;
    }
}

/// A tree bound to one split/revert lifecycle
pub struct Block<T: TreeMutator = Element> {
    tree: T,
    snapshot: Option<T::Snapshot>,
    split: Option<Split>,
}

impl<T: TreeMutator> Block<T> {
    /// Wrap a tree
    pub fn new(tree: T) -> Self {
        Block {
            tree,
            snapshot: None,
            split: None,
        }
    }

    /// The current tree
    pub fn tree(&self) -> &T {
        &self.tree
    }

    /// Tokens of the last split, while it is committed
    pub fn tokens(&self) -> Option<&Split> {
        self.split.as_ref()
    }

    /// Whether the block is split
    pub fn is_split(&self) -> bool {
        self.snapshot.is_some() || self.tree.is_split()
    }

    /// Split the tree and commit the tokens.
    ///
    /// Fails with [`SplitError::AlreadySplit`] until [`Block::revert`] is
    /// called. On any error the tree is left untouched.
    pub fn split(&mut self, splitter: &Splitter) -> Result<&Split> {
        if self.is_split() {
            return Err(SplitError::AlreadySplit);
        }

        let leaves = self.tree.leaves(splitter.options().lang());
        let split = splitter.split_leaves(&leaves)?;

        self.snapshot = Some(self.tree.clone_subtree());
        self.tree.commit(&split);
        Ok(self.split.insert(split))
    }

    /// Restore the original content. Returns false if nothing was split.
    pub fn revert(&mut self) -> bool {
        match self.snapshot.take() {
            Some(snapshot) => {
                self.tree.restore(snapshot);
                self.split = None;
                true
            }
            None => false,
        }
    }

    /// Unwrap the tree
    pub fn into_inner(self) -> T {
        self.tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::splitter::SplitOptions;

    fn sample() -> Element {
        Element::new("p")
            .with_attr("lang", "ja")
            .with_text("「こんにちは")
            .with_child(Element::new("b").with_attr("lang", "en").with_text("world"))
            .with_text("」です。")
    }

    #[test]
    fn test_leaves_inherit_lang() {
        let leaves = sample().leaves("en");
        assert_eq!(
            leaves,
            vec![
                TextLeaf::new("「こんにちは", "ja"),
                TextLeaf::new("world", "en"),
                TextLeaf::new("」です。", "ja"),
            ]
        );

        let plain = Element::new("div").with_text("x");
        assert_eq!(plain.leaves("fr")[0].lang, "fr");
    }

    #[test]
    fn test_markup_escaping() {
        let el = Element::new("p")
            .with_attr("title", "a \"b\" & c")
            .with_text("1 < 2 & 3 > 2");
        assert_eq!(
            el.to_markup(),
            "<p title=\"a &quot;b&quot; &amp; c\">1 &lt; 2 &amp; 3 &gt; 2</p>"
        );
    }

    #[test]
    fn test_commit_marks_root() {
        let mut block = Block::new(Element::new("p").with_text("hi you"));
        block.split(&Splitter::default()).unwrap();

        let tree = block.tree();
        assert_eq!(tree.attr(SPLIT_MARKER), Some("true"));
        assert_eq!(tree.attr("style"), Some("--word-total:3;--char-total:6"));
        assert_eq!(tree.children.len(), 3);
        assert!(tree.to_markup().contains("<span class=\"sr-only\">hi</span>"));
        assert!(!tree.to_markup().contains("<span class=\"sr-only\"> </span>"));
        assert!(tree.to_markup().contains(
            "<span class=\"char\" data-char=\"y\" aria-hidden=\"true\" style=\"--char-index:3\">y</span>"
        ));

        let Node::Element(space) = &tree.children[1] else {
            panic!("expected the space to be wrapped");
        };
        assert_eq!(space.attr("data-word"), Some(" "));
        assert_eq!(space.attr("style"), Some("--word-index:1"));
        assert_eq!(space.children.len(), 1);
    }

    fn collect_styles(el: &Element, prefix: &str, out: &mut Vec<usize>) {
        if let Some(n) = el
            .attr("style")
            .and_then(|style| style.strip_prefix(prefix))
            .and_then(|n| n.parse().ok())
        {
            out.push(n);
        }
        for child in &el.children {
            if let Node::Element(inner) = child {
                collect_styles(inner, prefix, out);
            }
        }
    }

    #[test]
    fn test_committed_indices_have_no_gaps() {
        let mut block = Block::new(sample().with_text(" and  more\twords "));
        let (words, chars) = {
            let split = block.split(&Splitter::default()).unwrap();
            (split.word_count(), split.char_count())
        };

        let mut word_indices = Vec::new();
        collect_styles(block.tree(), "--word-index:", &mut word_indices);
        assert_eq!(word_indices, (0..words).collect::<Vec<_>>());

        let mut char_indices = Vec::new();
        collect_styles(block.tree(), "--char-index:", &mut char_indices);
        assert_eq!(char_indices, (0..chars).collect::<Vec<_>>());
    }

    #[test]
    fn test_commit_keeps_nesting() {
        let mut block = Block::new(sample());
        let split = block.split(&Splitter::default()).unwrap();
        assert_eq!(split.word_texts(), vec!["「こんにちは", "world」", "です。"]);

        let tree = block.tree();
        let Node::Element(bold) = &tree.children[1] else {
            panic!("expected <b> to survive");
        };
        assert_eq!(bold.tag, "b");
        let Node::Element(word) = &bold.children[0] else {
            panic!("expected a word span");
        };
        assert_eq!(word.attr("data-word"), Some("world」"));
    }

    #[test]
    fn test_round_trip() {
        let original = sample();
        let markup = original.to_markup();

        for concat_char in [false, true] {
            let options = SplitOptions {
                concat_char,
                ..Default::default()
            };
            let mut block = Block::new(original.clone());
            block.split(&Splitter::new(options)).unwrap();
            assert_ne!(block.tree().to_markup(), markup);

            assert!(block.revert());
            assert_eq!(block.tree().to_markup(), markup);
            assert!(block.tokens().is_none());
        }
    }

    #[test]
    fn test_split_twice_is_an_error() {
        let mut block = Block::new(sample());
        let splitter = Splitter::default();
        block.split(&splitter).unwrap();
        assert!(matches!(block.split(&splitter), Err(SplitError::AlreadySplit)));

        assert!(block.revert());
        assert!(!block.revert());
        assert!(block.split(&splitter).is_ok());
    }

    #[test]
    fn test_committed_tree_is_detected() {
        let mut block = Block::new(sample());
        block.split(&Splitter::default()).unwrap();

        let mut again = Block::new(block.into_inner());
        assert!(again.is_split());
        assert!(matches!(
            again.split(&Splitter::default()),
            Err(SplitError::AlreadySplit)
        ));
        assert!(!again.revert());
    }
}
