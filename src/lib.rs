//! # kinsoku-split
//!
//! Split marked-up text into ordered word and character tokens for per-token
//! styling or animation, without ever putting a token boundary where the
//! writing system forbids a line break.
//!
//! The pipeline masks runs that must stay whole (URLs, Latin words inside CJK
//! text, numbers), segments words and characters, then merges neighbours that
//! would violate line-start, line-end or inseparable-sequence rules.
//!
//! ## Quick Start
//!
//! ```rust
//! use kinsoku_split::Splitter;
//!
//! let split = Splitter::default().split_text("contact user@example.com now").unwrap();
//! assert_eq!(split.word_texts(), vec!["contact", " ", "user@example.com", " ", "now"]);
//!
//! let split = Splitter::default().split_text("「こんにちは」と言った。").unwrap();
//! assert_eq!(split.word_texts(), vec!["「こんにちは」", "と言った。"]);
//! ```
//!
//! ## Splitting a Markup Tree
//!
//! ```rust
//! use kinsoku_split::{Block, Element, Splitter};
//!
//! let tree = Element::new("p").with_attr("lang", "ja").with_text("吾輩は猫である。");
//! let original = tree.to_markup();
//!
//! let mut block = Block::new(tree);
//! let split = block.split(&Splitter::default()).unwrap();
//! assert_eq!(split.word_count(), 1);
//!
//! block.revert();
//! assert_eq!(block.tree().to_markup(), original);
//! ```

pub mod char_classes;
pub mod error;
pub mod list;
pub mod markup;
pub mod masker;
pub mod rules;
pub mod segmenter;
pub mod splitter;
pub mod token;

// Re-export main types for convenience
pub use error::{Result, SplitError};
pub use list::{TokenId, TokenList};
pub use markup::{Block, Element, Node, TreeMutator};
pub use masker::{mask, Fragment};
pub use segmenter::{Segmenter, TextLeaf, WordMode};
pub use splitter::{Split, SplitOptions, Splitter, FALLBACK_LANG};
pub use token::{Role, Token};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
