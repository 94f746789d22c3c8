//! Ordered token container.
//!
//! Tokens live in an arena and are chained as a doubly-linked list, so a pass
//! can unlink the token it is looking at (or its neighbour) in O(1) while
//! keeping every other `TokenId` valid. Unlinked slots are tombstoned; touching
//! one again is reported as [`SplitError::StaleToken`] instead of silently
//! reading the wrong token.

use crate::error::{Result, SplitError};
use crate::token::Token;

/// Stable handle to a token inside a [`TokenList`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TokenId(usize);

#[derive(Debug, Clone)]
struct Slot {
    token: Token,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Ordered sequence of tokens of one granularity
#[derive(Debug, Clone, Default)]
pub struct TokenList {
    slots: Vec<Option<Slot>>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl TokenList {
    /// Create an empty list
    pub fn new() -> Self {
        TokenList::default()
    }

    /// Number of linked tokens
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append a token at the end
    pub fn push(&mut self, token: Token) -> TokenId {
        let idx = self.slots.len();
        self.slots.push(Some(Slot {
            token,
            prev: self.tail,
            next: None,
        }));
        match self.tail {
            Some(tail) => {
                if let Some(slot) = self.slots[tail].as_mut() {
                    slot.next = Some(idx);
                }
            }
            None => self.head = Some(idx),
        }
        self.tail = Some(idx);
        self.len += 1;
        TokenId(idx)
    }

    /// Insert a token so that it ends up at position `index`.
    /// An index at or past the end appends.
    pub fn insert(&mut self, index: usize, token: Token) -> TokenId {
        let Some(TokenId(at)) = self.id_at(index) else {
            return self.push(token);
        };
        let idx = self.slots.len();
        let prev = self.slots[at].as_ref().and_then(|slot| slot.prev);
        self.slots.push(Some(Slot {
            token,
            prev,
            next: Some(at),
        }));
        if let Some(slot) = self.slots[at].as_mut() {
            slot.prev = Some(idx);
        }
        match prev {
            Some(p) => {
                if let Some(slot) = self.slots[p].as_mut() {
                    slot.next = Some(idx);
                }
            }
            None => self.head = Some(idx),
        }
        self.len += 1;
        TokenId(idx)
    }

    /// Remove the token at position `index`
    pub fn remove(&mut self, index: usize) -> Option<Token> {
        let id = self.id_at(index)?;
        self.unlink(id).ok()
    }

    /// Handle of the token at position `index`
    pub fn id_at(&self, index: usize) -> Option<TokenId> {
        let mut cursor = self.head;
        for _ in 0..index {
            cursor = self.slots[cursor?].as_ref()?.next;
        }
        cursor.map(TokenId)
    }

    /// First token
    pub fn first(&self) -> Option<TokenId> {
        self.head.map(TokenId)
    }

    /// Last token
    pub fn last(&self) -> Option<TokenId> {
        self.tail.map(TokenId)
    }

    fn slot(&self, id: TokenId) -> Result<&Slot> {
        self.slots
            .get(id.0)
            .and_then(Option::as_ref)
            .ok_or(SplitError::StaleToken(id))
    }

    /// Token following `id`
    pub fn next(&self, id: TokenId) -> Result<Option<TokenId>> {
        Ok(self.slot(id)?.next.map(TokenId))
    }

    /// Token preceding `id`
    pub fn prev(&self, id: TokenId) -> Result<Option<TokenId>> {
        Ok(self.slot(id)?.prev.map(TokenId))
    }

    /// Borrow a linked token
    pub fn get(&self, id: TokenId) -> Result<&Token> {
        Ok(&self.slot(id)?.token)
    }

    /// Mutably borrow a linked token
    pub fn get_mut(&mut self, id: TokenId) -> Result<&mut Token> {
        self.slots
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .map(|slot| &mut slot.token)
            .ok_or(SplitError::StaleToken(id))
    }

    /// Detach a token and hand it back. Its id becomes stale.
    pub fn unlink(&mut self, id: TokenId) -> Result<Token> {
        let slot = self
            .slots
            .get_mut(id.0)
            .and_then(Option::take)
            .ok_or(SplitError::StaleToken(id))?;

        match slot.prev {
            Some(p) => {
                if let Some(prev) = self.slots[p].as_mut() {
                    prev.next = slot.next;
                }
            }
            None => self.head = slot.next,
        }
        match slot.next {
            Some(n) => {
                if let Some(next) = self.slots[n].as_mut() {
                    next.prev = slot.prev;
                }
            }
            None => self.tail = slot.prev,
        }
        self.len -= 1;
        Ok(slot.token)
    }

    /// Iterate tokens in order
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            list: self,
            cursor: self.head,
        }
    }

    /// Concatenation of every token's text, in order
    pub fn concat(&self) -> String {
        self.iter().map(Token::text).collect()
    }

    /// Texts of every token, in order
    pub fn texts(&self) -> Vec<&str> {
        self.iter().map(Token::text).collect()
    }

    /// Consume the list, yielding tokens in order
    pub fn into_vec(mut self) -> Vec<Token> {
        let mut out = Vec::with_capacity(self.len);
        let mut cursor = self.head;
        while let Some(idx) = cursor {
            match self.slots[idx].take() {
                Some(slot) => {
                    cursor = slot.next;
                    out.push(slot.token);
                }
                None => break,
            }
        }
        out
    }
}

impl FromIterator<Token> for TokenList {
    fn from_iter<I: IntoIterator<Item = Token>>(iter: I) -> Self {
        let mut list = TokenList::new();
        for token in iter {
            list.push(token);
        }
        list
    }
}

/// In-order iterator over a [`TokenList`]
pub struct Iter<'a> {
    list: &'a TokenList,
    cursor: Option<usize>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Token;

    fn next(&mut self) -> Option<Self::Item> {
        let slot = self.list.slots.get(self.cursor?)?.as_ref()?;
        self.cursor = slot.next;
        Some(&slot.token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(texts: &[&str]) -> TokenList {
        texts.iter().map(|t| Token::word(*t, "en", 0)).collect()
    }

    #[test]
    fn test_push_and_order() {
        let list = list(&["a", "b", "c"]);
        assert_eq!(list.len(), 3);
        assert_eq!(list.texts(), vec!["a", "b", "c"]);
        assert_eq!(list.concat(), "abc");
    }

    #[test]
    fn test_index_insert_and_remove() {
        let mut list = list(&["a", "c"]);
        list.insert(1, Token::word("b", "en", 0));
        list.insert(0, Token::word("_", "en", 0));
        list.insert(99, Token::word("d", "en", 0));
        assert_eq!(list.texts(), vec!["_", "a", "b", "c", "d"]);

        let removed = list.remove(2).unwrap();
        assert_eq!(removed.text(), "b");
        assert_eq!(list.texts(), vec!["_", "a", "c", "d"]);
        assert!(list.remove(10).is_none());
    }

    #[test]
    fn test_unlink_keeps_other_ids_valid() {
        let mut list = list(&["a", "b", "c", "d"]);
        let a = list.first().unwrap();
        let b = list.next(a).unwrap().unwrap();
        let c = list.next(b).unwrap().unwrap();
        let d = list.last().unwrap();

        list.unlink(b).unwrap();
        list.unlink(d).unwrap();

        assert_eq!(list.next(a).unwrap(), Some(c));
        assert_eq!(list.prev(c).unwrap(), Some(a));
        assert_eq!(list.last(), Some(c));
        assert_eq!(list.get(c).unwrap().text(), "c");
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_stale_id_is_an_error() {
        let mut list = list(&["a", "b"]);
        let a = list.first().unwrap();
        list.unlink(a).unwrap();

        assert!(matches!(list.unlink(a), Err(SplitError::StaleToken(_))));
        assert!(matches!(list.get(a), Err(SplitError::StaleToken(_))));
        assert!(list.next(a).is_err());
        assert_eq!(list.texts(), vec!["b"]);
    }

    #[test]
    fn test_unlink_everything() {
        let mut list = list(&["a", "b"]);
        while let Some(id) = list.first() {
            list.unlink(id).unwrap();
        }
        assert!(list.is_empty());
        assert_eq!(list.last(), None);
        assert!(list.into_vec().is_empty());
    }

    #[test]
    fn test_into_vec_follows_links() {
        let mut list = list(&["a", "b", "c"]);
        list.remove(0);
        list.push(Token::word("d", "en", 0));
        let texts: Vec<String> = list.into_vec().iter().map(|t| t.text().to_string()).collect();
        assert_eq!(texts, vec!["b", "c", "d"]);
    }
}
