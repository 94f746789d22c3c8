//! Line-breaking consolidation ("kinsoku").
//!
//! Merges adjacent tokens so that no token boundary falls where a line break
//! is prohibited:
//!
//! 1. [`absorb_line_start`]: a token starting with a line-start prohibited
//!    character is appended to the token before it.
//! 2. [`attach_line_end`]: a run of tokens ending with line-end prohibited
//!    characters is prepended to the token after it.
//! 3. [`join_inseparable`]: adjacent inseparable characters (dashes, leaders)
//!    are joined.
//! 4. [`refresh_words`]: after consolidating chars, word texts are rebuilt
//!    from their chars and emptied words are dropped.
//!
//! Blank tokens (empty once trimmed) never take part in a merge, so spacing
//! between words is never swallowed.
//!
//! Every pass walks the list by [`TokenId`] and picks its next position from
//! the live links after each unlink, so removal during the scan never skips
//! or repeats a token.

use log::trace;

use crate::char_classes::{
    first_grapheme, is_inseparable, is_line_end_prohibited, is_line_start_prohibited,
    last_grapheme,
};
use crate::error::Result;
use crate::list::{TokenId, TokenList};
use crate::token::Token;

fn starts_line_start_prohibited(token: &Token) -> bool {
    first_grapheme(token.text()).is_some_and(is_line_start_prohibited)
}

fn ends_line_end_prohibited(token: &Token) -> bool {
    last_grapheme(token.text()).is_some_and(is_line_end_prohibited)
}

/// Run the merge passes in order. Returns the number of merges.
pub fn consolidate(list: &mut TokenList) -> Result<usize> {
    let mut merges = absorb_line_start(list)?;
    merges += attach_line_end(list)?;
    merges += join_inseparable(list)?;
    Ok(merges)
}

/// Append every token that starts with a line-start prohibited grapheme to
/// the non-blank token before it.
///
/// After a merge the scan resumes at the token now following the anchor, so
/// consecutive prohibited tokens cascade into the same anchor.
pub fn absorb_line_start(list: &mut TokenList) -> Result<usize> {
    let mut merges = 0;
    let mut cursor = list.first();

    while let Some(id) = cursor {
        let token = list.get(id)?;
        let anchor = match list.prev(id)? {
            Some(prev)
                if !token.is_blank()
                    && starts_line_start_prohibited(token)
                    && !list.get(prev)?.is_blank() =>
            {
                Some(prev)
            }
            _ => None,
        };

        match anchor {
            Some(anchor) => {
                let absorbed = list.unlink(id)?;
                let target = list.get_mut(anchor)?;
                trace!("line start: {:?} <- {:?}", target.text(), absorbed.text());
                target.push_str(absorbed.text());
                merges += 1;
                cursor = list.next(anchor)?;
            }
            None => cursor = list.next(id)?,
        }
    }

    Ok(merges)
}

/// Collapse each run of tokens ending with a line-end prohibited grapheme
/// into one token, then prepend that run to the following token unless it
/// is blank.
pub fn attach_line_end(list: &mut TokenList) -> Result<usize> {
    let mut merges = 0;
    let mut cursor = list.first();

    while let Some(id) = cursor {
        let token = list.get(id)?;
        if token.is_blank() || !ends_line_end_prohibited(token) {
            cursor = list.next(id)?;
            continue;
        }

        while let Some(next) = list.next(id)? {
            let follower = list.get(next)?;
            if follower.is_blank() || !ends_line_end_prohibited(follower) {
                break;
            }
            let follower = list.unlink(next)?;
            let run = list.get_mut(id)?;
            trace!("line end run: {:?} <- {:?}", run.text(), follower.text());
            run.push_str(follower.text());
            merges += 1;
        }

        cursor = match next_non_blank(list, id)? {
            Some(next) => {
                let run = list.unlink(id)?;
                let target = list.get_mut(next)?;
                trace!("line end: {:?} -> {:?}", run.text(), target.text());
                target.prepend(run.text());
                merges += 1;
                Some(next)
            }
            None => list.next(id)?,
        };
    }

    Ok(merges)
}

/// The token right after `id`, if there is one and it is not blank
fn next_non_blank(list: &TokenList, id: TokenId) -> Result<Option<TokenId>> {
    match list.next(id)? {
        Some(next) if !list.get(next)?.is_blank() => Ok(Some(next)),
        _ => Ok(None),
    }
}

/// Join neighbours where one ends and the next starts with an inseparable
/// character.
pub fn join_inseparable(list: &mut TokenList) -> Result<usize> {
    let mut merges = 0;
    let mut cursor = list.first();

    while let Some(id) = cursor {
        let tail = last_grapheme(list.get(id)?.text()).is_some_and(is_inseparable);
        match list.next(id)? {
            Some(next)
                if tail && first_grapheme(list.get(next)?.text()).is_some_and(is_inseparable) =>
            {
                let absorbed = list.unlink(next)?;
                let target = list.get_mut(id)?;
                trace!("inseparable: {:?} <- {:?}", target.text(), absorbed.text());
                target.push_str(absorbed.text());
                merges += 1;
            }
            next => cursor = next,
        }
    }

    Ok(merges)
}

/// Rebuild word texts from consolidated chars.
///
/// A char carries the text it absorbed into its own word, so a word whose
/// chars all moved away ends up empty and is dropped. Surviving chars are
/// re-pointed at the compacted word positions. Returns the number of words
/// removed.
pub fn refresh_words(words: &mut TokenList, chars: &mut TokenList) -> Result<usize> {
    let mut texts = vec![String::new(); words.len()];
    for ch in chars.iter() {
        if let Some(text) = ch.word.and_then(|w| texts.get_mut(w)) {
            text.push_str(ch.text());
        }
    }

    let mut remap = vec![None; texts.len()];
    let mut removed = 0;
    let mut cursor = words.first();
    for (pos, text) in texts.into_iter().enumerate() {
        let Some(id) = cursor else { break };
        cursor = words.next(id)?;
        if text.is_empty() {
            let word = words.unlink(id)?;
            trace!("dropping emptied word {:?}", word.text());
            removed += 1;
        } else {
            words.get_mut(id)?.set_text(text);
            remap[pos] = Some(pos - removed);
        }
    }

    let mut cursor = chars.first();
    while let Some(id) = cursor {
        let ch = chars.get_mut(id)?;
        ch.word = ch.word.and_then(|w| remap.get(w).copied().flatten());
        cursor = chars.next(id)?;
    }

    Ok(removed)
}
