//! Token store: an arena of tokens with O(1) append, insert-after and
//! erase-range, and cursors that stay valid across edits that don't target
//! them.
//!
//! The original keeps tokens as a heap-allocated singly-linked list with
//! manual `delete`. Here the arena lives in a [`cc_util::IndexVec`] and
//! splicing is index manipulation: erasing a run of tokens tombstones their
//! slots and relinks `prev`/`next` around the gap, so a [`TokenId`] a
//! checker is holding onto never dangles and never gets reused for
//! something else.

use cc_util::{define_idx, FileId, IndexVec};

define_idx!(TokenId);

/// A single lexical token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    /// The exact text of the token (quotes preserved for string/char literals).
    pub lexeme: String,
    /// Which file this token came from; index 0 is always the top-level input.
    pub file: FileId,
    /// 1-based line number within `file`.
    pub line: u32,
    /// Identifier number assigned by the function index, if any.
    pub ident_num: Option<u32>,
}

impl Token {
    pub fn new(lexeme: impl Into<String>, file: FileId, line: u32) -> Self {
        Self {
            lexeme: lexeme.into(),
            file,
            line,
            ident_num: None,
        }
    }
}

#[derive(Clone)]
struct Node {
    token: Option<Token>,
    prev: Option<TokenId>,
    next: Option<TokenId>,
}

/// Owns every token produced for a translation unit (and its includes).
///
/// Position in the chain, not position in the backing arena, is the
/// sequence order — the arena only ever grows; erased slots are tombstoned
/// in place so existing [`TokenId`]s remain valid pointers to "the token
/// that used to be here" and traversal simply steps over them.
#[derive(Clone)]
pub struct TokenStore {
    nodes: IndexVec<TokenId, Node>,
    head: Option<TokenId>,
    tail: Option<TokenId>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self {
            nodes: IndexVec::new(),
            head: None,
            tail: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// The first live token, if any.
    pub fn first(&self) -> Option<TokenId> {
        self.head
    }

    /// The token immediately after `cursor`, skipping nothing — erased
    /// slots are never linked into the chain so this is always O(1).
    pub fn next(&self, cursor: TokenId) -> Option<TokenId> {
        self.nodes.get(cursor).and_then(|n| n.next)
    }

    pub fn prev(&self, cursor: TokenId) -> Option<TokenId> {
        self.nodes.get(cursor).and_then(|n| n.prev)
    }

    /// Borrow the token at `cursor`. Panics if `cursor` has been erased —
    /// callers are expected to have already stepped off it via [`next`]/
    /// [`prev`] before the erase that removed it.
    pub fn get(&self, cursor: TokenId) -> &Token {
        self.nodes
            .get(cursor)
            .and_then(|n| n.token.as_ref())
            .expect("TokenId referred to an erased or unknown token")
    }

    pub fn get_mut(&mut self, cursor: TokenId) -> &mut Token {
        self.nodes
            .get_mut(cursor)
            .and_then(|n| n.token.as_mut())
            .expect("TokenId referred to an erased or unknown token")
    }

    /// Appends a new token at the tail of the chain.
    pub fn create_at_end(&mut self, lexeme: impl Into<String>, file: FileId, line: u32) -> TokenId {
        let id = self.nodes.push(Node {
            token: Some(Token::new(lexeme, file, line)),
            prev: self.tail,
            next: None,
        });
        match self.tail {
            Some(tail) => self.nodes[tail].next = Some(id),
            None => self.head = Some(id),
        }
        self.tail = Some(id);
        id
    }

    /// Inserts a new token immediately after `cursor`, returning its id.
    pub fn insert_after(&mut self, cursor: TokenId, lexeme: impl Into<String>) -> TokenId {
        let (file, line) = {
            let t = self.get(cursor);
            (t.file, t.line)
        };
        let after = self.nodes[cursor].next;
        let id = self.nodes.push(Node {
            token: Some(Token::new(lexeme, file, line)),
            prev: Some(cursor),
            next: after,
        });
        self.nodes[cursor].next = Some(id);
        match after {
            Some(next) => self.nodes[next].prev = Some(id),
            None => self.tail = Some(id),
        }
        id
    }

    /// Erases the interior strictly between `begin_after` and `end_before`,
    /// releasing every lexeme in that run. `begin_after`/`end_before`
    /// themselves survive. Either bound may be `None` to mean "the edge of
    /// the chain" so a prefix or suffix can be erased too.
    pub fn erase_range(&mut self, begin_after: Option<TokenId>, end_before: Option<TokenId>) {
        let mut cursor = match begin_after {
            Some(b) => self.nodes[b].next,
            None => self.head,
        };
        while let Some(id) = cursor {
            if Some(id) == end_before {
                break;
            }
            let next = self.nodes[id].next;
            self.nodes[id].token = None;
            self.nodes[id].prev = None;
            self.nodes[id].next = None;
            cursor = next;
        }
        match begin_after {
            Some(b) => self.nodes[b].next = end_before,
            None => self.head = end_before,
        }
        match end_before {
            Some(e) => self.nodes[e].prev = begin_after,
            None => self.tail = begin_after,
        }
    }

    /// Iterates live tokens from `cursor` (inclusive) to the end of the chain.
    pub fn iter_from(&self, cursor: TokenId) -> impl Iterator<Item = TokenId> + '_ {
        let mut next = Some(cursor);
        std::iter::from_fn(move || {
            let current = next?;
            next = self.next(current);
            Some(current)
        })
    }

    /// Iterates every live token from the head.
    pub fn iter(&self) -> impl Iterator<Item = TokenId> + '_ {
        let mut next = self.head;
        std::iter::from_fn(move || {
            let current = next?;
            next = self.next(current);
            Some(current)
        })
    }

    pub fn lexeme(&self, cursor: TokenId) -> &str {
        &self.get(cursor).lexeme
    }
}

impl Default for TokenStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(lexemes: &[&str]) -> (TokenStore, Vec<TokenId>) {
        let mut store = TokenStore::new();
        let ids = lexemes
            .iter()
            .map(|l| store.create_at_end(*l, FileId::TOP_LEVEL, 1))
            .collect();
        (store, ids)
    }

    #[test]
    fn append_and_iterate_preserves_order() {
        let (store, ids) = store_with(&["int", "x", ";"]);
        let collected: Vec<_> = store.iter().map(|id| store.lexeme(id).to_string()).collect();
        assert_eq!(collected, vec!["int", "x", ";"]);
        assert_eq!(store.first(), Some(ids[0]));
    }

    #[test]
    fn insert_after_splices_in_order() {
        let (mut store, ids) = store_with(&["int", ";"]);
        let new_id = store.insert_after(ids[0], "x");
        let collected: Vec<_> = store.iter().map(|id| store.lexeme(id).to_string()).collect();
        assert_eq!(collected, vec!["int", "x", ";"]);
        assert_eq!(store.next(ids[0]), Some(new_id));
        assert_eq!(store.next(new_id), Some(ids[1]));
    }

    #[test]
    fn erase_range_removes_interior_and_keeps_bounds() {
        let (mut store, ids) = store_with(&["a", "b", "c", "d"]);
        store.erase_range(Some(ids[0]), Some(ids[3]));
        let collected: Vec<_> = store.iter().map(|id| store.lexeme(id).to_string()).collect();
        assert_eq!(collected, vec!["a", "d"]);
        assert_eq!(store.next(ids[0]), Some(ids[3]));
        assert_eq!(store.prev(ids[3]), Some(ids[0]));
    }

    #[test]
    fn erase_prefix_with_no_lower_bound() {
        let (mut store, ids) = store_with(&["a", "b", "c"]);
        store.erase_range(None, Some(ids[2]));
        let collected: Vec<_> = store.iter().map(|id| store.lexeme(id).to_string()).collect();
        assert_eq!(collected, vec!["c"]);
        assert_eq!(store.first(), Some(ids[2]));
    }

    #[test]
    fn erase_suffix_with_no_upper_bound() {
        let (mut store, ids) = store_with(&["a", "b", "c"]);
        store.erase_range(Some(ids[0]), None);
        let collected: Vec<_> = store.iter().map(|id| store.lexeme(id).to_string()).collect();
        assert_eq!(collected, vec!["a"]);
    }

    #[test]
    fn cursor_outside_erased_range_stays_valid() {
        let (mut store, ids) = store_with(&["a", "b", "c", "d", "e"]);
        let outside = ids[4];
        store.erase_range(Some(ids[0]), Some(ids[2]));
        assert_eq!(store.lexeme(outside), "e");
    }
}
