//! Atom compilation and evaluation.

use cc_lex::{TokenId, TokenStore};

/// One placeholder or literal in a compiled pattern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Atom {
    /// `var` — first character is `_` or alphabetic.
    Var,
    /// `type` — same rule as `Var`; callers, not the matcher, distinguish
    /// a type name from a variable name.
    Type,
    /// `num` — first character is a decimal digit.
    Num,
    /// `a|b|c`. `negate` is set when one of the alternatives was empty
    /// (`a|b|`), meaning "match any lexeme not in this list".
    Alt { options: Vec<String>, negate: bool },
    /// An exact, byte-for-byte lexeme match.
    Literal(String),
}

impl Atom {
    fn matches(&self, lexeme: &str) -> bool {
        match self {
            Atom::Var | Atom::Type => lexeme
                .chars()
                .next()
                .is_some_and(|c| c == '_' || c.is_alphabetic()),
            Atom::Num => lexeme.chars().next().is_some_and(|c| c.is_ascii_digit()),
            Atom::Alt { options, negate } => {
                let found = options.iter().any(|o| o == lexeme);
                found != *negate
            }
            Atom::Literal(text) => text == lexeme,
        }
    }
}

/// A compiled sequence of atoms.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Pattern(Vec<Atom>);

impl Pattern {
    pub fn atoms(&self) -> &[Atom] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Compiles a whitespace-separated pattern string into a [`Pattern`], once,
/// at load time.
pub fn compile(pattern: &str) -> Pattern {
    Pattern(pattern.split_whitespace().map(compile_atom).collect())
}

fn compile_atom(text: &str) -> Atom {
    if text == "var" {
        return Atom::Var;
    }
    if text == "type" {
        return Atom::Type;
    }
    if text == "num" {
        return Atom::Num;
    }
    if text.contains('|') {
        let mut negate = false;
        let mut options = Vec::new();
        for part in text.split('|') {
            if part.is_empty() {
                negate = true;
            } else {
                options.push(part.to_string());
            }
        }
        return Atom::Alt { options, negate };
    }
    Atom::Literal(text.to_string())
}

/// Tests whether `pattern` matches starting at `start` (inclusive). Returns
/// `true` iff every atom matches the corresponding token in sequence; the
/// cursor itself is never advanced by the matcher — the caller advances by
/// `pattern.len()` steps on success.
pub fn matches_from(store: &TokenStore, start: TokenId, pattern: &Pattern) -> bool {
    let mut cursor = Some(start);
    for atom in pattern.atoms() {
        let Some(id) = cursor else { return false };
        if !atom.matches(store.lexeme(id)) {
            return false;
        }
        cursor = store.next(id);
    }
    true
}

/// Fetches the lexeme `n` steps ahead of `cursor` without advancing
/// anything. Out-of-range requests return an empty string, never panic.
pub fn peek(store: &TokenStore, cursor: TokenId, n: usize) -> String {
    let mut current = Some(cursor);
    for _ in 0..n {
        current = current.and_then(|id| store.next(id));
        if current.is_none() {
            return String::new();
        }
    }
    match current {
        Some(id) => store.lexeme(id).to_string(),
        None => String::new(),
    }
}
