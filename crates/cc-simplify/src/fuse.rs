//! Operator fusion: merges an adjacent pair of
//! punctuation tokens into the multi-character operator they spell, and
//! fuses an access specifier with a following `:` (`public:`).

use cc_lex::TokenStore;

const OPERATOR_PAIRS: &[(&str, &str, &str)] = &[
    ("=", "=", "=="),
    ("!", "=", "!="),
    ("<", "=", "<="),
    (">", "=", ">="),
    ("&", "&", "&&"),
    ("|", "|", "||"),
    ("<", "<", "<<"),
    (">", ">", ">>"),
    (":", ":", "::"),
    ("-", ">", "->"),
    ("+", "=", "+="),
    ("-", "=", "-="),
    ("*", "=", "*="),
    ("/", "=", "/="),
    ("&", "=", "&="),
    ("|", "=", "|="),
];

const ACCESS_SPECIFIERS: &[&str] = &["public", "private", "protected"];

fn fused_lexeme(a: &str, b: &str) -> Option<String> {
    if let Some((_, _, fused)) = OPERATOR_PAIRS.iter().find(|(x, y, _)| *x == a && *y == b) {
        return Some((*fused).to_string());
    }
    if b == ":" && ACCESS_SPECIFIERS.contains(&a) {
        return Some(format!("{a}:"));
    }
    None
}

/// Runs one full left-to-right scan, fusing every recognized adjacent
/// pair. Returns whether anything changed (the caller loops to a fixed
/// point).
pub fn fuse_operators(store: &mut TokenStore) -> bool {
    let mut changed = false;
    let mut cursor = store.first();
    while let Some(id) = cursor {
        let Some(next_id) = store.next(id) else {
            break;
        };
        let a = store.lexeme(id).to_string();
        let b = store.lexeme(next_id).to_string();
        if let Some(fused) = fused_lexeme(&a, &b) {
            store.get_mut(id).lexeme = fused;
            let after = store.next(next_id);
            store.erase_range(Some(id), after);
            changed = true;
            // Re-enter at `id` in case the fused token chains into the
            // one after it (e.g. nothing in the closed set does today,
            // but this keeps the pass correct if the set grows).
            cursor = Some(id);
        } else {
            cursor = Some(next_id);
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use cc_lex::FileId;

    fn store_from(lexemes: &[&str]) -> TokenStore {
        let mut store = TokenStore::new();
        for l in lexemes {
            store.create_at_end(*l, FileId::TOP_LEVEL, 1);
        }
        store
    }

    fn lexemes(store: &TokenStore) -> Vec<String> {
        store.iter().map(|id| store.lexeme(id).to_string()).collect()
    }

    #[test]
    fn fuses_equality_operator() {
        let mut store = store_from(&["a", "=", "=", "b"]);
        assert!(fuse_operators(&mut store));
        assert_eq!(lexemes(&store), vec!["a", "==", "b"]);
    }

    #[test]
    fn fuses_arrow_operator() {
        let mut store = store_from(&["p", "-", ">", "field"]);
        assert!(fuse_operators(&mut store));
        assert_eq!(lexemes(&store), vec!["p", "->", "field"]);
    }

    #[test]
    fn fuses_access_specifier_with_colon() {
        let mut store = store_from(&["public", ":", "int", "x", ";"]);
        assert!(fuse_operators(&mut store));
        assert_eq!(lexemes(&store)[0], "public:");
    }

    #[test]
    fn does_not_fuse_unrelated_pairs() {
        let mut store = store_from(&["a", "+", "b"]);
        assert!(!fuse_operators(&mut store));
        assert_eq!(lexemes(&store), vec!["a", "+", "b"]);
    }

    #[test]
    fn second_pass_is_a_fixed_point() {
        let mut store = store_from(&["a", "!", "=", "b"]);
        assert!(fuse_operators(&mut store));
        assert!(!fuse_operators(&mut store));
    }
}
