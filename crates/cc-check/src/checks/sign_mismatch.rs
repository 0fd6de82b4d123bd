//! Sign mismatch: dividing an `unsigned` by a signed `int` (or the
//! reverse) within the same file.

use crate::diagnostic::Diagnostic;
use cc_lex::{FileRegistry, TokenId, TokenStore};

#[derive(Clone, Copy, PartialEq)]
enum Sign {
    Unsigned,
    Signed,
}

fn is_ident(s: &str) -> bool {
    s.chars().next().is_some_and(|c| c == '_' || c.is_alphabetic())
}

fn loc(store: &TokenStore, id: TokenId, files: &FileRegistry) -> (String, u32) {
    let tok = store.get(id);
    (files.path(tok.file).to_string(), tok.line)
}

fn collect_declared_signs(store: &TokenStore) -> cc_util::FxHashMap<String, Sign> {
    let mut out = cc_util::FxHashMap::default();
    let mut cursor = store.first();
    while let Some(id) = cursor {
        let lex = store.lexeme(id);
        if lex == "unsigned" || lex == "int" {
            let sign = if lex == "unsigned" { Sign::Unsigned } else { Sign::Signed };
            let mut next = store.next(id);
            if lex == "unsigned" {
                if let Some(n) = next {
                    if store.lexeme(n) == "int" {
                        next = store.next(n);
                    }
                }
            }
            if let Some(name_id) = next {
                let name = store.lexeme(name_id);
                if is_ident(name) {
                    if let Some(term) = store.next(name_id) {
                        let term_lex = store.lexeme(term);
                        if term_lex == ";" || term_lex == "=" || term_lex == "," {
                            out.insert(name.to_string(), sign);
                        }
                    }
                }
            }
        }
        cursor = store.next(id);
    }
    out
}

pub fn check(store: &TokenStore, files: &FileRegistry) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    let signs = collect_declared_signs(store);
    let mut cursor = store.first();
    while let Some(id) = cursor {
        if store.lexeme(id) == "/" {
            if let (Some(lhs), Some(rhs)) = (store.prev(id), store.next(id)) {
                let lhs_lex = store.lexeme(lhs);
                let rhs_lex = store.lexeme(rhs);
                if let (Some(&ls), Some(&rs)) = (signs.get(lhs_lex), signs.get(rhs_lex)) {
                    if ls != rs {
                        let (file, line) = loc(store, id, files);
                        out.push(Diagnostic::new(
                            file,
                            line,
                            format!("comparison of '{lhs_lex}' and '{rhs_lex}' has mismatched signedness"),
                        ));
                    }
                }
            }
        }
        cursor = store.next(id);
    }
    out
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

    fn registry() -> FileRegistry {
        let mut r = FileRegistry::new();
        r.push("a.c");
        r
    }

    #[test]
    fn flags_mismatched_division() {
        let store = store_from(&[
            "unsigned", "a", ";", "int", "b", ";", "a", "/", "b", ";",
        ]);
        assert_eq!(check(&store, &registry()).len(), 1);
    }

    #[test]
    fn same_sign_division_is_not_flagged() {
        let store = store_from(&[
            "int", "a", ";", "int", "b", ";", "a", "/", "b", ";",
        ]);
        assert!(check(&store, &registry()).is_empty());
    }
}
