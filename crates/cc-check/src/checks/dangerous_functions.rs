//! Dangerous functions: `gets` is always unsafe; `scanf` with a bare
//! `"%s"` format has no bound either.

use crate::diagnostic::Diagnostic;
use cc_lex::{FileRegistry, TokenId, TokenStore};

fn loc(store: &TokenStore, id: TokenId, files: &FileRegistry) -> (String, u32) {
    let tok = store.get(id);
    (files.path(tok.file).to_string(), tok.line)
}

pub fn check(store: &TokenStore, files: &FileRegistry) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    let mut cursor = store.first();
    while let Some(id) = cursor {
        let lex = store.lexeme(id);
        if lex == "gets" {
            if let Some(open) = store.next(id) {
                if store.lexeme(open) == "(" {
                    let (file, line) = loc(store, id, files);
                    out.push(Diagnostic::new(file, line, "'gets' is always unsafe, use 'fgets' instead"));
                }
            }
        }
        if lex == "scanf" {
            if let Some(open) = store.next(id) {
                if store.lexeme(open) == "(" {
                    if let Some(fmt_id) = store.next(open) {
                        if store.lexeme(fmt_id) == "\"%s\"" {
                            let (file, line) = loc(store, id, files);
                            out.push(Diagnostic::new(
                                file,
                                line,
                                "'scanf' with an unbounded '%s' can overflow the destination buffer",
                            ));
                        }
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
    fn flags_gets() {
        let store = store_from(&["gets", "(", "buf", ")", ";"]);
        assert_eq!(check(&store, &registry()).len(), 1);
    }

    #[test]
    fn flags_scanf_percent_s() {
        let store = store_from(&["scanf", "(", "\"%s\"", ",", "buf", ")", ";"]);
        assert_eq!(check(&store, &registry()).len(), 1);
    }

    #[test]
    fn scanf_with_width_is_not_flagged() {
        let store = store_from(&["scanf", "(", "\"%9s\"", ",", "buf", ")", ";"]);
        assert!(check(&store, &registry()).is_empty());
    }
}
