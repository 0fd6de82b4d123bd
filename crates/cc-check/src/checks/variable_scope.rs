//! Variable scope (style): a local declared at function scope whose
//! every use sits inside one inner `{ }` block could be declared there
//! instead, narrowing its lifetime.

use crate::diagnostic::Diagnostic;
use cc_lex::{FileRegistry, TokenId, TokenStore};

fn is_ident(s: &str) -> bool {
    s.chars().next().is_some_and(|c| c == '_' || c.is_alphabetic())
}

fn loc(store: &TokenStore, id: TokenId, files: &FileRegistry) -> (String, u32) {
    let tok = store.get(id);
    (files.path(tok.file).to_string(), tok.line)
}

const PRIMITIVE_TYPES: &[&str] = &["char", "int", "double"];

/// Finds `T name ;` declarations sitting directly at `depth` (the function's
/// own body, not inside any nested block), between `open` and `close`.
fn find_top_level_decls(store: &TokenStore, open: TokenId, close: TokenId) -> Vec<(String, TokenId, TokenId)> {
    let mut decls = Vec::new();
    let mut depth = 0i64;
    let mut cursor = store.next(open);
    while let Some(id) = cursor {
        if id == close {
            break;
        }
        let lex = store.lexeme(id);
        if depth == 0 && PRIMITIVE_TYPES.contains(&lex) {
            if let Some(name_id) = store.next(id) {
                let name = store.lexeme(name_id);
                if is_ident(name) {
                    if let Some(term) = store.next(name_id) {
                        if store.lexeme(term) == ";" {
                            decls.push((name.to_string(), id, term));
                        }
                    }
                }
            }
        }
        match lex {
            "{" => depth += 1,
            "}" => depth -= 1,
            _ => {}
        }
        cursor = store.next(id);
    }
    decls
}

/// Scans uses of `name` starting just after `after`, stopping at `close`.
fn all_uses_within_one_inner_block(store: &TokenStore, after: TokenId, close: TokenId, name: &str) -> bool {
    let mut depth = 0i64;
    let mut saw_use = false;
    let mut ever_at_top = false;
    let mut cursor = store.next(after);
    while let Some(id) = cursor {
        if id == close {
            break;
        }
        let lex = store.lexeme(id);
        match lex {
            "{" => depth += 1,
            "}" => depth -= 1,
            _ => {}
        }
        if lex == name {
            saw_use = true;
            if depth == 0 {
                ever_at_top = true;
            }
        }
        cursor = store.next(id);
    }
    saw_use && !ever_at_top
}

pub fn check(store: &TokenStore, files: &FileRegistry) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    let functions = cc_simplify::build_function_index(store);
    for name in functions.names() {
        let Some(open) = functions.lookup(name) else { continue };
        let Some(close) = matching_close(store, open) else { continue };
        for (var, decl_id, semi_id) in find_top_level_decls(store, open, close) {
            if all_uses_within_one_inner_block(store, semi_id, close, &var) {
                let (file, line) = loc(store, decl_id, files);
                out.push(Diagnostic::new(
                    file,
                    line,
                    format!("the scope of variable '{var}' can be reduced"),
                ));
            }
        }
    }
    out
}

fn matching_close(store: &TokenStore, open: TokenId) -> Option<TokenId> {
    let mut depth = 0i64;
    let mut cursor = Some(open);
    while let Some(id) = cursor {
        match store.lexeme(id) {
            "{" => depth += 1,
            "}" => {
                depth -= 1;
                if depth == 0 {
                    return Some(id);
                }
            }
            _ => {}
        }
        cursor = store.next(id);
    }
    None
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
    fn flags_variable_used_only_inside_inner_block() {
        let store = store_from(&[
            "void", "f", "(", ")", "{", "int", "i", ";", "if", "(", "x", ")", "{", "i", "=", "1", ";", "}", "}",
        ]);
        assert_eq!(check(&store, &registry()).len(), 1);
    }

    #[test]
    fn variable_used_at_top_level_is_not_flagged() {
        let store = store_from(&[
            "void", "f", "(", ")", "{", "int", "i", ";", "i", "=", "1", ";", "if", "(", "x", ")", "{", "i", "=",
            "2", ";", "}", "}",
        ]);
        assert!(check(&store, &registry()).is_empty());
    }
}
