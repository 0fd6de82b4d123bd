//! strtok reachability: `strtok` keeps internal state between calls,
//! so a function that calls it and also (directly or transitively) calls
//! another function that uses it can corrupt an in-progress tokenization.

use crate::diagnostic::Diagnostic;
use cc_lex::{FileRegistry, TokenId, TokenStore};
use cc_util::{FxHashMap, FxHashSet};

fn is_ident(s: &str) -> bool {
    s.chars().next().is_some_and(|c| c == '_' || c.is_alphabetic())
}

fn loc(store: &TokenStore, id: TokenId, files: &FileRegistry) -> (String, u32) {
    let tok = store.get(id);
    (files.path(tok.file).to_string(), tok.line)
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

/// Names of every function called directly within `[open, close]`, plus
/// whether `strtok` itself appears.
fn direct_calls(store: &TokenStore, open: TokenId, close: TokenId) -> (FxHashSet<String>, bool) {
    let mut calls = FxHashSet::default();
    let mut has_strtok = false;
    let mut cursor = Some(open);
    while let Some(id) = cursor {
        if id == close {
            break;
        }
        let lex = store.lexeme(id);
        if lex == "strtok" {
            has_strtok = true;
        }
        if is_ident(lex) {
            if let Some(next) = store.next(id) {
                if store.lexeme(next) == "(" {
                    calls.insert(lex.to_string());
                }
            }
        }
        cursor = store.next(id);
    }
    (calls, has_strtok)
}

pub fn check(store: &TokenStore, files: &FileRegistry) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    let functions = cc_simplify::build_function_index(store);

    let mut uses_strtok: FxHashMap<String, bool> = FxHashMap::default();
    let mut calls_of: FxHashMap<String, FxHashSet<String>> = FxHashMap::default();
    let mut body_open: FxHashMap<String, TokenId> = FxHashMap::default();

    for name in functions.names() {
        if let Some(open) = functions.lookup(name) {
            if let Some(close) = matching_close(store, open) {
                let (calls, has_strtok) = direct_calls(store, open, close);
                uses_strtok.insert(name.to_string(), has_strtok);
                calls_of.insert(name.to_string(), calls);
                body_open.insert(name.to_string(), open);
            }
        }
    }

    // Transitive closure: does `name` reach a function using `strtok`,
    // other than through its own direct use (already captured)?
    fn reaches_strtok(
        name: &str,
        calls_of: &FxHashMap<String, FxHashSet<String>>,
        uses_strtok: &FxHashMap<String, bool>,
        visited: &mut FxHashSet<String>,
    ) -> bool {
        if !visited.insert(name.to_string()) {
            return false;
        }
        let Some(callees) = calls_of.get(name) else { return false };
        for callee in callees {
            if uses_strtok.get(callee).copied().unwrap_or(false) {
                return true;
            }
            if reaches_strtok(callee, calls_of, uses_strtok, visited) {
                return true;
            }
        }
        false
    }

    for (name, &direct) in &uses_strtok {
        if !direct {
            continue;
        }
        let mut visited = FxHashSet::default();
        visited.insert(name.clone());
        let callees = &calls_of[name];
        let transitively_unsafe = callees.iter().any(|c| {
            uses_strtok.get(c).copied().unwrap_or(false) || reaches_strtok(c, &calls_of, &uses_strtok, &mut visited)
        });
        if transitively_unsafe {
            let (file, line) = loc(store, body_open[name], files);
            out.push(Diagnostic::new(
                file,
                line,
                format!("'{name}' calls 'strtok' and also reaches another function that calls 'strtok'"),
            ));
        }
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
    fn flags_reentrant_strtok_usage() {
        let store = store_from(&[
            "void", "g", "(", ")", "{", "strtok", "(", "s", ",", "d", ")", ";", "}", "void", "f", "(", ")", "{",
            "strtok", "(", "s", ",", "d", ")", ";", "g", "(", ")", ";", "}",
        ]);
        let diags = check(&store, &registry());
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn single_user_is_not_flagged() {
        let store = store_from(&[
            "void", "f", "(", ")", "{", "strtok", "(", "s", ",", "d", ")", ";", "}",
        ]);
        assert!(check(&store, &registry()).is_empty());
    }
}
