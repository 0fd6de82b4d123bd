//! Redundant code: guarding a deallocator with a null check it
//! doesn't need — `delete`, `delete []`, and `free` all tolerate a null
//! argument.

use crate::diagnostic::Diagnostic;
use cc_lex::{FileRegistry, TokenId, TokenStore};

fn loc(store: &TokenStore, id: TokenId, files: &FileRegistry) -> (String, u32) {
    let tok = store.get(id);
    (files.path(tok.file).to_string(), tok.line)
}

/// Reads the condition tokens of an `if ( ... )` starting at the `if`
/// keyword, returning them plus the token after the closing `)`.
fn read_condition(store: &TokenStore, if_id: TokenId) -> Option<(Vec<String>, TokenId)> {
    let open = store.next(if_id)?;
    if store.lexeme(open) != "(" {
        return None;
    }
    let mut depth = 1i64;
    let mut tokens = Vec::new();
    let mut cursor = store.next(open)?;
    loop {
        let lex = store.lexeme(cursor);
        match lex {
            "(" => depth += 1,
            ")" => {
                depth -= 1;
                if depth == 0 {
                    let after = store.next(cursor)?;
                    return Some((tokens, after));
                }
            }
            _ => {}
        }
        if depth >= 1 {
            tokens.push(lex.to_string());
        }
        cursor = store.next(cursor)?;
    }
}

/// Extracts `var` from a guard shaped `var` or `var != NULL` or `var != 0`.
fn guard_var(tokens: &[String]) -> Option<&str> {
    match tokens.len() {
        1 => Some(tokens[0].as_str()),
        3 if tokens[1] == "!=" && (tokens[2] == "NULL" || tokens[2] == "0" || tokens[2] == "nullptr") => {
            Some(tokens[0].as_str())
        }
        _ => None,
    }
}

/// Matches `{ delete p ; }` / `delete p ;` / `delete [ ] p ;` / `free ( p ) ;`
/// as the single statement starting at `body_start`, returning the variable
/// name and whether it was an array-delete (unused here, kept for clarity).
fn single_dealloc_statement(store: &TokenStore, body_start: TokenId, var: &str) -> bool {
    let (start, braced) = if store.lexeme(body_start) == "{" {
        (store.next(body_start).unwrap_or(body_start), true)
    } else {
        (body_start, false)
    };

    let mut cursor = start;
    if store.lexeme(cursor) == "delete" {
        let mut next = store.next(cursor);
        if let Some(n) = next {
            if store.lexeme(n) == "[" {
                next = store.next(n).and_then(|b| store.next(b));
            }
        }
        cursor = match next {
            Some(n) => n,
            None => return false,
        };
        if store.lexeme(cursor) != var {
            return false;
        }
    } else if store.lexeme(cursor) == "free" {
        let open = match store.next(cursor) {
            Some(o) if store.lexeme(o) == "(" => o,
            _ => return false,
        };
        let arg = match store.next(open) {
            Some(a) => a,
            None => return false,
        };
        if store.lexeme(arg) != var {
            return false;
        }
        cursor = match store.next(arg) {
            Some(c) if store.lexeme(c) == ")" => c,
            _ => return false,
        };
    } else {
        return false;
    }

    let semi = match store.next(cursor) {
        Some(s) if store.lexeme(s) == ";" => s,
        _ => return false,
    };

    if braced {
        matches!(store.next(semi), Some(c) if store.lexeme(c) == "}")
    } else {
        true
    }
}

pub fn check(store: &TokenStore, files: &FileRegistry, style: bool) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    if !style {
        return out;
    }
    let mut cursor = store.first();
    while let Some(id) = cursor {
        if store.lexeme(id) == "if" {
            if let Some((cond, body_start)) = read_condition(store, id) {
                if let Some(var) = guard_var(&cond) {
                    if single_dealloc_statement(store, body_start, var) {
                        let (file, line) = loc(store, id, files);
                        out.push(Diagnostic::new(
                            file,
                            line,
                            format!("redundant null check before deallocating '{var}'"),
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
    fn flags_guarded_delete() {
        let store = store_from(&["if", "(", "p", ")", "delete", "p", ";"]);
        assert_eq!(check(&store, &registry(), true).len(), 1);
    }

    #[test]
    fn flags_guarded_braced_free() {
        let store = store_from(&["if", "(", "p", "!=", "NULL", ")", "{", "free", "(", "p", ")", ";", "}"]);
        assert_eq!(check(&store, &registry(), true).len(), 1);
    }

    #[test]
    fn guard_with_other_work_is_not_flagged() {
        let store = store_from(&[
            "if", "(", "p", ")", "{", "free", "(", "p", ")", ";", "p", "=", "0", ";", "}",
        ]);
        assert!(check(&store, &registry(), true).is_empty());
    }

    #[test]
    fn guarded_delete_is_not_flagged_without_style() {
        let store = store_from(&["if", "(", "p", ")", "delete", "p", ";"]);
        assert!(check(&store, &registry(), false).is_empty());
    }
}
