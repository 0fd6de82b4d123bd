//! Invalid library usage: `strtol`/`strtoul` base argument must be
//! `0` or within `[2, 36]`.

use crate::diagnostic::Diagnostic;
use cc_lex::{FileRegistry, TokenId, TokenStore};

fn loc(store: &TokenStore, id: TokenId, files: &FileRegistry) -> (String, u32) {
    let tok = store.get(id);
    (files.path(tok.file).to_string(), tok.line)
}

/// Returns the third comma-separated argument of a call, if it is a bare
/// decimal literal.
fn third_arg_literal(store: &TokenStore, fn_id: TokenId) -> Option<(i64, TokenId)> {
    let open = store.next(fn_id)?;
    if store.lexeme(open) != "(" {
        return None;
    }
    let mut depth = 1i64;
    let mut commas_at_depth1 = 0u32;
    let mut cursor = store.next(open)?;
    loop {
        let lex = store.lexeme(cursor);
        match lex {
            "(" => depth += 1,
            ")" => {
                depth -= 1;
                if depth == 0 {
                    return None;
                }
            }
            "," if depth == 1 => {
                commas_at_depth1 += 1;
                if commas_at_depth1 == 2 {
                    let arg_id = store.next(cursor)?;
                    let arg_lex = store.lexeme(arg_id);
                    if let Ok(n) = arg_lex.parse::<i64>() {
                        return Some((n, arg_id));
                    }
                    return None;
                }
            }
            _ => {}
        }
        cursor = store.next(cursor)?;
    }
}

pub fn check(store: &TokenStore, files: &FileRegistry) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    let mut cursor = store.first();
    while let Some(id) = cursor {
        let lex = store.lexeme(id);
        if lex == "strtol" || lex == "strtoul" {
            if let Some((base, base_id)) = third_arg_literal(store, id) {
                if base != 0 && !(2..=36).contains(&base) {
                    let (file, line) = loc(store, base_id, files);
                    out.push(Diagnostic::new(
                        file,
                        line,
                        format!("invalid base {base} passed to '{lex}', must be 0 or in [2, 36]"),
                    ));
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
    fn flags_out_of_range_base() {
        let store = store_from(&["strtol", "(", "s", ",", "&", "end", ",", "40", ")", ";"]);
        assert_eq!(check(&store, &registry()).len(), 1);
    }

    #[test]
    fn base_zero_is_allowed() {
        let store = store_from(&["strtol", "(", "s", ",", "&", "end", ",", "0", ")", ";"]);
        assert!(check(&store, &registry()).is_empty());
    }

    #[test]
    fn base_sixteen_is_allowed() {
        let store = store_from(&["strtoul", "(", "s", ",", "&", "end", ",", "16", ")", ";"]);
        assert!(check(&store, &registry()).is_empty());
    }
}
