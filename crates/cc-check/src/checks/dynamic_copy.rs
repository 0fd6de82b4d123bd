//! Dynamic data copy: `strcpy`/`strcat`/`sprintf` copying from a
//! pointer with no observed `strlen` bounds check. Gated behind "show-all"
//! mode, which is where the original tool's `strlen`-only heuristic lives.

use crate::diagnostic::Diagnostic;
use cc_lex::{FileRegistry, TokenId, TokenStore};

fn is_ident(s: &str) -> bool {
    s.chars().next().is_some_and(|c| c == '_' || c.is_alphabetic())
}

fn loc(store: &TokenStore, id: TokenId, files: &FileRegistry) -> (String, u32) {
    let tok = store.get(id);
    (files.path(tok.file).to_string(), tok.line)
}

/// Collects the comma-separated argument name of the call starting at
/// `fn_id`, at position `arg_index` (0-based), if it is a bare identifier.
fn nth_arg_name(store: &TokenStore, fn_id: TokenId, arg_index: usize) -> Option<(String, TokenId)> {
    let open = store.next(fn_id)?;
    if store.lexeme(open) != "(" {
        return None;
    }
    let mut depth = 1i64;
    let mut index = 0usize;
    let mut cursor = store.next(open)?;
    let mut arg_start = cursor;
    loop {
        let lex = store.lexeme(cursor);
        match lex {
            "(" => depth += 1,
            ")" if depth == 1 => {
                if index == arg_index {
                    let name = store.lexeme(arg_start);
                    if is_ident(name) && store.next(arg_start).map(|n| n == cursor) == Some(true) {
                        return Some((name.to_string(), arg_start));
                    }
                }
                break;
            }
            ")" => depth -= 1,
            "," if depth == 1 => {
                if index == arg_index {
                    let name = store.lexeme(arg_start);
                    if is_ident(name) && store.next(arg_start).map(|n| n == cursor) == Some(true) {
                        return Some((name.to_string(), arg_start));
                    }
                }
                index += 1;
                arg_start = store.next(cursor)?;
            }
            _ => {}
        }
        cursor = store.next(cursor)?;
    }
    None
}

pub fn check(store: &TokenStore, files: &FileRegistry, show_all: bool) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    if !show_all {
        return out;
    }

    let mut declared: Vec<String> = Vec::new();
    let mut strlen_checked: Vec<String> = Vec::new();
    let mut cursor = store.first();

    while let Some(id) = cursor {
        let lex = store.lexeme(id);
        if lex == "*" {
            if let Some(prev) = store.prev(id) {
                if let Some(next) = store.next(id) {
                    if is_ident(store.lexeme(prev)) && is_ident(store.lexeme(next)) {
                        declared.push(store.lexeme(next).to_string());
                    }
                }
            }
        }
        if lex == "strlen" {
            if let Some((name, _)) = nth_arg_name(store, id, 0) {
                strlen_checked.push(name);
            }
        }
        let src_index = match lex {
            "strcpy" | "strcat" => Some(1),
            "sprintf" => Some(2),
            _ => None,
        };
        if let Some(idx) = src_index {
            if let Some((src, src_id)) = nth_arg_name(store, id, idx) {
                if declared.contains(&src) && !strlen_checked.contains(&src) {
                    let (file, line) = loc(store, src_id, files);
                    out.push(Diagnostic::new(
                        file,
                        line,
                        format!("copying from '{src}' with unknown length and no bounds check"),
                    ));
                }
            }
        }
        cursor = store.next(id);
    }
    out
}
