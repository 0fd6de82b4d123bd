//! Unneeded header: runs on the *unsimplified* token list, because
//! simplification can fold away the very declarations this check inspects.
//!
//! For every `#include "h"`, the header's own token span (everything with
//! `file == h`, contiguous right after the directive since inclusion is
//! depth-first) is scanned for top-level names it declares; if none of
//! those names shows up anywhere in the including file, the header is
//! flagged as not needed.

use crate::diagnostic::Diagnostic;
use cc_lex::{FileId, FileRegistry, TokenId, TokenStore};
use cc_util::FxHashSet;

fn is_ident(s: &str) -> bool {
    s.chars().next().is_some_and(|c| c == '_' || c.is_alphabetic())
}

fn loc(store: &TokenStore, id: TokenId, files: &FileRegistry) -> (String, u32) {
    let tok = store.get(id);
    (files.path(tok.file).to_string(), tok.line)
}

/// Names declared at top level in a header's token span: function names,
/// struct/class names, and `#define`d macro names are all out of scope for
/// this subset — only bare top-level identifiers followed by `(` or `;`
/// close enough to a declaration shape are collected.
fn declared_names(store: &TokenStore, start: TokenId, header_file: FileId) -> FxHashSet<String> {
    let mut names = FxHashSet::default();
    let mut cursor = Some(start);
    while let Some(id) = cursor {
        let tok = store.get(id);
        if tok.file != header_file {
            break;
        }
        let lex = tok.lexeme.as_str();
        if is_ident(lex) {
            if let Some(next) = store.next(id) {
                let next_lex = store.lexeme(next);
                if next_lex == "(" || next_lex == ";" {
                    names.insert(lex.to_string());
                }
            }
        }
        cursor = store.next(id);
    }
    names
}

fn header_span_end(store: &TokenStore, start: TokenId, header_file: FileId) -> Option<TokenId> {
    let mut cursor = start;
    loop {
        match store.next(cursor) {
            Some(next) if store.get(next).file == header_file => cursor = next,
            _ => return Some(cursor),
        }
    }
}

enum Usage {
    None,
    /// Every use outside the header is as a pointer or reference type —
    /// a forward declaration would have been enough.
    PointerOrReferenceOnly,
    Full,
}

fn usage_outside_span(store: &TokenStore, span_start: TokenId, span_end: TokenId, names: &FxHashSet<String>) -> Usage {
    let mut any_use = false;
    let mut only_pointer_or_ref = true;
    let mut cursor = store.first();
    while let Some(id) = cursor {
        let in_span = id == span_start || is_between(store, span_start, span_end, id);
        if !in_span && names.contains(store.lexeme(id)) {
            any_use = true;
            let next_is_ptr_or_ref = store
                .next(id)
                .map(|n| matches!(store.lexeme(n), "*" | "&"))
                == Some(true);
            if !next_is_ptr_or_ref {
                only_pointer_or_ref = false;
            }
        }
        cursor = store.next(id);
    }
    if !any_use {
        Usage::None
    } else if only_pointer_or_ref {
        Usage::PointerOrReferenceOnly
    } else {
        Usage::Full
    }
}

fn is_between(store: &TokenStore, start: TokenId, end: TokenId, id: TokenId) -> bool {
    let mut cursor = Some(start);
    while let Some(c) = cursor {
        if c == id {
            return true;
        }
        if c == end {
            return false;
        }
        cursor = store.next(c);
    }
    false
}

pub fn check(store: &TokenStore, files: &FileRegistry) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    let mut cursor = store.first();
    while let Some(id) = cursor {
        if store.lexeme(id) == "#include" {
            if let Some(path_id) = store.next(id) {
                let header_path = store.lexeme(path_id).trim_matches('"').to_string();
                if let Some(span_start) = store.next(path_id) {
                    let header_file = store.get(span_start).file;
                    if files.path(header_file) == header_path {
                        let names = declared_names(store, span_start, header_file);
                        if let Some(span_end) = header_span_end(store, span_start, header_file) {
                            if !names.is_empty() {
                                let (file, line) = loc(store, id, files);
                                match usage_outside_span(store, span_start, span_end, &names) {
                                    Usage::None => out.push(Diagnostic::new(
                                        file,
                                        line,
                                        format!("header '{header_path}' is included but not needed"),
                                    )),
                                    Usage::PointerOrReferenceOnly => out.push(Diagnostic::new(
                                        file,
                                        line,
                                        format!(
                                            "header '{header_path}' is only used by pointer or reference, a forward declaration is sufficient"
                                        ),
                                    )),
                                    Usage::Full => {}
                                }
                            }
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

    fn two_file_store(header_lexemes: &[&str], main_lexemes: &[&str]) -> (TokenStore, FileRegistry) {
        let mut files = FileRegistry::new();
        let main_id = files.push("main.c");
        let header_id = files.push("util.h");
        let mut store = TokenStore::new();
        store.create_at_end("#include", main_id, 1);
        store.create_at_end("\"util.h\"", main_id, 1);
        for l in header_lexemes {
            store.create_at_end(*l, header_id, 1);
        }
        for l in main_lexemes {
            store.create_at_end(*l, main_id, 2);
        }
        (store, files)
    }

    #[test]
    fn unused_header_is_flagged() {
        let (store, files) = two_file_store(
            &["void", "helper", "(", ")", ";"],
            &["int", "main", "(", ")", "{", "return", "0", ";", "}"],
        );
        let diags = check(&store, &files);
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn pointer_only_usage_suggests_forward_declaration() {
        let (store, files) = two_file_store(
            &["struct", "Widget", ";"],
            &["void", "f", "(", "struct", "Widget", "*", "w", ")", "{", "}"],
        );
        let diags = check(&store, &files);
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("forward declaration"));
    }

    #[test]
    fn used_header_is_not_flagged() {
        let (store, files) = two_file_store(
            &["void", "helper", "(", ")", ";"],
            &["int", "main", "(", ")", "{", "helper", "(", ")", ";", "}"],
        );
        let diags = check(&store, &files);
        assert!(diags.is_empty());
    }
}
