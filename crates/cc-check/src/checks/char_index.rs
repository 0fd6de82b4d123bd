//! Char used as index: a plain `char` is signed on many platforms, so
//! using one as an array index or bitwise operand can read negative.
//! Taking its address suppresses the finding (the analysis can't follow
//! pointer aliases).

use crate::diagnostic::Diagnostic;
use cc_lex::{FileRegistry, TokenId, TokenStore};
use cc_match::{compile, matches_from, peek};
use cc_util::FxHashSet;

fn is_ident(s: &str) -> bool {
    s.chars().next().is_some_and(|c| c == '_' || c.is_alphabetic())
}

fn loc(store: &TokenStore, id: TokenId, files: &FileRegistry) -> (String, u32) {
    let tok = store.get(id);
    (files.path(tok.file).to_string(), tok.line)
}

fn collect_char_vars(store: &TokenStore) -> FxHashSet<String> {
    let mut out = FxHashSet::default();
    let mut addressed = FxHashSet::default();
    let mut cursor = store.first();
    while let Some(id) = cursor {
        if store.lexeme(id) == "char" {
            if let Some(name_id) = store.next(id) {
                let name = store.lexeme(name_id);
                if is_ident(name) {
                    if let Some(term) = store.next(name_id) {
                        let term_lex = store.lexeme(term);
                        if term_lex == ";" || term_lex == "=" {
                            out.insert(name.to_string());
                        }
                    }
                }
            }
        }
        if store.lexeme(id) == "&" {
            if let Some(next) = store.next(id) {
                if is_ident(store.lexeme(next)) {
                    addressed.insert(store.lexeme(next).to_string());
                }
            }
        }
        cursor = store.next(id);
    }
    out.retain(|n| !addressed.contains(n));
    out
}

const BITWISE_OPS: &[&str] = &["|", "&", "^"];

/// `isdigit(c)` etc. with a plain `char` argument (recovered from
/// `CheckOther.cpp`): sign-extending a negative `char` before the call is
/// undefined behavior in the C standard.
fn check_ctype_calls(store: &TokenStore, files: &FileRegistry, char_vars: &FxHashSet<String>, out: &mut Vec<Diagnostic>) {
    let pattern = compile("isdigit|isalpha|isalnum|isspace|isupper|islower ( var )");
    let mut cursor = store.first();
    while let Some(id) = cursor {
        if matches_from(store, id, &pattern) {
            let lex = peek(store, id, 0);
            let arg_lex = peek(store, id, 2);
            if char_vars.contains(&arg_lex) {
                let (file, line) = loc(store, id, files);
                out.push(Diagnostic::new(
                    file,
                    line,
                    format!("'{lex}({arg_lex})' is undefined behavior if '{arg_lex}' is negative, cast to 'unsigned char' first"),
                ));
            }
        }
        cursor = store.next(id);
    }
}

pub fn check(store: &TokenStore, files: &FileRegistry, style: bool) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    let char_vars = collect_char_vars(store);
    if style {
        check_ctype_calls(store, files, &char_vars, &mut out);
    }
    let mut cursor = store.first();
    while let Some(id) = cursor {
        let lex = store.lexeme(id);
        if is_ident(lex) && char_vars.contains(lex) {
            if let Some(prev) = store.prev(id) {
                if store.lexeme(prev) == "[" {
                    let (file, line) = loc(store, id, files);
                    out.push(Diagnostic::new(
                        file,
                        line,
                        format!("'{lex}' is a plain char and can be negative when used as an array index"),
                    ));
                }
            }
            if let Some(next) = store.next(id) {
                if BITWISE_OPS.contains(&store.lexeme(next)) {
                    let (file, line) = loc(store, id, files);
                    out.push(Diagnostic::new(
                        file,
                        line,
                        format!("'{lex}' is a plain char and can be negative in a bitwise operation"),
                    ));
                }
            }
        }
        cursor = store.next(id);
    }
    out
}
