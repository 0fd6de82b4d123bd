//! Pass-by-value where a reference would do: `const std::T v` or
//! `const UserType v` among the parameters of a function definition.

use crate::diagnostic::Diagnostic;
use cc_lex::{FileRegistry, TokenId, TokenStore};

fn is_ident(s: &str) -> bool {
    s.chars().next().is_some_and(|c| c == '_' || c.is_alphabetic())
}

fn loc(store: &TokenStore, id: TokenId, files: &FileRegistry) -> (String, u32) {
    let tok = store.get(id);
    (files.path(tok.file).to_string(), tok.line)
}

/// True for a type spelled with a capital first letter (user type) or
/// `std::...` — the two shapes worth passing by reference.
fn is_class_like_type(lex: &str) -> bool {
    lex.starts_with("std::") || lex.chars().next().is_some_and(|c| c.is_ascii_uppercase())
}

pub fn check(store: &TokenStore, files: &FileRegistry, style: bool) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    if !style {
        return out;
    }
    let mut cursor = store.first();
    while let Some(id) = cursor {
        if store.lexeme(id) == "const" {
            if let Some(type_id) = store.next(id) {
                let type_lex = store.lexeme(type_id);
                if is_class_like_type(type_lex) {
                    if let Some(name_id) = store.next(type_id) {
                        let name_lex = store.lexeme(name_id);
                        if is_ident(name_lex) {
                            if let Some(after) = store.next(name_id) {
                                let after_lex = store.lexeme(after);
                                if after_lex == "," || after_lex == ")" {
                                    let (file, line) = loc(store, id, files);
                                    out.push(Diagnostic::new(
                                        file,
                                        line,
                                        format!(
                                            "parameter '{name_lex}' is passed by value, consider 'const {type_lex}&'"
                                        ),
                                    ));
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
