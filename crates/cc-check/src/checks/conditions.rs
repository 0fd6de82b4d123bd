//! Suspicious conditions: empty if-bodies, tautological comparisons
//! of a variable against itself, and assignment used where comparison was
//! likely meant.

use crate::diagnostic::Diagnostic;
use cc_lex::{FileRegistry, TokenId, TokenStore};
use cc_match::{compile, matches_from, peek, Pattern};

fn loc(store: &TokenStore, id: TokenId, files: &FileRegistry) -> (String, u32) {
    let tok = store.get(id);
    (files.path(tok.file).to_string(), tok.line)
}

const COMPARISONS: &[&str] = &["==", "!=", "<=", ">=", "<", ">"];

fn read_condition(store: &TokenStore, if_id: TokenId) -> Option<(Vec<(String, TokenId)>, TokenId)> {
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
            tokens.push((lex.to_string(), cursor));
        }
        cursor = store.next(cursor)?;
    }
}

/// `( int ) x` etc., compiled once: a parenthesized primitive type
/// immediately followed by an identifier operand.
fn old_style_cast_pattern() -> Pattern {
    compile("( char|int|double|long|short|float ) var")
}

/// Old-style C cast (style, recovered from `CheckOldStylePointerCast`):
/// `( int ) x` in C++ should be `static_cast<int>(x)`.
fn check_old_style_casts(store: &TokenStore, files: &FileRegistry, out: &mut Vec<Diagnostic>) {
    let pattern = old_style_cast_pattern();
    let mut cursor = store.first();
    while let Some(id) = cursor {
        if store.lexeme(id) == "(" && matches_from(store, id, &pattern) {
            let type_lex = peek(store, id, 1);
            let (file, line) = loc(store, id, files);
            out.push(Diagnostic::new(
                file,
                line,
                format!("C-style cast to '{type_lex}', prefer 'static_cast<{type_lex}>'"),
            ));
        }
        cursor = store.next(id);
    }
}

pub fn check(store: &TokenStore, files: &FileRegistry, style: bool) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    if style {
        check_old_style_casts(store, files, &mut out);
    }
    let mut cursor = store.first();
    while let Some(id) = cursor {
        if store.lexeme(id) == "if" {
            if let Some((cond, body_start)) = read_condition(store, id) {
                // Empty body: `if ( ... ) ;` with no following `else`.
                if style && store.lexeme(body_start) == ";" {
                    let next_stmt = store.next(body_start);
                    let has_else = next_stmt.map(|n| store.lexeme(n) == "else") == Some(true);
                    if !has_else {
                        let (file, line) = loc(store, id, files);
                        out.push(Diagnostic::new(file, line, "empty if-statement has no effect"));
                    }
                }

                // `a == a` / `a != a` / ... tautology or contradiction.
                if cond.len() == 3 && COMPARISONS.contains(&cond[1].0.as_str()) && cond[0].0 == cond[2].0 {
                    let (file, line) = loc(store, cond[1].1, files);
                    out.push(Diagnostic::new(
                        file,
                        line,
                        format!("condition '{} {} {}' is always the same value", cond[0].0, cond[1].0, cond[2].0),
                    ));
                }

                // Assignment inside condition: `if ( v = expr )`.
                if cond.len() >= 3 && cond[1].0 == "=" {
                    let (file, line) = loc(store, cond[1].1, files);
                    out.push(Diagnostic::new(
                        file,
                        line,
                        "suspicious assignment in condition, did you mean '=='?",
                    ));
                }
            }
        }
        cursor = store.next(id);
    }
    out
}
