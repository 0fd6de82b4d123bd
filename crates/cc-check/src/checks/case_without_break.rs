//! Case without break: a `case` label whose statements run into the
//! next label without `break`, `return`, `continue`, or `goto`.

use crate::diagnostic::Diagnostic;
use cc_lex::{FileRegistry, TokenId, TokenStore};

fn loc(store: &TokenStore, id: TokenId, files: &FileRegistry) -> (String, u32) {
    let tok = store.get(id);
    (files.path(tok.file).to_string(), tok.line)
}

const TERMINATORS: &[&str] = &["break", "return", "continue", "goto"];

pub fn check(store: &TokenStore, files: &FileRegistry, style: bool) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    if !style {
        return out;
    }
    let mut cursor = store.first();

    while let Some(id) = cursor {
        let lex = store.lexeme(id);
        if lex == "case" || lex == "default" {
            if let Some(next_label) = find_next_label_or_end(store, id) {
                if !fallthrough_free(store, id, next_label) {
                    let (file, line) = loc(store, id, files);
                    out.push(Diagnostic::new(
                        file,
                        line,
                        "switch case falls through without a 'break'",
                    ));
                }
            }
        }
        cursor = store.next(id);
    }
    out
}

/// Returns the token starting the case/default body, i.e. right after the
/// `:` that ends this label, skipping over chained labels like
/// `case 1: case 2:`.
fn label_colon(store: &TokenStore, label_id: TokenId) -> Option<TokenId> {
    let mut cursor = store.next(label_id)?;
    loop {
        if store.lexeme(cursor) == ":" {
            return Some(cursor);
        }
        cursor = store.next(cursor)?;
    }
}

/// The next `case`/`default` at the same brace depth as `label_id`, or the
/// switch's closing `}`.
fn find_next_label_or_end(store: &TokenStore, label_id: TokenId) -> Option<TokenId> {
    let colon = label_colon(store, label_id)?;
    let mut depth = 0i64;
    let mut cursor = store.next(colon)?;
    loop {
        let lex = store.lexeme(cursor);
        if depth == 0 && (lex == "case" || lex == "default") {
            return Some(cursor);
        }
        match lex {
            "{" => depth += 1,
            "}" => {
                if depth == 0 {
                    return Some(cursor);
                }
                depth -= 1;
            }
            _ => {}
        }
        cursor = store.next(cursor)?;
    }
}

/// True if any of `break`/`return`/`continue`/`goto` appears at brace depth
/// 0 between a case label's `:` and the next label/end, OR the body is
/// empty (falls through intentionally with no statements, chained labels).
fn fallthrough_free(store: &TokenStore, label_id: TokenId, stop: TokenId) -> bool {
    let Some(colon) = label_colon(store, label_id) else { return true };
    if colon == stop || store.next(colon) == Some(stop) {
        return true;
    }
    let mut depth = 0i64;
    let mut cursor = store.next(colon);
    let mut saw_any_statement = false;
    while let Some(id) = cursor {
        if id == stop {
            break;
        }
        let lex = store.lexeme(id);
        if depth == 0 && TERMINATORS.contains(&lex) {
            return true;
        }
        if depth == 0 {
            saw_any_statement = true;
        }
        match lex {
            "{" => depth += 1,
            "}" => depth -= 1,
            _ => {}
        }
        cursor = store.next(id);
    }
    !saw_any_statement
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
    fn flags_fallthrough_case() {
        let store = store_from(&[
            "switch", "(", "x", ")", "{", "case", "1", ":", "f", "(", ")", ";", "case", "2", ":", "g", "(", ")",
            ";", "break", ";", "}",
        ]);
        let diags = check(&store, &registry(), true);
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn case_with_break_is_not_flagged() {
        let store = store_from(&[
            "switch", "(", "x", ")", "{", "case", "1", ":", "f", "(", ")", ";", "break", ";", "case", "2", ":",
            "g", "(", ")", ";", "break", ";", "}",
        ]);
        assert!(check(&store, &registry(), true).is_empty());
    }

    #[test]
    fn chained_empty_label_is_not_flagged() {
        let store = store_from(&[
            "switch", "(", "x", ")", "{", "case", "1", ":", "case", "2", ":", "g", "(", ")", ";", "break", ";",
            "}",
        ]);
        assert!(check(&store, &registry(), true).is_empty());
    }

    #[test]
    fn fallthrough_case_is_not_flagged_without_style() {
        let store = store_from(&[
            "switch", "(", "x", ")", "{", "case", "1", ":", "f", "(", ")", ";", "case", "2", ":", "g", "(", ")",
            ";", "break", ";", "}",
        ]);
        assert!(check(&store, &registry(), false).is_empty());
    }
}
