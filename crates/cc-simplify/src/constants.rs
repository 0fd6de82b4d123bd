//! Constant inlining: `const [unsigned] int NAME = NUM ;` at any scope
//! registers a syntactic substitution — every later occurrence of `NAME`
//! in the same file becomes `NUM`. Purely textual and not scope-aware;
//! shadowing is not considered.

use cc_lex::{FileId, TokenId, TokenStore};

fn step(store: &TokenStore, from: TokenId, n: usize) -> Option<TokenId> {
    let mut cur = Some(from);
    for _ in 0..n {
        cur = cur.and_then(|id| store.next(id));
    }
    cur
}

/// If `start` begins a `const [unsigned] int NAME = NUM ;` declaration,
/// returns `(NAME, NUM, semicolon_id)`.
fn match_const_int_decl(store: &TokenStore, start: TokenId) -> Option<(String, String, TokenId)> {
    if store.lexeme(start) != "const" {
        return None;
    }
    let mut pos = 1;
    let mut next = step(store, start, pos)?;
    if store.lexeme(next) == "unsigned" {
        pos += 1;
        next = step(store, start, pos)?;
    }
    if store.lexeme(next) != "int" {
        return None;
    }
    pos += 1;
    let name_id = step(store, start, pos)?;
    let name = store.lexeme(name_id);
    if !name.chars().next().is_some_and(|c| c == '_' || c.is_alphabetic()) {
        return None;
    }
    let name = name.to_string();
    pos += 1;
    let eq_id = step(store, start, pos)?;
    if store.lexeme(eq_id) != "=" {
        return None;
    }
    pos += 1;
    let num_id = step(store, start, pos)?;
    let num = store.lexeme(num_id);
    if !num.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        return None;
    }
    let num = num.to_string();
    pos += 1;
    let semi_id = step(store, start, pos)?;
    if store.lexeme(semi_id) != ";" {
        return None;
    }
    Some((name, num, semi_id))
}

/// Scans for `const int` declarations and replaces every later same-file
/// occurrence of the declared name with its literal value. Returns whether
/// any replacement happened.
pub fn inline_constants(store: &mut TokenStore) -> bool {
    let mut declarations: Vec<(FileId, String, String, TokenId)> = Vec::new();
    let mut cursor = store.first();
    while let Some(id) = cursor {
        if let Some((name, value, decl_end)) = match_const_int_decl(store, id) {
            declarations.push((store.get(id).file, name, value, decl_end));
        }
        cursor = store.next(id);
    }

    let mut changed = false;
    for (file, name, value, decl_end) in declarations {
        let mut cursor = store.next(decl_end);
        while let Some(id) = cursor {
            if store.get(id).file == file && store.lexeme(id) == name {
                store.get_mut(id).lexeme = value.clone();
                changed = true;
            }
            cursor = store.next(id);
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_from(lexemes: &[&str]) -> TokenStore {
        let mut store = TokenStore::new();
        for l in lexemes {
            store.create_at_end(*l, FileId::TOP_LEVEL, 1);
        }
        store
    }

    fn lexemes(store: &TokenStore) -> Vec<String> {
        store.iter().map(|id| store.lexeme(id).to_string()).collect()
    }

    #[test]
    fn inlines_plain_const_int() {
        let mut store = store_from(&[
            "const", "int", "SIZE", "=", "10", ";", "int", "a", "[", "SIZE", "]", ";",
        ]);
        assert!(inline_constants(&mut store));
        assert_eq!(lexemes(&store).last().unwrap() /* ; */, ";");
        assert_eq!(lexemes(&store)[9], "10");
    }

    #[test]
    fn inlines_unsigned_const_int() {
        let mut store = store_from(&[
            "const", "unsigned", "int", "MAX", "=", "5", ";", "if", "(", "x", "<", "MAX", ")",
        ]);
        assert!(inline_constants(&mut store));
        assert_eq!(lexemes(&store)[11], "5");
    }

    #[test]
    fn does_not_touch_occurrences_before_the_declaration() {
        let mut store = store_from(&[
            "int", "SIZE", ";", "const", "int", "SIZE", "=", "1", ";",
        ]);
        inline_constants(&mut store);
        assert_eq!(lexemes(&store)[1], "SIZE");
    }

    #[test]
    fn no_declaration_means_no_change() {
        let mut store = store_from(&["int", "x", "=", "1", ";"]);
        assert!(!inline_constants(&mut store));
    }
}
