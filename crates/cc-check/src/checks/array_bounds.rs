//! Array index out of bounds.

use crate::diagnostic::Diagnostic;
use cc_lex::{FileRegistry, TokenId, TokenStore};

fn primitive_size(t: &str) -> Option<u64> {
    match t {
        "char" => Some(1),
        "int" => Some(4),
        "double" => Some(8),
        _ => None,
    }
}

struct ArrayDecl {
    name: String,
    elem: String,
    elem_size: u64,
    count: u64,
}

fn loc(store: &TokenStore, id: TokenId, files: &FileRegistry) -> (String, u32) {
    let tok = store.get(id);
    (files.path(tok.file).to_string(), tok.line)
}

fn is_ident(s: &str) -> bool {
    s.chars().next().is_some_and(|c| c == '_' || c.is_alphabetic())
}

fn try_match_decl(store: &TokenStore, type_id: TokenId) -> Option<(ArrayDecl, TokenId)> {
    let t = store.lexeme(type_id);
    let size = primitive_size(t)?;
    let name_id = store.next(type_id)?;
    let name = store.lexeme(name_id);
    if !is_ident(name) {
        return None;
    }
    let open = store.next(name_id)?;
    if store.lexeme(open) != "[" {
        return None;
    }
    let num_id = store.next(open)?;
    let n: u64 = store.lexeme(num_id).parse().ok()?;
    let close = store.next(num_id)?;
    if store.lexeme(close) != "]" {
        return None;
    }
    Some((
        ArrayDecl {
            name: name.to_string(),
            elem: t.to_string(),
            elem_size: size,
            count: n,
        },
        close,
    ))
}

const BOUNDED_COPY_FNS: &[&str] = &["memset", "memcpy", "memmove", "memcmp", "strncpy", "fgets"];

/// `name [ K ]`, `obj . name [ K ]`, or `obj -> name [ K ]` with `K` a
/// decimal literal. The struct-member form is matched on the member name
/// alone (no type resolution of `obj`), consistent with the rest of this
/// checker's name-only matching.
fn scan_indexed_access(store: &TokenStore, id: TokenId, name: &str) -> Option<TokenId> {
    let bracket = if is_ident(store.lexeme(id)) && store.lexeme(id) == name {
        store.next(id)?
    } else {
        return None;
    };
    if store.lexeme(bracket) != "[" {
        return None;
    }
    let idx_id = store.next(bracket)?;
    let idx_lex = store.lexeme(idx_id);
    if !idx_lex.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(idx_id)
}

/// A `for` loop with a literal upper bound over a single counter, e.g.
/// `for ( v = 0 ; v < K ; ++v )` or `for ( v = 0 ; v <= K ; v++ )`.
struct ForBound {
    var: String,
    inclusive: bool,
    bound: u64,
    body_start: TokenId,
}

fn try_match_for_loop(store: &TokenStore, for_id: TokenId) -> Option<ForBound> {
    let open = store.next(for_id)?;
    if store.lexeme(open) != "(" {
        return None;
    }
    let var_id = store.next(open)?;
    let var = store.lexeme(var_id);
    if !is_ident(var) {
        return None;
    }
    let eq = store.next(var_id)?;
    if store.lexeme(eq) != "=" {
        return None;
    }
    let init = store.next(eq)?;
    if store.lexeme(init) != "0" {
        return None;
    }
    let semi1 = store.next(init)?;
    if store.lexeme(semi1) != ";" {
        return None;
    }
    let cond_var = store.next(semi1)?;
    if store.lexeme(cond_var) != var {
        return None;
    }
    let rel_id = store.next(cond_var)?;
    let rel = store.lexeme(rel_id);
    let inclusive = match rel {
        "<" => false,
        "<=" => true,
        _ => return None,
    };
    let bound_id = store.next(rel_id)?;
    let bound: u64 = store.lexeme(bound_id).parse().ok()?;
    let semi2 = store.next(bound_id)?;
    if store.lexeme(semi2) != ";" {
        return None;
    }
    let inc1 = store.next(semi2)?;
    let close_paren = if store.lexeme(inc1) == "++" {
        let inc_var = store.next(inc1)?;
        if store.lexeme(inc_var) != var {
            return None;
        }
        store.next(inc_var)?
    } else if store.lexeme(inc1) == var {
        let op = store.next(inc1)?;
        if store.lexeme(op) != "++" {
            return None;
        }
        store.next(op)?
    } else {
        return None;
    };
    if store.lexeme(close_paren) != ")" {
        return None;
    }
    let body_start = store.next(close_paren)?;
    Some(ForBound { var: var.to_string(), inclusive, bound, body_start })
}

/// The token ending the loop body: the matching `}` for a braced body, or
/// the terminating `;` for a single statement.
fn body_end(store: &TokenStore, body_start: TokenId) -> Option<TokenId> {
    if store.lexeme(body_start) == "{" {
        let mut depth = 1i64;
        let mut cursor = store.next(body_start);
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
    } else {
        let mut cursor = Some(body_start);
        while let Some(id) = cursor {
            if store.lexeme(id) == ";" {
                return Some(id);
            }
            cursor = store.next(id);
        }
        None
    }
}

/// Finds the first `name [ var ]` access inside `[body_start, end]`.
fn find_loop_indexed_access(store: &TokenStore, body_start: TokenId, end: TokenId, name: &str, var: &str) -> Option<TokenId> {
    let mut cursor = Some(body_start);
    while let Some(id) = cursor {
        if store.lexeme(id) == name {
            if let Some(bracket) = store.next(id) {
                if store.lexeme(bracket) == "[" {
                    if let Some(idx_id) = store.next(bracket) {
                        if store.lexeme(idx_id) == var {
                            return Some(idx_id);
                        }
                    }
                }
            }
        }
        if id == end {
            break;
        }
        cursor = store.next(id);
    }
    None
}

pub fn check(store: &TokenStore, files: &FileRegistry) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    let mut arrays: Vec<ArrayDecl> = Vec::new();
    let mut cursor = store.first();

    while let Some(id) = cursor {
        let lex = store.lexeme(id);
        if primitive_size(lex).is_some() {
            if let Some((decl, close_bracket)) = try_match_decl(store, id) {
                arrays.push(decl);
                cursor = store.next(close_bracket);
                continue;
            }
        }
        if lex == "for" {
            if let Some(bound) = try_match_for_loop(store, id) {
                if let Some(end) = body_end(store, bound.body_start) {
                    for arr in &arrays {
                        if let Some(idx_id) = find_loop_indexed_access(store, bound.body_start, end, &arr.name, &bound.var) {
                            let effective = if bound.inclusive { bound.bound + 1 } else { bound.bound };
                            if effective > arr.count {
                                let (file, line) = loc(store, idx_id, files);
                                out.push(Diagnostic::new(
                                    file,
                                    line,
                                    format!(
                                        "Buffer overrun: loop bound {} exceeds array '{}' ({} elements)",
                                        bound.bound, arr.name, arr.count
                                    ),
                                ));
                            }
                        }
                    }
                }
            }
        }
        if is_ident(lex) {
            if let Some(arr) = arrays.iter().find(|a| a.name == lex) {
                if let Some(idx_id) = scan_indexed_access(store, id, &arr.name) {
                    let idx_lex = store.lexeme(idx_id);
                    if let Ok(k) = idx_lex.parse::<u64>() {
                        if k >= arr.count {
                            let (file, line) = loc(store, idx_id, files);
                            out.push(Diagnostic::new(
                                file,
                                line,
                                format!(
                                    "Buffer overrun: array index {k} is out of bounds (array '{}' has {} elements)",
                                    arr.name, arr.count
                                ),
                            ));
                        }
                    }
                }
            }
        }
        if BOUNDED_COPY_FNS.contains(&lex) {
            if let Some((array_name, k, k_id)) = scan_bounded_copy_call(store, id) {
                if let Some(arr) = arrays.iter().find(|a| a.name == array_name) {
                    let limit = arr.count * arr.elem_size;
                    if k > limit {
                        let (file, line) = loc(store, k_id, files);
                        out.push(Diagnostic::new(
                            file,
                            line,
                            format!("Buffer overrun: '{lex}' writes {k} bytes into '{}' ({limit} available)", arr.name),
                        ));
                    }
                }
            }
        }
        if lex == "strcpy" {
            if let Some((array_name, literal, lit_id)) = scan_strcpy_literal(store, id) {
                if let Some(arr) = arrays.iter().find(|a| a.name == array_name) {
                    let content_len = literal.trim_matches('"').len() as u64;
                    if content_len >= arr.count {
                        let (file, line) = loc(store, lit_id, files);
                        out.push(Diagnostic::new(
                            file,
                            line,
                            format!(
                                "Buffer overrun: string literal does not fit into '{}' ({} elements)",
                                arr.name, arr.count
                            ),
                        ));
                    }
                }
            }
        }
        cursor = store.next(id);
    }
    out
}

/// `fn ( name , ... , K )` where `name` is the first argument and `K` is the
/// last (size) argument, a decimal literal.
fn scan_bounded_copy_call(store: &TokenStore, fn_id: TokenId) -> Option<(String, u64, TokenId)> {
    let open = store.next(fn_id)?;
    if store.lexeme(open) != "(" {
        return None;
    }
    let name_id = store.next(open)?;
    let name = store.lexeme(name_id).to_string();
    let mut depth = 1i64;
    let mut last_num: Option<(u64, TokenId)> = None;
    let mut cursor = store.next(name_id)?;
    loop {
        let lex = store.lexeme(cursor);
        match lex {
            "(" => depth += 1,
            ")" => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            _ => {
                if depth == 1 && lex.chars().next().is_some_and(|c| c.is_ascii_digit()) {
                    if let Ok(n) = lex.parse::<u64>() {
                        last_num = Some((n, cursor));
                    }
                }
            }
        }
        cursor = store.next(cursor)?;
    }
    last_num.map(|(n, id)| (name, n, id))
}

fn scan_strcpy_literal(store: &TokenStore, fn_id: TokenId) -> Option<(String, String, TokenId)> {
    let open = store.next(fn_id)?;
    if store.lexeme(open) != "(" {
        return None;
    }
    let name_id = store.next(open)?;
    let name = store.lexeme(name_id).to_string();
    let comma = store.next(name_id)?;
    if store.lexeme(comma) != "," {
        return None;
    }
    let lit_id = store.next(comma)?;
    let lit = store.lexeme(lit_id);
    if !lit.starts_with('"') {
        return None;
    }
    Some((name, lit.to_string(), lit_id))
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
    fn flags_literal_out_of_bounds_index() {
        let store = store_from(&["char", "buf", "[", "4", "]", ";", "buf", "[", "4", "]", "=", "0", ";"]);
        let diags = check(&store, &registry());
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn in_bounds_index_is_not_flagged() {
        let store = store_from(&["char", "buf", "[", "4", "]", ";", "buf", "[", "3", "]", "=", "0", ";"]);
        let diags = check(&store, &registry());
        assert!(diags.is_empty());
    }

    #[test]
    fn flags_oversized_strcpy_literal() {
        let store = store_from(&[
            "char", "buf", "[", "3", "]", ";", "strcpy", "(", "buf", ",", "\"abcd\"", ")", ";",
        ]);
        let diags = check(&store, &registry());
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn flags_oversized_memcpy_length() {
        let store = store_from(&[
            "char", "buf", "[", "4", "]", ";", "memcpy", "(", "buf", ",", "src", ",", "10", ")", ";",
        ]);
        let diags = check(&store, &registry());
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn strict_loop_bound_equal_to_size_is_not_flagged() {
        let store = store_from(&[
            "char", "a", "[", "4", "]", ";", "for", "(", "i", "=", "0", ";", "i", "<", "4", ";", "++", "i", ")",
            "{", "a", "[", "i", "]", "=", "0", ";", "}",
        ]);
        assert!(check(&store, &registry()).is_empty());
    }

    #[test]
    fn inclusive_loop_bound_equal_to_size_is_flagged() {
        let store = store_from(&[
            "char", "a", "[", "4", "]", ";", "for", "(", "i", "=", "0", ";", "i", "<=", "4", ";", "++", "i", ")",
            "{", "a", "[", "i", "]", "=", "0", ";", "}",
        ]);
        let diags = check(&store, &registry());
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn struct_member_access_via_dot_is_flagged() {
        let store = store_from(&[
            "struct", "S", "{", "char", "arr", "[", "4", "]", ";", "}", ";", "obj", ".", "arr", "[", "4", "]",
            "=", "0", ";",
        ]);
        let diags = check(&store, &registry());
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn struct_member_access_via_arrow_is_flagged() {
        let store = store_from(&[
            "struct", "S", "{", "char", "arr", "[", "4", "]", ";", "}", ";", "obj", "->", "arr", "[", "4", "]",
            "=", "0", ";",
        ]);
        let diags = check(&store, &registry());
        assert_eq!(diags.len(), 1);
    }
}
