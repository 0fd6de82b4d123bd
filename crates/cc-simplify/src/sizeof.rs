//! `sizeof` folding: primitive and pointer sizes are folded
//! to decimal literals, and `sizeof(NAME)` for a fixed-size array declared
//! earlier in the same enclosing block is folded to `N * sizeof(T)`,
//! evaluated.
//!
//! Platform sizes are fixed rather than queried, matching the rest of the
//! simplifier's "evaluate what's evaluable, leave the rest" posture:
//! `char` = 1, `int` = 4, `double` = 8, any pointer = 8.

use cc_lex::{TokenId, TokenStore};

const POINTER_SIZE: u64 = 8;

fn primitive_size(type_name: &str) -> Option<u64> {
    match type_name {
        "char" => Some(1),
        "int" => Some(4),
        "double" => Some(8),
        _ => None,
    }
}

struct ArrayDecl {
    name: String,
    total_size: u64,
    depth: i64,
}

/// One full left-to-right scan folding every `sizeof(...)` it can resolve.
/// Returns whether anything changed.
pub fn fold_sizeof(store: &mut TokenStore) -> bool {
    let mut changed = false;
    let mut arrays: Vec<ArrayDecl> = Vec::new();
    let mut depth: i64 = 0;
    let mut cursor = store.first();

    while let Some(id) = cursor {
        let lexeme = store.lexeme(id).to_string();

        match lexeme.as_str() {
            "{" => {
                depth += 1;
                cursor = store.next(id);
                continue;
            }
            "}" => {
                depth -= 1;
                arrays.retain(|a| a.depth <= depth);
                cursor = store.next(id);
                continue;
            }
            "sizeof" => {
                if let Some((literal, after)) = try_fold_sizeof_call(store, id, &arrays, depth) {
                    store.get_mut(id).lexeme = literal;
                    store.erase_range(Some(id), after);
                    changed = true;
                    cursor = Some(id);
                    continue;
                }
            }
            _ => {
                if let Some(size) = primitive_size(&lexeme) {
                    if let Some(decl) = try_match_array_decl(store, id, size, depth) {
                        arrays.push(decl);
                    }
                }
            }
        }
        cursor = store.next(id);
    }
    changed
}

/// Recognizes `sizeof ( ... )` at `id` and returns `(literal, token_after_close_paren)`
/// when the argument resolves: `T *`, a known primitive `T`, or a name
/// registered as a fixed-size array in the active scope.
fn try_fold_sizeof_call(
    store: &TokenStore,
    id: TokenId,
    arrays: &[ArrayDecl],
    depth: i64,
) -> Option<(String, Option<TokenId>)> {
    let open = store.next(id)?;
    if store.lexeme(open) != "(" {
        return None;
    }
    let inner = store.next(open)?;
    let inner_lex = store.lexeme(inner);
    let after_inner = store.next(inner)?;

    if store.lexeme(after_inner) == "*" {
        let close = store.next(after_inner)?;
        if store.lexeme(close) == ")" {
            return Some((POINTER_SIZE.to_string(), store.next(close)));
        }
        return None;
    }

    if store.lexeme(after_inner) == ")" {
        if let Some(size) = primitive_size(inner_lex) {
            return Some((size.to_string(), store.next(after_inner)));
        }
        if let Some(decl) = arrays.iter().rev().find(|a| a.name == inner_lex && a.depth <= depth) {
            return Some((decl.total_size.to_string(), store.next(after_inner)));
        }
    }
    None
}

/// Recognizes `NAME [ N ] ;` immediately after a primitive-type token `id`,
/// returning the registered array if `N` is a decimal literal.
fn try_match_array_decl(store: &TokenStore, id: TokenId, elem_size: u64, depth: i64) -> Option<ArrayDecl> {
    let name_id = store.next(id)?;
    let name = store.lexeme(name_id);
    if !name.chars().next().is_some_and(|c| c == '_' || c.is_alphabetic()) {
        return None;
    }
    let open_bracket = store.next(name_id)?;
    if store.lexeme(open_bracket) != "[" {
        return None;
    }
    let num_id = store.next(open_bracket)?;
    let n: u64 = store.lexeme(num_id).parse().ok()?;
    let close_bracket = store.next(num_id)?;
    if store.lexeme(close_bracket) != "]" {
        return None;
    }
    let semi = store.next(close_bracket)?;
    if store.lexeme(semi) != ";" {
        return None;
    }
    Some(ArrayDecl {
        name: name.to_string(),
        total_size: n * elem_size,
        depth,
    })
}
