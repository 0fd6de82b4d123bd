//! Integer constant folding: a `NUM OP NUM` window bounded by
//! the listed context characters folds to its evaluated literal, and a
//! redundant `* 1` / `1 *` is simply deleted.

use cc_lex::{TokenId, TokenStore};

const OPERATORS: &[&str] = &["+", "-", "*", "/"];
const LEFT_CONTEXT: &[&str] = &["[", ",", "(", "=", "<", ">"];
const RIGHT_CONTEXT: &[&str] = &["]", ",", ")", ";", "=", "<", ">"];

fn is_integer_literal(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

fn evaluate(op: &str, a: i64, b: i64) -> Option<i64> {
    match op {
        "+" => a.checked_add(b),
        "-" => a.checked_sub(b),
        "*" => a.checked_mul(b),
        "/" if b != 0 => Some(a / b),
        _ => None,
    }
}

/// If `op_id` is an operator forming a bounded `NUM OP NUM` window,
/// returns `(literal, first_num_id, token_after_second_num)`.
fn try_fold_window(store: &TokenStore, op_id: TokenId, op_lex: &str) -> Option<(String, TokenId, Option<TokenId>)> {
    if !OPERATORS.contains(&op_lex) {
        return None;
    }
    let num1_id = store.prev(op_id)?;
    let num2_id = store.next(op_id)?;
    let n1 = store.lexeme(num1_id);
    let n2 = store.lexeme(num2_id);
    if !is_integer_literal(n1) || !is_integer_literal(n2) {
        return None;
    }
    let left_ctx_id = store.prev(num1_id)?;
    let right_ctx_id = store.next(num2_id)?;
    if !LEFT_CONTEXT.contains(&store.lexeme(left_ctx_id)) {
        return None;
    }
    if !RIGHT_CONTEXT.contains(&store.lexeme(right_ctx_id)) {
        return None;
    }
    let a: i64 = n1.parse().ok()?;
    let b: i64 = n2.parse().ok()?;
    let result = evaluate(op_lex, a, b)?;
    Some((result.to_string(), num1_id, store.next(num2_id)))
}

fn fold_numeric_windows(store: &mut TokenStore) -> bool {
    let mut changed = false;
    let mut cursor = store.first();
    while let Some(id) = cursor {
        let lex = store.lexeme(id).to_string();
        if let Some((literal, num1_id, after)) = try_fold_window(store, id, &lex) {
            store.get_mut(num1_id).lexeme = literal;
            store.erase_range(Some(num1_id), after);
            changed = true;
            cursor = Some(num1_id);
            continue;
        }
        cursor = store.next(id);
    }
    changed
}

fn delete_identity_multiplication(store: &mut TokenStore) -> bool {
    let mut changed = false;
    let mut cursor = store.first();
    while let Some(id) = cursor {
        if store.lexeme(id) == "*" {
            if let Some(next_id) = store.next(id) {
                if store.lexeme(next_id) == "1" {
                    let before = store.prev(id);
                    let after = store.next(next_id);
                    store.erase_range(before, after);
                    changed = true;
                    cursor = after;
                    continue;
                }
            }
            if let Some(prev_id) = store.prev(id) {
                if store.lexeme(prev_id) == "1" {
                    let before = store.prev(prev_id);
                    let after = store.next(id);
                    store.erase_range(before, after);
                    changed = true;
                    cursor = after;
                    continue;
                }
            }
        }
        cursor = store.next(id);
    }
    changed
}

/// One full scan applying rule 4: identity-multiplication deletion, then
/// bounded-window folding. Returns whether anything changed.
pub fn fold_integer_arithmetic(store: &mut TokenStore) -> bool {
    let a = delete_identity_multiplication(store);
    let b = fold_numeric_windows(store);
    a || b
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

    fn lexemes(store: &TokenStore) -> Vec<String> {
        store.iter().map(|id| store.lexeme(id).to_string()).collect()
    }

    #[test]
    fn folds_addition_in_array_bound_context() {
        let mut store = store_from(&["int", "a", "[", "2", "+", "3", "]", ";"]);
        assert!(fold_integer_arithmetic(&mut store));
        assert_eq!(lexemes(&store), vec!["int", "a", "[", "5", "]", ";"]);
    }

    #[test]
    fn does_not_fold_without_required_context() {
        let mut store = store_from(&["x", "2", "+", "3", "y"]);
        assert!(!fold_integer_arithmetic(&mut store));
    }

    #[test]
    fn deletes_star_one_either_order() {
        let mut store = store_from(&["n", "*", "1", ";"]);
        assert!(fold_integer_arithmetic(&mut store));
        assert_eq!(lexemes(&store), vec!["n", ";"]);

        let mut store2 = store_from(&["1", "*", "n", ";"]);
        assert!(fold_integer_arithmetic(&mut store2));
        assert_eq!(lexemes(&store2), vec!["n", ";"]);
    }

    #[test]
    fn division_by_zero_is_left_unfolded() {
        let mut store = store_from(&["(", "4", "/", "0", ")"]);
        assert!(!fold_integer_arithmetic(&mut store));
    }
}
