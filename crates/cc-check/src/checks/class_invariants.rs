//! Class invariants: uninitialized members, `memset` over a class,
//! non-returning `operator=`, and unused private member functions.

use crate::diagnostic::Diagnostic;
use cc_lex::{FileRegistry, TokenId, TokenStore};
use cc_util::FxHashSet;

fn is_ident(s: &str) -> bool {
    s.chars().next().is_some_and(|c| c == '_' || c.is_alphabetic())
}

fn loc(store: &TokenStore, id: TokenId, files: &FileRegistry) -> (String, u32) {
    let tok = store.get(id);
    (files.path(tok.file).to_string(), tok.line)
}

fn matching_close(store: &TokenStore, open: TokenId) -> Option<TokenId> {
    let mut depth = 0i64;
    let mut cursor = Some(open);
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
}

struct Class {
    name: String,
    open: TokenId,
    close: TokenId,
}

fn find_classes(store: &TokenStore) -> Vec<Class> {
    let mut out = Vec::new();
    let mut depth = 0i64;
    let mut pending: Option<String> = None;
    let mut cursor = store.first();
    while let Some(id) = cursor {
        let lex = store.lexeme(id);
        if depth == 0 && lex == "class" {
            if let Some(name_id) = store.next(id) {
                pending = Some(store.lexeme(name_id).to_string());
            }
        } else if depth == 0 && lex == "{" {
            if let Some(name) = pending.take() {
                if let Some(close) = matching_close(store, id) {
                    out.push(Class { name, open: id, close });
                }
            }
        } else if depth == 0 {
            pending = None;
        }
        match lex {
            "{" => depth += 1,
            "}" => depth -= 1,
            _ => {}
        }
        cursor = store.next(id);
    }
    out
}

const PRIMITIVE_TYPES: &[&str] = &["char", "int", "double"];

fn collect_members(store: &TokenStore, class: &Class) -> Vec<(String, TokenId)> {
    let mut members = Vec::new();
    let mut cursor = store.next(class.open);
    while let Some(id) = cursor {
        if id == class.close {
            break;
        }
        let lex = store.lexeme(id);
        if PRIMITIVE_TYPES.contains(&lex) {
            let mut next = store.next(id);
            if let Some(n) = next {
                if store.lexeme(n) == "*" {
                    next = store.next(n);
                }
            }
            if let Some(name_id) = next {
                let name = store.lexeme(name_id);
                if is_ident(name) {
                    if let Some(term) = store.next(name_id) {
                        if store.lexeme(term) == ";" {
                            members.push((name.to_string(), id));
                        }
                    }
                }
            }
        }
        cursor = store.next(id);
    }
    members
}

/// Finds the constructor body: `ClassName ( ... ) { ... }` at the class
/// body's nesting depth.
fn find_constructor_body(store: &TokenStore, class: &Class) -> Option<(TokenId, TokenId)> {
    let mut depth = 0i64;
    let mut cursor = store.next(class.open);
    while let Some(id) = cursor {
        if id == class.close {
            return None;
        }
        if depth == 0 && store.lexeme(id) == class.name {
            if let Some(open) = store.next(id) {
                if store.lexeme(open) == "(" {
                    let mut d = 1i64;
                    let mut c = store.next(open);
                    while let Some(p) = c {
                        match store.lexeme(p) {
                            "(" => d += 1,
                            ")" => {
                                d -= 1;
                                if d == 0 {
                                    break;
                                }
                            }
                            _ => {}
                        }
                        c = store.next(p);
                    }
                    if let Some(close_paren) = c {
                        if let Some(body_open) = store.next(close_paren) {
                            if store.lexeme(body_open) == "{" {
                                if let Some(body_close) = matching_close(store, body_open) {
                                    return Some((body_open, body_close));
                                }
                            }
                        }
                    }
                }
            }
        }
        match store.lexeme(id) {
            "{" => depth += 1,
            "}" => depth -= 1,
            _ => {}
        }
        cursor = store.next(id);
    }
    None
}

fn member_initialized_in_ctor(store: &TokenStore, body_open: TokenId, body_close: TokenId, member: &str) -> bool {
    let mut cursor = store.next(body_open);
    while let Some(id) = cursor {
        if id == body_close {
            break;
        }
        let lex = store.lexeme(id);
        if lex == member {
            if let Some(next) = store.next(id) {
                if store.lexeme(next) == "=" {
                    return true;
                }
            }
        }
        if lex == "memset" {
            if let Some(arg) = store.next(id).and_then(|o| store.next(o)) {
                if store.lexeme(arg) == "this" {
                    return true;
                }
            }
        }
        if (lex == ".clear" || lex == ".Clear") && store.prev(id).map(|p| store.lexeme(p) == member) == Some(true) {
            return true;
        }
        cursor = store.next(id);
    }
    false
}

pub fn check(store: &TokenStore, files: &FileRegistry) -> Vec<Diagnostic> {
    let mut out = Vec::new();

    for class in find_classes(store) {
        let members = collect_members(store, &class);
        match find_constructor_body(store, &class) {
            Some((body_open, body_close)) => {
                for (member, type_id) in &members {
                    if !member_initialized_in_ctor(store, body_open, body_close, member) {
                        let (file, line) = loc(store, *type_id, files);
                        out.push(Diagnostic::new(
                            file,
                            line,
                            format!("member variable '{}::{member}' is not initialized in the constructor", class.name),
                        ));
                    }
                }
            }
            None if !members.is_empty() => {
                let (file, line) = loc(store, class.open, files);
                out.push(Diagnostic::new(file, line, format!("class '{}' has no constructor", class.name)));
            }
            None => {}
        }
    }

    let mut cursor = store.first();
    while let Some(id) = cursor {
        if store.lexeme(id) == "void" {
            if let Some(next) = store.next(id) {
                if store.lexeme(next) == "operator=" || (store.lexeme(next) == "operator" && store.next(next).map(|n| store.lexeme(n) == "=") == Some(true)) {
                    let (file, line) = loc(store, id, files);
                    out.push(Diagnostic::new(file, line, "'operator=' should return a reference to the object"));
                }
            }
        }
        cursor = store.next(id);
    }

    out
}

/// Unused private member functions (style): a name declared after a
/// `private:` specifier that's never referenced anywhere else in the file,
/// whether as a call (`member(...)`) or a function pointer (`&member`).
/// Classes with a `friend class` declaration are skipped — a friend can
/// call a private member with no trace in the class body itself.
pub mod unused_private_function {
    use super::*;

    fn has_friend_declaration(store: &TokenStore, class: &Class) -> bool {
        let mut cursor = store.next(class.open);
        while let Some(id) = cursor {
            if id == class.close {
                break;
            }
            if store.lexeme(id) == "friend" {
                return true;
            }
            cursor = store.next(id);
        }
        false
    }

    /// Member names declared `RetType name (` after a `private:` specifier,
    /// up to the next access specifier or the class's closing brace.
    fn collect_private_functions(store: &TokenStore, class: &Class) -> Vec<(String, TokenId)> {
        let mut out = Vec::new();
        let mut seen = FxHashSet::default();
        let mut in_private = false;
        let mut cursor = store.next(class.open);
        while let Some(id) = cursor {
            if id == class.close {
                break;
            }
            match store.lexeme(id) {
                "private:" => {
                    in_private = true;
                    cursor = store.next(id);
                    continue;
                }
                "public:" | "protected:" => {
                    in_private = false;
                    cursor = store.next(id);
                    continue;
                }
                _ => {}
            }
            if in_private {
                if let Some(name_id) = store.next(id) {
                    let name = store.lexeme(name_id);
                    if is_ident(name) {
                        if let Some(open) = store.next(name_id) {
                            if store.lexeme(open) == "(" && seen.insert(name.to_string()) {
                                out.push((name.to_string(), name_id));
                            }
                        }
                    }
                }
            }
            cursor = store.next(id);
        }
        out
    }

    /// True if `name` appears anywhere in the file other than at its own
    /// declaration token.
    fn function_is_referenced(store: &TokenStore, name: &str, decl_name_id: TokenId) -> bool {
        let mut cursor = store.first();
        while let Some(id) = cursor {
            if id != decl_name_id && store.lexeme(id) == name {
                return true;
            }
            cursor = store.next(id);
        }
        false
    }

    pub fn check(store: &TokenStore, files: &FileRegistry) -> Vec<Diagnostic> {
        let mut out = Vec::new();
        for class in find_classes(store) {
            if has_friend_declaration(store, &class) {
                continue;
            }
            for (name, name_id) in collect_private_functions(store, &class) {
                if !function_is_referenced(store, &name, name_id) {
                    let (file, line) = loc(store, name_id, files);
                    out.push(Diagnostic::new(
                        file,
                        line,
                        format!("private function '{}::{name}' is unused", class.name),
                    ));
                }
            }
        }
        out
    }

}
