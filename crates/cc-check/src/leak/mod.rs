//! Memory-leak analyzer. Finds candidate pointer variables — locals
//! inside function bodies, and class members — reduces each one's event
//! stream to a fixed point, and classifies the result.

mod classify;
mod events;
mod reduce;

pub use classify::Classification;
pub use events::Event;

use crate::diagnostic::Diagnostic;
use cc_lex::{FileId, TokenId, TokenStore};
use cc_simplify::FunctionIndex;

const PRIMITIVE_OR_USER_TYPE: &[&str] = &["char", "int", "double", "void", "struct"];

fn is_type_like(lexeme: &str) -> bool {
    PRIMITIVE_OR_USER_TYPE.contains(&lexeme)
        || lexeme.chars().next().is_some_and(|c| c == '_' || c.is_uppercase())
}

fn is_name(lexeme: &str) -> bool {
    lexeme.chars().next().is_some_and(|c| c == '_' || c.is_alphabetic())
}

/// Finds `T * name` / `T T * name` pointer declarations anywhere inside the
/// half-open token range `(start, end)`, returning `(name, decl_end_id)`.
fn find_pointer_decls(store: &TokenStore, start: TokenId, end: TokenId) -> Vec<(String, TokenId)> {
    let mut found = Vec::new();
    let mut cursor = store.next(start);
    while let Some(id) = cursor {
        if id == end {
            break;
        }
        if is_type_like(store.lexeme(id)) {
            if let Some(decl) = try_match_pointer_decl(store, id) {
                found.push(decl);
            }
        }
        cursor = store.next(id);
    }
    found
}

fn try_match_pointer_decl(store: &TokenStore, type_id: TokenId) -> Option<(String, TokenId)> {
    let mut cursor = store.next(type_id)?;
    if is_type_like(store.lexeme(cursor)) && store.lexeme(cursor) != "*" {
        cursor = store.next(cursor)?;
    }
    if store.lexeme(cursor) != "*" {
        return None;
    }
    let name_id = store.next(cursor)?;
    let name = store.lexeme(name_id);
    if !is_name(name) {
        return None;
    }
    let terminator = store.next(name_id)?;
    if matches!(store.lexeme(terminator), ";" | "=") {
        return Some((name.to_string(), terminator));
    }
    None
}

fn file_name_resolver<'a>(files: &'a cc_lex::FileRegistry) -> impl Fn(FileId) -> String + 'a {
    move |id| files.path(id).to_string()
}

fn location_of(store: &TokenStore, id: TokenId, files: &cc_lex::FileRegistry) -> (String, u32) {
    let tok = store.get(id);
    (files.path(tok.file).to_string(), tok.line)
}

/// Runs the full three-stage analysis for every local pointer candidate
/// inside every indexed function body.
pub fn check_local_leaks(
    store: &TokenStore,
    files: &cc_lex::FileRegistry,
    functions: &FunctionIndex,
    show_all: bool,
) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let file_name = file_name_resolver(files);

    for name in functions.names().map(str::to_string).collect::<Vec<_>>() {
        let Some(body_open) = functions.lookup(&name) else {
            continue;
        };
        let Some(body_close) = matching_close(store, body_open) else {
            continue;
        };
        for (var, decl_end) in find_pointer_decls(store, body_open, body_close) {
            let (mut events, mut locations, mismatches) =
                events::extract_events(store, body_open, &var, functions, 2, &file_name);
            diagnostics.extend(mismatches);
            reduce::reduce_events_located(&mut events, &mut locations, show_all);
            let (classification, trigger) = classify::classify(&events, show_all);
            if classification == Classification::Leak {
                let reported = trigger.and_then(|i| locations.get(i).copied().flatten()).unwrap_or(decl_end);
                let (file, line) = location_of(store, reported, files);
                diagnostics.push(Diagnostic::new(file, line, format!("Memory leak: {var}")));
            }
        }
    }
    diagnostics
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

struct ClassBody {
    name: String,
    open: TokenId,
    close: TokenId,
}

fn find_classes(store: &TokenStore) -> Vec<ClassBody> {
    let mut classes = Vec::new();
    let mut depth: i64 = 0;
    let mut pending_name: Option<String> = None;
    let mut cursor = store.first();
    while let Some(id) = cursor {
        let lex = store.lexeme(id);
        if depth == 0 && lex == "class" {
            if let Some(name_id) = store.next(id) {
                pending_name = Some(store.lexeme(name_id).to_string());
            }
        } else if depth == 0 && lex == "{" {
            if let Some(name) = pending_name.take() {
                if let Some(close) = matching_close(store, id) {
                    classes.push(ClassBody { name, open: id, close });
                }
            }
        } else if depth == 0 && !matches!(lex, "class") {
            pending_name = None;
        }
        match lex {
            "{" => depth += 1,
            "}" => depth -= 1,
            _ => {}
        }
        cursor = store.next(id);
    }
    classes
}

/// Member functions defined inline in a class body: `name ( ... ) { ... }`
/// at the class body's immediate nesting depth.
fn find_member_function_bodies(store: &TokenStore, class: &ClassBody) -> Vec<TokenId> {
    let mut bodies = Vec::new();
    let mut depth: i64 = 0;
    let mut cursor = store.next(class.open);
    let mut awaiting_paren_for: Option<String> = None;
    while let Some(id) = cursor {
        if id == class.close {
            break;
        }
        let lex = store.lexeme(id);
        if depth == 0 {
            if is_name(lex) && lex != "public" && lex != "private" && lex != "protected" {
                awaiting_paren_for = Some(lex.to_string());
            } else if lex != "(" && lex != ")" {
                // anything else at depth 0 that isn't part of a signature resets the guess
            }
        }
        if lex == "{" && depth == 0 {
            if awaiting_paren_for.take().is_some() {
                bodies.push(id);
            }
        }
        match lex {
            "{" => depth += 1,
            "}" => depth -= 1,
            _ => {}
        }
        cursor = store.next(id);
    }
    bodies
}

/// A member variable for which some member function allocates and none
/// deallocates is reported tagged with its fully-qualified name.
pub fn check_class_member_leaks(store: &TokenStore, files: &cc_lex::FileRegistry) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let file_name = file_name_resolver(files);
    let empty_index = FunctionIndex::empty();

    for class in find_classes(store) {
        let members = find_pointer_decls(store, class.open, class.close);
        let bodies = find_member_function_bodies(store, &class);
        for (member, decl_end) in members {
            let mut has_alloc = false;
            let mut has_dealloc = false;
            for &body in &bodies {
                let (events, _locations, _) = events::extract_events(store, body, &member, &empty_index, 0, &file_name);
                has_alloc |= events.iter().any(|e| matches!(e, Event::Alloc(_)));
                has_dealloc |= events.iter().any(|e| matches!(e, Event::Dealloc(_)));
            }
            if has_alloc && !has_dealloc {
                let (file, line) = location_of(store, decl_end, files);
                diagnostics.push(Diagnostic::new(
                    file,
                    line,
                    format!("Memory leak: {}::{member}", class.name),
                ));
            }
        }
    }
    diagnostics
}
