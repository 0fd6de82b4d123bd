//! Stage 1: walks the tokens of one scope and reduces everything
//! that happens to a tracked variable into a closed event alphabet.

use crate::alloc_kind::{AllocKind, DeallocKind};
use crate::diagnostic::Diagnostic;
use cc_lex::{FileId, TokenId, TokenStore};
use cc_simplify::FunctionIndex;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    Open,
    Close,
    Semi,
    Alloc(AllocKind),
    Dealloc(DeallocKind),
    Use,
    If,
    IfVar,
    IfVarTrue,
    IfVarFalse,
    IfTrue,
    IfFalse,
    Else,
    Loop,
    NotVar,
    Case,
    Continue,
    Break,
    Return,
    Goto,
    Throw,
    Do,
    Switch,
}

const DEALLOCATOR_NAMES: &[&str] = &["free", "kfree", "g_free", "fclose", "pclose"];

fn mentions_var(tokens: &[String], var: &str) -> bool {
    tokens.iter().enumerate().any(|(i, t)| {
        t == var && !(i > 0 && (tokens[i - 1] == "." || tokens[i - 1] == "->"))
    })
}

fn strip_unlikely(tokens: &[String]) -> Vec<String> {
    if tokens.first().map(String::as_str) == Some("unlikely")
        && tokens.get(1).map(String::as_str) == Some("(")
        && tokens.last().map(String::as_str) == Some(")")
        && tokens.len() >= 3
    {
        return tokens[2..tokens.len() - 1].to_vec();
    }
    tokens.to_vec()
}

fn classify_if_condition(raw: &[String], var: &str) -> Event {
    let tokens = strip_unlikely(raw);
    let joined: String = tokens.concat();
    if joined == "true" {
        return Event::IfTrue;
    }
    if joined == "false" {
        return Event::IfFalse;
    }
    if joined == var || joined == format!("{var}!=0") || joined == format!("0!={var}") {
        return Event::IfVarTrue;
    }
    if joined == format!("!{var}") || joined == format!("{var}==0") || joined == format!("0=={var}") {
        return Event::IfVarFalse;
    }
    if mentions_var(&tokens, var) {
        Event::IfVar
    } else {
        Event::If
    }
}

/// Reads the `( ... )` group starting at `open_kw`'s following token.
/// Returns the inner tokens and the cursor just past the closing `)`.
fn read_paren_group(store: &TokenStore, open_kw: TokenId) -> Option<(Vec<String>, Option<TokenId>)> {
    let open = store.next(open_kw)?;
    if store.lexeme(open) != "(" {
        return None;
    }
    let mut depth = 1i64;
    let mut inner = Vec::new();
    let mut cursor = store.next(open);
    while let Some(id) = cursor {
        let lex = store.lexeme(id);
        match lex {
            "(" => depth += 1,
            ")" => {
                depth -= 1;
                if depth == 0 {
                    return Some((inner, store.next(id)));
                }
            }
            _ => {}
        }
        inner.push(lex.to_string());
        cursor = store.next(id);
    }
    None
}

/// A single-statement block `{ STMT ; }` or a bare `STMT ;`, returning the
/// callee name and its single argument if it looks like `callee ( arg ) ;`.
fn single_call_statement(store: &TokenStore, start: TokenId) -> Option<(String, String, TokenId)> {
    let mut id = start;
    let mut had_braces = false;
    if store.lexeme(id) == "{" {
        had_braces = true;
        id = store.next(id)?;
    }
    let callee = store.lexeme(id).to_string();
    let open = store.next(id)?;
    if store.lexeme(open) != "(" {
        return None;
    }
    let mut arg_tokens = Vec::new();
    let mut cursor = store.next(open)?;
    loop {
        let lex = store.lexeme(cursor);
        if lex == ")" {
            break;
        }
        arg_tokens.push(lex.to_string());
        cursor = store.next(cursor)?;
    }
    let close = cursor;
    let semi = store.next(close)?;
    if store.lexeme(semi) != ";" {
        return None;
    }
    let mut end = semi;
    if had_braces {
        let close_brace = store.next(semi)?;
        if store.lexeme(close_brace) != "}" {
            return None;
        }
        end = close_brace;
    }
    Some((callee, arg_tokens.concat(), end))
}

struct Extractor<'a> {
    store: &'a TokenStore,
    var: &'a str,
    functions: &'a FunctionIndex,
    depth_budget: u32,
    alloc_kind: AllocKind,
    dealloc_kind: DeallocKind,
    mismatches: Vec<Diagnostic>,
    file_name: &'a dyn Fn(FileId) -> String,
}

impl<'a> Extractor<'a> {
    fn note_alloc(&mut self, kind: AllocKind, at: TokenId) {
        self.alloc_kind = kind;
        let _ = at;
    }

    fn note_dealloc(&mut self, kind: DeallocKind, at: TokenId) {
        if self.alloc_kind != AllocKind::None {
            if self.alloc_kind.expected_dealloc() != Some(kind) {
                let tok = self.store.get(at);
                self.mismatches.push(Diagnostic::new(
                    (self.file_name)(tok.file),
                    tok.line,
                    format!("Mismatching allocation and deallocation: {}", self.var),
                ));
            }
        }
        self.dealloc_kind = kind;
    }
}

/// Classifies the token at `id` (which equals a dealloc keyword) together
/// with its argument list, returning `Some(kind)` if it deallocates `var`.
fn dealloc_call_kind(store: &TokenStore, id: TokenId, var: &str) -> Option<(DeallocKind, Option<TokenId>)> {
    let lex = store.lexeme(id);
    if lex == "delete" {
        let mut is_array = false;
        let mut next = store.next(id)?;
        if store.lexeme(next) == "[" {
            let close = store.next(next)?;
            if store.lexeme(close) == "]" {
                is_array = true;
                next = store.next(close)?;
            }
        }
        if store.lexeme(next) == var {
            return Some((
                DeallocKind::from_call("delete", is_array)?,
                store.next(next),
            ));
        }
        return None;
    }
    if DEALLOCATOR_NAMES.contains(&lex) {
        let open = store.next(id)?;
        if store.lexeme(open) != "(" {
            return None;
        }
        let arg = store.next(open)?;
        if store.lexeme(arg) != var {
            return None;
        }
        let close = store.next(arg)?;
        if store.lexeme(close) != ")" {
            return None;
        }
        return Some((DeallocKind::from_call(lex, false)?, store.next(close)));
    }
    None
}

/// Reads an allocation RHS starting right after `var =`, returning
/// `(kind, cursor_after_the_terminating_';'_or_None)`.
fn read_alloc_rhs(store: &TokenStore, after_eq: TokenId, var: &str) -> Option<(AllocKind, Option<TokenId>)> {
    let mut cursor = after_eq;
    // skip a leading C-style cast: "(" TYPE "*"* ")"
    if store.lexeme(cursor) == "(" {
        let mut lookahead = store.next(cursor)?;
        while store.lexeme(lookahead) != ")" {
            lookahead = store.next(lookahead)?;
        }
        cursor = store.next(lookahead)?;
    }
    let head = store.lexeme(cursor).to_string();
    if head == "new" {
        let type_tok = store.next(cursor)?;
        let after_type = store.next(type_tok)?;
        let is_array = store.lexeme(after_type) == "[";
        let kind = AllocKind::from_producer("new", is_array)?;
        let mut end = after_type;
        if is_array {
            while store.lexeme(end) != "]" {
                end = store.next(end)?;
            }
            end = store.next(end)?;
        }
        while store.lexeme(end) != ";" {
            end = store.next(end)?;
        }
        return Some((kind, Some(end)));
    }
    let open = store.next(cursor)?;
    if store.lexeme(open) == "(" {
        let kind = AllocKind::from_producer(&head, false)?;
        let mut depth = 1i64;
        let mut end = store.next(open)?;
        loop {
            match store.lexeme(end) {
                "(" => depth += 1,
                ")" => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
            end = store.next(end)?;
        }
        let semi = store.next(end)?;
        if store.lexeme(semi) != ";" {
            return None;
        }
        let _ = var;
        return Some((kind, Some(semi)));
    }
    None
}

/// Determines whether `return` at `id` is followed by the tracked variable
/// (`return x ;` / `return &x ;`), returning whether a `use` should also be
/// emitted and the cursor past the statement.
fn scan_return(store: &TokenStore, id: TokenId, var: &str) -> (bool, Option<TokenId>) {
    let mut cursor = store.next(id);
    let mut emits_use = false;
    if let Some(c) = cursor {
        let lex = store.lexeme(c);
        let target = if lex == "&" {
            store.next(c).map(|n| (n, store.lexeme(n)))
        } else {
            Some((c, lex))
        };
        if let Some((_, name)) = target {
            if name == var {
                emits_use = true;
            }
        }
    }
    while let Some(c) = cursor {
        if store.lexeme(c) == ";" {
            cursor = store.next(c);
            break;
        }
        cursor = store.next(c);
    }
    (emits_use, cursor)
}

/// Recursively reduces `callee`'s body with its matching parameter tracked,
/// bounded by `depth_budget`. Falls back to `use` when the shape can't be
/// resolved — "unknown functions produce no event", so callers skip the
/// push entirely when this returns `None`.
fn reduce_call_argument(
    store: &TokenStore,
    functions: &FunctionIndex,
    callee: &str,
    arg_index: usize,
    depth_budget: u32,
    file_name: &dyn Fn(FileId) -> String,
) -> Option<Event> {
    if depth_budget == 0 {
        return None;
    }
    let body_open = functions.lookup(callee)?;
    let param_name = nth_parameter_name(store, body_open, arg_index)?;
    let (mut events, _locations, _) =
        extract_events(store, body_open, &param_name, functions, depth_budget - 1, file_name);
    reduce_events(&mut events);
    if events.contains(&Event::Goto) {
        return Some(Event::Dealloc(DeallocKind::Free));
    }
    if events.iter().any(|e| matches!(e, Event::Dealloc(_))) {
        return Some(Event::Dealloc(DeallocKind::Free));
    }
    if events.contains(&Event::Use) {
        return Some(Event::Use);
    }
    None
}

/// Walks backward from a function body's opening `{` to its parameter list
/// and returns the name of the parameter at `index`, if resolvable.
fn nth_parameter_name(store: &TokenStore, body_open: TokenId, index: usize) -> Option<String> {
    let close_paren = store.prev(body_open)?;
    if store.lexeme(close_paren) != ")" {
        return None;
    }
    let mut depth = 1i64;
    let mut tokens = Vec::new();
    let mut cursor = store.prev(close_paren)?;
    loop {
        let lex = store.lexeme(cursor).to_string();
        match lex.as_str() {
            ")" => depth += 1,
            "(" => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            _ => {}
        }
        tokens.push(lex);
        cursor = store.prev(cursor)?;
    }
    tokens.reverse();
    let params: Vec<&[String]> = tokens.split(|t| t == ",").collect();
    let group = params.get(index)?;
    group
        .iter()
        .rev()
        .find(|t| t.chars().next().is_some_and(|c| c == '_' || c.is_alphabetic()))
        .cloned()
}

/// Stage 1: extracts the reduced event stream for `var` starting at the
/// scope's opening `{`. Returns the stream, a parallel vector of the
/// token each event came from (so stage 3 can point a diagnostic at the
/// statement that actually leaks rather than always the declaration),
/// and any mismatch diagnostics observed along the way.
pub fn extract_events(
    store: &TokenStore,
    scope_open: TokenId,
    var: &str,
    functions: &FunctionIndex,
    depth_budget: u32,
    file_name: &dyn Fn(FileId) -> String,
) -> (Vec<Event>, Vec<Option<TokenId>>, Vec<Diagnostic>) {
    let mut ex = Extractor {
        store,
        var,
        functions,
        depth_budget,
        alloc_kind: AllocKind::None,
        dealloc_kind: DeallocKind::None,
        mismatches: Vec::new(),
        file_name,
    };
    let mut events = Vec::new();
    let mut locations: Vec<Option<TokenId>> = Vec::new();
    let mut depth: i64 = 0;
    let mut cursor = Some(scope_open);

    macro_rules! push {
        ($e:expr, $loc:expr) => {{
            events.push($e);
            locations.push($loc);
        }};
    }

    while let Some(id) = cursor {
        let lex = store.lexeme(id).to_string();
        match lex.as_str() {
            "{" => {
                push!(Event::Open, Some(id));
                depth += 1;
                cursor = store.next(id);
                continue;
            }
            "}" => {
                push!(Event::Close, Some(id));
                depth -= 1;
                let after = store.next(id);
                if depth == 0 {
                    break;
                }
                cursor = after;
                continue;
            }
            ";" => {
                push!(Event::Semi, Some(id));
                cursor = store.next(id);
                continue;
            }
            "if" => {
                if let Some((cond, after_cond)) = read_paren_group(store, id) {
                    let event = classify_if_condition(&cond, var);
                    if let (Event::IfVarTrue, Some(body_start)) = (event, after_cond) {
                        if let Some((callee, arg, end)) = single_call_statement(store, body_start) {
                            if arg == var {
                                if let Some(kind) = DeallocKind::from_call(&callee, false) {
                                    ex.note_dealloc(kind, id);
                                    push!(Event::Dealloc(kind), Some(id));
                                    cursor = store.next(end);
                                    continue;
                                }
                            }
                        }
                    }
                    push!(event, Some(id));
                    cursor = after_cond;
                    continue;
                }
            }
            "for" | "while" => {
                push!(Event::Loop, Some(id));
                if let Some((_, after)) = read_paren_group(store, id) {
                    cursor = after;
                    continue;
                }
            }
            "do" => {
                push!(Event::Do, Some(id));
                cursor = store.next(id);
                continue;
            }
            "switch" => {
                push!(Event::Switch, Some(id));
                if let Some((_, after)) = read_paren_group(store, id) {
                    cursor = after;
                    continue;
                }
            }
            "case" | "default" => {
                push!(Event::Case, Some(id));
                push!(Event::Semi, Some(id));
                cursor = store.next(id);
                continue;
            }
            "else" => {
                push!(Event::Else, Some(id));
                cursor = store.next(id);
                continue;
            }
            "continue" => {
                push!(Event::Continue, Some(id));
                cursor = store.next(id);
                continue;
            }
            "break" => {
                push!(Event::Break, Some(id));
                cursor = store.next(id);
                continue;
            }
            "goto" => {
                push!(Event::Goto, Some(id));
                cursor = store.next(id);
                continue;
            }
            "throw" => {
                push!(Event::Throw, Some(id));
                cursor = store.next(id);
                continue;
            }
            "return" => {
                let (emits_use, after) = scan_return(store, id, var);
                push!(Event::Return, Some(id));
                if emits_use {
                    push!(Event::Use, Some(id));
                }
                cursor = after;
                continue;
            }
            "!" => {
                if let Some(next) = store.next(id) {
                    if store.lexeme(next) == var {
                        push!(Event::NotVar, Some(id));
                        cursor = store.next(next);
                        continue;
                    }
                }
            }
            "delete" => {
                if let Some((kind, after)) = dealloc_call_kind(store, id, var) {
                    ex.note_dealloc(kind, id);
                    push!(Event::Dealloc(kind), Some(id));
                    cursor = after;
                    continue;
                }
            }
            _ if DEALLOCATOR_NAMES.contains(&lex.as_str()) => {
                if let Some((kind, after)) = dealloc_call_kind(store, id, var) {
                    ex.note_dealloc(kind, id);
                    push!(Event::Dealloc(kind), Some(id));
                    cursor = after;
                    continue;
                }
            }
            _ if lex == var => {
                // The declaration itself ("T * var ;") is not a use.
                let is_bare_declaration = store
                    .prev(id)
                    .map(|p| store.lexeme(p) == "*")
                    .unwrap_or(false)
                    && store.next(id).map(|n| store.lexeme(n) == ";").unwrap_or(false);
                if is_bare_declaration {
                    cursor = store.next(id);
                    continue;
                }
                if let Some(next) = store.next(id) {
                    if store.lexeme(next) == "=" {
                        if let Some(after_eq) = store.next(next) {
                            if let Some((kind, after)) = read_alloc_rhs(store, after_eq, var) {
                                ex.note_alloc(kind, id);
                                push!(Event::Alloc(kind), Some(id));
                                cursor = after;
                                continue;
                            }
                        }
                    }
                }
                // Passed as an argument to a function known to the function index.
                if let Some(prev) = store.prev(id) {
                    if store.lexeme(prev) == "(" || store.lexeme(prev) == "," {
                        if let Some(callee_id) = find_call_target(store, id) {
                            let callee = store.lexeme(callee_id).to_string();
                            let index = argument_index(store, callee_id, id);
                            if let Some(event) = reduce_call_argument(
                                store,
                                functions,
                                &callee,
                                index,
                                depth_budget,
                                file_name,
                            ) {
                                push!(event, Some(id));
                                cursor = store.next(id);
                                continue;
                            }
                            cursor = store.next(id);
                            continue;
                        }
                    }
                }
                push!(Event::Use, Some(id));
                cursor = store.next(id);
                continue;
            }
            _ => {}
        }
        cursor = store.next(id);
    }

    (events, locations, ex.mismatches)
}

fn find_call_target(store: &TokenStore, arg_id: TokenId) -> Option<TokenId> {
    let mut depth = 0i64;
    let mut cursor = store.prev(arg_id)?;
    loop {
        match store.lexeme(cursor) {
            ")" => depth += 1,
            "(" => {
                if depth == 0 {
                    return store.prev(cursor);
                }
                depth -= 1;
            }
            _ => {}
        }
        cursor = store.prev(cursor)?;
    }
}

fn argument_index(store: &TokenStore, callee_id: TokenId, arg_id: TokenId) -> usize {
    let mut index = 0;
    let mut depth = 0i64;
    let mut cursor = store.next(callee_id);
    while let Some(id) = cursor {
        if id == arg_id {
            break;
        }
        match store.lexeme(id) {
            "(" => depth += 1,
            ")" => depth -= 1,
            "," if depth == 1 => index += 1,
            _ => {}
        }
        cursor = store.next(id);
    }
    index
}

pub use super::reduce::reduce_events;
