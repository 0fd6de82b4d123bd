//! Unused struct member (style): a member that's never read anywhere
//! in the file. A write (`.m = ...`) alone doesn't count as use.

use crate::diagnostic::Diagnostic;
use cc_lex::{FileRegistry, TokenId, TokenStore};

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

struct StructDef {
    name: String,
    open: TokenId,
    close: TokenId,
}

fn find_structs(store: &TokenStore) -> Vec<StructDef> {
    let mut out = Vec::new();
    let mut pending: Option<String> = None;
    let mut cursor = store.first();
    while let Some(id) = cursor {
        let lex = store.lexeme(id);
        if lex == "struct" {
            if let Some(name_id) = store.next(id) {
                pending = Some(store.lexeme(name_id).to_string());
            }
        } else if lex == "{" {
            if let Some(name) = pending.take() {
                if let Some(close) = matching_close(store, id) {
                    out.push(StructDef { name, open: id, close });
                }
            }
        }
        cursor = store.next(id);
    }
    out
}

fn collect_members(store: &TokenStore, def: &StructDef) -> Vec<(String, TokenId)> {
    let mut members = Vec::new();
    let mut cursor = store.next(def.open);
    while let Some(id) = cursor {
        if id == def.close {
            break;
        }
        if is_ident(store.lexeme(id)) {
            if let Some(name_id) = store.next(id) {
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

fn is_read_use(store: &TokenStore, member_id: TokenId) -> bool {
    let accessor_ok = store
        .prev(member_id)
        .map(|p| store.lexeme(p) == "." || store.lexeme(p) == "->")
        == Some(true);
    if !accessor_ok {
        return false;
    }
    match store.next(member_id) {
        Some(next) => store.lexeme(next) != "=",
        None => true,
    }
}

pub fn check(store: &TokenStore, files: &FileRegistry) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    for def in find_structs(store) {
        for (member, type_id) in collect_members(store, &def) {
            let mut used = false;
            let mut cursor = store.first();
            while let Some(id) = cursor {
                if store.lexeme(id) == member && is_read_use(store, id) {
                    used = true;
                    break;
                }
                cursor = store.next(id);
            }
            if !used {
                let (file, line) = loc(store, type_id, files);
                out.push(Diagnostic::new(
                    file,
                    line,
                    format!("struct member '{}::{member}' is never read", def.name),
                ));
            }
        }
    }
    out
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
    fn flags_never_read_member() {
        let store = store_from(&[
            "struct", "S", "{", "int", "x", ";", "}", ";", "void", "f", "(", "S", "s", ")", "{", "s", ".", "x",
            "=", "1", ";", "}",
        ]);
        assert_eq!(check(&store, &registry()).len(), 1);
    }

    #[test]
    fn read_member_is_not_flagged() {
        let store = store_from(&[
            "struct", "S", "{", "int", "x", ";", "}", ";", "void", "f", "(", "S", "s", ")", "{", "y", "=", "s",
            ".", "x", ";", "}",
        ]);
        assert!(check(&store, &registry()).is_empty());
    }
}
