//! Function index: after simplification, a single linear scan picks
//! up every top-level `name ( ... ) {` definition at brace depth 0. A name
//! seen more than once is dropped entirely rather than disambiguated — the
//! spec is explicit that this index does no overload resolution.

use cc_lex::{TokenId, TokenStore};
use cc_util::{FxHashMap, FxHashSet};

fn is_name_token(lexeme: &str) -> bool {
    lexeme.chars().next().is_some_and(|c| c == '_' || c.is_alphabetic())
}

#[derive(Clone)]
enum State {
    Idle,
    SawName(String),
    InParams(String, i64),
    ParamsClosed(String),
}

/// Maps a function name to the `TokenId` of its opening `{`.
pub struct FunctionIndex {
    functions: FxHashMap<String, TokenId>,
}

impl FunctionIndex {
    /// An index with no registered functions, for scopes analyzed outside
    /// the top-level scan (e.g. class member bodies).
    pub fn empty() -> Self {
        FunctionIndex {
            functions: FxHashMap::default(),
        }
    }

    pub fn lookup(&self, name: &str) -> Option<TokenId> {
        self.functions.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }
}

/// Scans the simplified token list and builds the index.
pub fn build_function_index(store: &TokenStore) -> FunctionIndex {
    let mut functions: FxHashMap<String, TokenId> = FxHashMap::default();
    let mut duplicate_names: FxHashSet<String> = FxHashSet::default();
    let mut state = State::Idle;
    let mut brace_depth: i64 = 0;
    let mut cursor = store.first();

    while let Some(id) = cursor {
        let lex = store.lexeme(id);

        if brace_depth == 0 {
            state = match state {
                State::Idle => {
                    if is_name_token(lex) {
                        State::SawName(lex.to_string())
                    } else {
                        State::Idle
                    }
                }
                State::SawName(name) => {
                    if lex == "(" {
                        State::InParams(name, 1)
                    } else if is_name_token(lex) {
                        State::SawName(lex.to_string())
                    } else {
                        State::Idle
                    }
                }
                State::InParams(name, depth) => match lex {
                    "(" => State::InParams(name, depth + 1),
                    ")" if depth == 1 => State::ParamsClosed(name),
                    ")" => State::InParams(name, depth - 1),
                    _ => State::InParams(name, depth),
                },
                State::ParamsClosed(name) => {
                    if lex == "{" {
                        if functions.contains_key(&name) {
                            duplicate_names.insert(name.clone());
                        } else {
                            functions.insert(name.clone(), id);
                        }
                    }
                    State::Idle
                }
            };
        }

        match lex {
            "{" => brace_depth += 1,
            "}" => brace_depth -= 1,
            _ => {}
        }

        cursor = store.next(id);
    }

    for name in &duplicate_names {
        functions.remove(name);
    }

    FunctionIndex { functions }
}
