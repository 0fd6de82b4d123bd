//! Other checkers: independent passes over the simplified token list,
//! each emitting through the shared [`crate::diagnostic::Diagnostic`] sink.

mod array_bounds;
mod case_without_break;
mod char_index;
mod class_invariants;
mod conditions;
mod const_by_value;
mod dangerous_functions;
mod dynamic_copy;
mod invalid_usage;
mod redundant_code;
mod sign_mismatch;
mod strtok_reachability;
mod unneeded_header;
mod unused_struct_member;
mod variable_scope;

use crate::diagnostic::Diagnostic;
use cc_lex::{FileRegistry, TokenStore};

/// Runs every checker that operates on the simplified token list.
pub fn run_simplified_checks(store: &TokenStore, files: &FileRegistry, show_all: bool, style: bool) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    out.extend(array_bounds::check(store, files));
    out.extend(dynamic_copy::check(store, files, show_all));
    out.extend(class_invariants::check(store, files));
    out.extend(dangerous_functions::check(store, files));
    out.extend(invalid_usage::check(store, files));
    out.extend(redundant_code::check(store, files, style));
    out.extend(conditions::check(store, files, style));
    out.extend(sign_mismatch::check(store, files));
    out.extend(char_index::check(store, files, style));
    out.extend(const_by_value::check(store, files, style));
    out.extend(strtok_reachability::check(store, files));
    out.extend(case_without_break::check(store, files, style));
    if style {
        out.extend(unused_struct_member::check(store, files));
        out.extend(variable_scope::check(store, files));
        out.extend(class_invariants::unused_private_function::check(store, files));
    }
    out
}

/// Runs the one checker that must see the token list *before* simplification
/// (unneeded header).
pub fn run_unsimplified_checks(raw_store: &TokenStore, files: &FileRegistry) -> Vec<Diagnostic> {
    unneeded_header::check(raw_store, files)
}
