//! cc-simplify — the token-list simplifier and the function index built
//! on top of its output.
//!
//! Each rewrite rule is its own small pass over the [`cc_lex::TokenStore`];
//! [`simplify`] runs every pass, in a fixed order, until a full round
//! produces no further change. Order *within* a pass is not observable,
//! but the passes themselves always run in the same relative order so the
//! unsigned-division check (run before style substitutions) sees
//! declarations before any constant inlining rewrites them away.

mod fold;
mod function_index;
mod fuse;
mod sizeof;

pub use fold::fold_integer_arithmetic;
pub use function_index::{build_function_index, FunctionIndex};
pub use fuse::fuse_operators;
pub use sizeof::fold_sizeof;

use cc_lex::TokenStore;

mod constants;
pub use constants::inline_constants;

/// Runs every rewrite to a fixed point: operator fusion, constant
/// inlining, `sizeof` folding, integer folding, repeated until one full
/// round changes nothing.
pub fn simplify(store: &mut TokenStore) {
    loop {
        let mut changed = false;
        changed |= fuse_operators(store);
        changed |= inline_constants(store);
        changed |= fold_sizeof(store);
        changed |= fold_integer_arithmetic(store);
        if !changed {
            break;
        }
    }
}
