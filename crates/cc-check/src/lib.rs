//! Checker layer: the memory-leak analyzer, the remaining
//! independent checkers, and the diagnostic sink they both report through.

pub mod alloc_kind;
pub mod checks;
pub mod diagnostic;
pub mod leak;

pub use alloc_kind::{AllocKind, DeallocKind};
pub use diagnostic::{Diagnostic, DiagnosticSink};
pub use leak::{check_class_member_leaks, check_local_leaks, Classification, Event};

use cc_lex::{FileRegistry, TokenStore};
use cc_simplify::FunctionIndex;

/// Runs every checker over a translation unit and returns the deduplicated
/// findings. `raw_store` is the token list captured before simplification
/// (needed by the unneeded-header check); `store` is the simplified list
/// everything else runs against.
pub fn run_all(
    raw_store: &TokenStore,
    store: &TokenStore,
    files: &FileRegistry,
    functions: &FunctionIndex,
    show_all: bool,
    style: bool,
) -> DiagnosticSink {
    let mut sink = DiagnosticSink::new(show_all);
    sink.extend(checks::run_unsimplified_checks(raw_store, files));
    sink.extend(checks::run_simplified_checks(store, files, show_all, style));
    sink.extend(leak::check_local_leaks(store, files, functions, show_all));
    sink.extend(leak::check_class_member_leaks(store, files));
    sink
}
