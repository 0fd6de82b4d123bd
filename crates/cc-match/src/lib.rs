//! cc-match — the pattern matcher every checker is written against.
//!
//! Patterns are short, whitespace-separated, ASCII strings with a handful
//! of placeholders (`var`, `type`, `num`, alternation, and exact literals).
//! Compiling a pattern once into a [`Pattern`] and testing it repeatedly
//! against a token cursor is the only shape this crate exposes — there is
//! deliberately no AST here; the checkers in `cc-check` are built directly
//! on this string-level matcher rather than a structural one.

mod pattern;

pub use pattern::{compile, matches_from, peek, Atom, Pattern};
