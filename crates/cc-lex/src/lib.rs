//! cc-lex — token store and tokenizer for the cppcheck-rs pipeline.
//!
//! This crate owns the first two stages of the pipeline: the token store
//! (an arena of tokens with stable cursors) and the tokenizer that
//! lexes a C/C++ translation unit into that store, including the
//! `#include`/`#define` preprocessor subset. Everything downstream — the
//! matcher, the simplifier, the checkers — only ever walks a [`TokenStore`]
//! through its [`TokenId`] cursors; nothing outside this crate constructs a
//! [`Token`] directly.

pub mod cursor;
mod file_registry;
mod lexer;
mod preprocessor;
mod store;

pub use file_registry::FileRegistry;
pub use lexer::Tokenizer;
pub use store::{Token, TokenId, TokenStore};

pub use cc_util::FileId;
