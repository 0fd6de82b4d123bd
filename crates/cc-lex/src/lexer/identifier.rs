//! Identifier/number fallback run: "maximal run of non-whitespace,
//! non-punctuation characters". Quote characters also end a run early so an
//! unquoted literal butted up against a string doesn't swallow it.

use super::punctuation::is_punctuation;
use crate::cursor::Cursor;

/// Scans the maximal run starting at the cursor's current position and
/// returns it. Used both for plain identifiers and as the raw text handed
/// to [`super::number::lex_number`] for further (hex) processing.
pub fn scan_run(cursor: &mut Cursor<'_>) -> String {
    let start = cursor.position();
    while !cursor.is_at_end() {
        let c = cursor.current_char();
        if c.is_whitespace() || is_punctuation(c) || c == '"' || c == '\'' {
            break;
        }
        cursor.advance();
    }
    cursor.slice_from(start).to_string()
}

/// A token's first character decides whether the pattern matcher's `var`
/// atom matches it: underscore or alphabetic.
pub fn is_identifier_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}
