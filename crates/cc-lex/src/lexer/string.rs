//! String and character literal lexing. Both keep their delimiting
//! quotes in the emitted lexeme; escapes are recognized only to find the
//! closing quote, never interpreted.

use crate::cursor::Cursor;

/// Consumes a `"..."` literal starting at the opening quote. An unescaped
/// closing quote, or end of file, ends the scan; an unterminated string is
/// consumed to end-of-file with no diagnostic.
pub fn lex_string(cursor: &mut Cursor<'_>) -> String {
    let start = cursor.position();
    debug_assert_eq!(cursor.current_char(), '"');
    cursor.advance();
    while !cursor.is_at_end() {
        match cursor.current_char() {
            '\\' => {
                cursor.advance();
                if !cursor.is_at_end() {
                    cursor.advance();
                }
            }
            '"' => {
                cursor.advance();
                break;
            }
            _ => cursor.advance(),
        }
    }
    cursor.slice_from(start).to_string()
}

/// Consumes a `'c'` literal starting at the opening quote: one character
/// (two if the first is a backslash escape) and a closing quote.
pub fn lex_char(cursor: &mut Cursor<'_>) -> String {
    let start = cursor.position();
    debug_assert_eq!(cursor.current_char(), '\'');
    cursor.advance();
    if cursor.current_char() == '\\' {
        cursor.advance();
    }
    if !cursor.is_at_end() {
        cursor.advance();
    }
    if cursor.current_char() == '\'' {
        cursor.advance();
    }
    cursor.slice_from(start).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_string_keeps_quotes() {
        let mut c = Cursor::new("\"hello\" rest");
        assert_eq!(lex_string(&mut c), "\"hello\"");
        assert_eq!(c.current_char(), ' ');
    }

    #[test]
    fn escaped_quote_does_not_terminate() {
        let mut c = Cursor::new("\"a\\\"b\" rest");
        assert_eq!(lex_string(&mut c), "\"a\\\"b\"");
    }

    #[test]
    fn unterminated_string_consumes_to_eof() {
        let mut c = Cursor::new("\"never closes");
        let s = lex_string(&mut c);
        assert_eq!(s, "\"never closes");
        assert!(c.is_at_end());
    }

    #[test]
    fn plain_char_literal() {
        let mut c = Cursor::new("'a' rest");
        assert_eq!(lex_char(&mut c), "'a'");
    }

    #[test]
    fn escaped_char_literal() {
        let mut c = Cursor::new("'\\n' rest");
        assert_eq!(lex_char(&mut c), "'\\n'");
    }
}
