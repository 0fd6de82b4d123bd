//! Comment skipping. Line comments are discarded without touching the line
//! counter beyond the newline that ends them; block comments can span
//! multiple lines and the cursor's own newline tracking handles that.

use crate::cursor::Cursor;

/// If the cursor is sitting on the start of a comment, consumes it and
/// returns true. Otherwise leaves the cursor untouched and returns false.
pub fn skip_comment(cursor: &mut Cursor<'_>) -> bool {
    if cursor.current_char() != '/' {
        return false;
    }
    match cursor.peek_char(1) {
        '/' => {
            while !cursor.is_at_end() && cursor.current_char() != '\n' {
                cursor.advance();
            }
            true
        }
        '*' => {
            cursor.advance_n(2);
            while !cursor.is_at_end() {
                if cursor.current_char() == '*' && cursor.peek_char(1) == '/' {
                    cursor.advance_n(2);
                    return true;
                }
                cursor.advance();
            }
            // Unterminated block comment: consumed to end-of-file, no diagnostic.
            true
        }
        _ => false,
    }
}

/// Skips whitespace and comments in any order until neither remains.
pub fn skip_trivia(cursor: &mut Cursor<'_>) {
    loop {
        let before = cursor.position();
        cursor.skip_whitespace();
        skip_comment(cursor);
        if cursor.position() == before {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_line_comment_up_to_newline() {
        let mut c = Cursor::new("// hello\nint");
        skip_trivia(&mut c);
        assert_eq!(c.current_char(), '\n');
    }

    #[test]
    fn skips_block_comment_across_lines() {
        let mut c = Cursor::new("/* a\nb */int");
        skip_trivia(&mut c);
        assert_eq!(c.current_char(), 'i');
        assert_eq!(c.line(), 2);
    }

    #[test]
    fn skips_interleaved_whitespace_and_comments() {
        let mut c = Cursor::new("  /* x */  // y\n  int");
        skip_trivia(&mut c);
        assert_eq!(c.current_char(), 'i');
    }

    #[test]
    fn unterminated_block_comment_consumes_to_eof() {
        let mut c = Cursor::new("/* never closes");
        skip_trivia(&mut c);
        assert!(c.is_at_end());
    }

    #[test]
    fn single_slash_is_not_a_comment() {
        let mut c = Cursor::new("/ x");
        assert!(!skip_comment(&mut c));
        assert_eq!(c.current_char(), '/');
    }
}
