//! Character cursor the C/C++ tokenizer drives its dispatch from.
//!
//! `Cursor` walks a translation unit's source text one character at a
//! time, tracking the line number every token gets stamped with. Byte
//! offsets, not the UTF-8 character count, decide `is_at_end` and
//! `slice_from`, since identifiers, numbers, and punctuation in C source
//! are themselves ASCII even when the file carries wide string or
//! comment text that isn't.

/// A cursor for traversing source code character by character.
pub struct Cursor<'a> {
    /// The source text being traversed.
    source: &'a str,

    /// Current byte position in the source.
    position: usize,

    /// Current line number (1-based), stamped onto every token the
    /// lexer produces while the cursor sits on that line.
    line: u32,
}

impl<'a> Cursor<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source, position: 0, line: 1 }
    }

    /// Returns the current character at the cursor position, or `'\0'`
    /// past the end — the lexer's dispatch loop treats that as "stop".
    pub fn current_char(&self) -> char {
        self.char_at(0)
    }

    /// Character at the given byte offset from the current position.
    #[inline]
    pub fn char_at(&self, offset: usize) -> char {
        let pos = self.position + offset;
        if pos >= self.source.len() {
            return '\0';
        }

        let b = self.source.as_bytes()[pos];
        if b < 128 {
            return b as char;
        }

        self.source[pos..].chars().next().unwrap_or('\0')
    }

    /// Looks `offset` characters ahead without moving the cursor — used
    /// to tell `//` from `/*` and a plain `/` from both.
    #[inline]
    pub fn peek_char(&self, offset: usize) -> char {
        self.char_at(offset)
    }

    /// Advances the cursor to the next character, bumping the line
    /// counter on `\n`. Does nothing once at the end of the source.
    #[inline]
    pub fn advance(&mut self) {
        if self.position >= self.source.len() {
            return;
        }

        let b = self.source.as_bytes()[self.position];
        if b < 128 {
            self.position += 1;
            if b == b'\n' {
                self.line += 1;
            }
            return;
        }

        if let Some(c) = self.source[self.position..].chars().next() {
            self.position += c.len_utf8();
            if c == '\n' {
                self.line += 1;
            }
        }
    }

    /// Advances the cursor by `count` characters, stopping early at the
    /// end of the source (used to skip the two-character `//`/`/*`
    /// and `*/` markers in one call).
    pub fn advance_n(&mut self, count: usize) {
        for _ in 0..count {
            if self.is_at_end() {
                break;
            }
            self.advance();
        }
    }

    pub fn is_at_end(&self) -> bool {
        self.position >= self.source.len()
    }

    /// Skips whitespace, including Unicode whitespace, but not comments —
    /// comment skipping is a separate pass so directives starting right
    /// after a comment still see it as an unbroken run of blanks.
    pub fn skip_whitespace(&mut self) {
        while !self.is_at_end() && self.current_char().is_whitespace() {
            self.advance();
        }
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Slice of the source from `start` to the cursor's current
    /// position — how identifiers, string literals, and `#` directive
    /// lines are captured once their extent is known.
    pub fn slice_from(&self, start: usize) -> &'a str {
        &self.source[start..self.position]
    }
}
