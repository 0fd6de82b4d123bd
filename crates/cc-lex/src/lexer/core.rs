//! `Tokenizer`: the driving loop. Reads a file, walks it with a
//! [`Cursor`], and appends tokens to a [`TokenStore`], recursing into each
//! quoted `#include` it finds (depth-limited, de-duplicated case-
//! insensitively by resolved path) and tracking `#define NAME VALUE`
//! integer substitutions along the way.

use std::fs;
use std::path::{Path, PathBuf};

use cc_util::{FileId, FxHashMap, FxHashSet};

use super::comment::skip_trivia;
use super::identifier::scan_run;
use super::number::lex_number;
use super::punctuation::is_punctuation;
use super::string::{lex_char, lex_string};
use crate::cursor::Cursor;
use crate::preprocessor::{parse_directive, Directive};
use crate::{file_registry::FileRegistry, store::TokenStore};

/// `#include` chains deeper than this are treated as the file simply not
/// being found — keeps worst-case cost bounded on pathological inputs.
const MAX_INCLUDE_DEPTH: u32 = 200;

pub struct Tokenizer<'a> {
    store: &'a mut TokenStore,
    files: &'a mut FileRegistry,
    defines: FxHashMap<String, String>,
    seen: FxHashSet<String>,
    depth: u32,
}

impl<'a> Tokenizer<'a> {
    pub fn new(store: &'a mut TokenStore, files: &'a mut FileRegistry) -> Self {
        Self {
            store,
            files,
            defines: FxHashMap::default(),
            seen: FxHashSet::default(),
            depth: 0,
        }
    }

    /// Tokenizes `path` as the top-level translation unit. Returns `false`
    /// if the file could not be opened (fails silently here; the caller
    /// decides whether to surface a "cannot open" line).
    pub fn tokenize_top_level(&mut self, path: &str) -> bool {
        self.tokenize_file(Path::new(path), None)
    }

    fn tokenize_file(&mut self, path: &Path, including_dir: Option<&Path>) -> bool {
        let resolved = match including_dir {
            Some(dir) => dir.join(path),
            None => path.to_path_buf(),
        };
        let key = resolved.to_string_lossy().to_lowercase();
        if self.seen.contains(&key) {
            return true;
        }
        let Ok(source) = fs::read_to_string(&resolved) else {
            return false;
        };
        if self.depth >= MAX_INCLUDE_DEPTH {
            return false;
        }
        self.seen.insert(key);
        let file_id = self.files.push(resolved.to_string_lossy().into_owned());
        let base_dir = resolved.parent().map(Path::to_path_buf);

        self.depth += 1;
        self.lex_source(&source, file_id, base_dir.as_deref());
        self.depth -= 1;
        true
    }

    fn lex_source(&mut self, source: &str, file_id: FileId, base_dir: Option<&Path>) {
        let mut cursor = Cursor::new(source);
        loop {
            skip_trivia(&mut cursor);
            if cursor.is_at_end() {
                break;
            }
            let line = cursor.line();
            let c = cursor.current_char();
            if c == '#' {
                self.lex_directive(&mut cursor, file_id, line, base_dir);
                continue;
            }
            if c == '"' {
                let lexeme = lex_string(&mut cursor);
                self.store.create_at_end(lexeme, file_id, line);
                continue;
            }
            if c == '\'' {
                let lexeme = lex_char(&mut cursor);
                self.store.create_at_end(lexeme, file_id, line);
                continue;
            }
            if is_punctuation(c) {
                cursor.advance();
                self.store.create_at_end(c.to_string(), file_id, line);
                continue;
            }
            if c.is_ascii_digit() {
                let lexeme = lex_number(&mut cursor);
                self.store.create_at_end(lexeme, file_id, line);
                continue;
            }
            let raw = scan_run(&mut cursor);
            if raw.is_empty() {
                // Defensive: an unrecognized character that isn't
                // whitespace, punctuation, digit or quote. Skip it so the
                // loop always makes progress.
                cursor.advance();
                continue;
            }
            let lexeme = self.defines.get(&raw).cloned().unwrap_or(raw);
            self.store.create_at_end(lexeme, file_id, line);
        }
    }

    fn lex_directive(&mut self, cursor: &mut Cursor<'_>, file_id: FileId, line: u32, base_dir: Option<&Path>) {
        debug_assert_eq!(cursor.current_char(), '#');
        cursor.advance();
        let start = cursor.position();
        while !cursor.is_at_end() && cursor.current_char() != '\n' {
            cursor.advance();
        }
        let rest = cursor.slice_from(start).to_string();

        match parse_directive(&rest) {
            Directive::Include(included_path) => {
                self.store.create_at_end("#include", file_id, line);
                self.store.create_at_end(format!("\"{included_path}\""), file_id, line);
                let dir = base_dir.unwrap_or_else(|| Path::new(""));
                self.tokenize_file(&PathBuf::from(included_path), Some(dir));
            }
            Directive::Define(name, value) => {
                self.defines.insert(name, value);
            }
            Directive::Other => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(source: &str) -> Vec<String> {
        let mut store = TokenStore::new();
        let mut files = FileRegistry::new();
        {
            let mut tok = Tokenizer::new(&mut store, &mut files);
            tok.lex_source(source, FileId::TOP_LEVEL, None);
        }
        store.iter().map(|id| store.lexeme(id).to_string()).collect()
    }

    #[test]
    fn lexes_simple_statement() {
        assert_eq!(
            tokenize("int x = 1 ;"),
            vec!["int", "x", "=", "1", ";"]
        );
    }

    #[test]
    fn punctuation_chars_are_individual_tokens() {
        assert_eq!(tokenize("a==b"), vec!["a", "=", "=", "b"]);
    }

    #[test]
    fn string_and_char_literals_keep_delimiters() {
        assert_eq!(tokenize("f(\"hi\", 'x')"), vec!["f", "(", "\"hi\"", ",", "'x'", ")"]);
    }

    #[test]
    fn hex_literal_is_converted_at_lex_time() {
        assert_eq!(tokenize("int x = 0x10 ;"), vec!["int", "x", "=", "16", ";"]);
    }

    #[test]
    fn line_comment_is_discarded() {
        assert_eq!(tokenize("int x; // trailing\nint y;"), vec!["int", "x", ";", "int", "y", ";"]);
    }

    #[test]
    fn block_comment_spans_lines_without_emitting_tokens() {
        let mut store = TokenStore::new();
        let mut files = FileRegistry::new();
        let mut tok = Tokenizer::new(&mut store, &mut files);
        tok.lex_source("int /* a\nb */ x;", FileId::TOP_LEVEL, None);
        let lines: Vec<u32> = store.iter().map(|id| store.get(id).line).collect();
        assert_eq!(lines, vec![1, 2, 2]);
    }

    #[test]
    fn define_substitutes_numeric_macro() {
        let mut store = TokenStore::new();
        let mut files = FileRegistry::new();
        let mut tok = Tokenizer::new(&mut store, &mut files);
        tok.lex_source("#define MAX 10\nint a[MAX];", FileId::TOP_LEVEL, None);
        let lexemes: Vec<String> = store.iter().map(|id| store.lexeme(id).to_string()).collect();
        assert_eq!(lexemes, vec!["int", "a", "[", "10", "]", ";"]);
    }

    #[test]
    fn include_directive_emits_marker_tokens() {
        use std::io::Write;
        let dir = std::env::temp_dir().join(format!("cc-lex-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let header = dir.join("util.h");
        std::fs::File::create(&header).unwrap().write_all(b"int helper;").unwrap();
        let main_path = dir.join("main.c");
        std::fs::File::create(&main_path)
            .unwrap()
            .write_all(b"#include \"util.h\"\nint main(){}")
            .unwrap();

        let mut store = TokenStore::new();
        let mut files = FileRegistry::new();
        let mut tok = Tokenizer::new(&mut store, &mut files);
        assert!(tok.tokenize_top_level(main_path.to_str().unwrap()));

        let lexemes: Vec<String> = store.iter().map(|id| store.lexeme(id).to_string()).collect();
        assert_eq!(lexemes[0], "#include");
        assert_eq!(lexemes[1], "\"util.h\"");
        assert!(lexemes.contains(&"helper".to_string()));
        assert_eq!(files.len(), 2);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_top_level_file_returns_false() {
        let mut store = TokenStore::new();
        let mut files = FileRegistry::new();
        let mut tok = Tokenizer::new(&mut store, &mut files);
        assert!(!tok.tokenize_top_level("/no/such/file.c"));
    }
}
