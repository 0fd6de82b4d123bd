//! The preprocessor subset this tokenizer understands: quoted `#include`
//! resolution and object-like `#define` of integer literals. Pure line-level
//! parsing, deliberately ignorant of everything a real preprocessor does
//! (macro functions, conditionals, token pasting).

/// The result of parsing a `#` directive line (the text after `#` and any
/// following whitespace, up to but not including the newline).
pub enum Directive {
    /// `#include "path"` — angle-bracket includes are ignored entirely.
    Include(String),
    /// `#define NAME VALUE` where VALUE is a decimal or hex integer literal.
    Define(String, String),
    /// Anything else: unrecognized directive or malformed include/define.
    Other,
}

pub fn parse_directive(rest_of_line: &str) -> Directive {
    let trimmed = rest_of_line.trim_start();
    if let Some(after) = trimmed.strip_prefix("include") {
        let after = after.trim_start();
        if let Some(quoted) = after.strip_prefix('"') {
            if let Some(end) = quoted.find('"') {
                return Directive::Include(quoted[..end].to_string());
            }
        }
        // `#include <...>` or malformed — angle-bracket includes are ignored.
        return Directive::Other;
    }
    if let Some(after) = trimmed.strip_prefix("define") {
        let after = after.trim_start();
        let mut parts = after.split_whitespace();
        let name = parts.next();
        let value = parts.next();
        if let (Some(name), Some(value)) = (name, value) {
            if is_integer_literal(value) {
                return Directive::Define(name.to_string(), normalize_integer_literal(value));
            }
        }
        return Directive::Other;
    }
    Directive::Other
}

fn is_integer_literal(s: &str) -> bool {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        return !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit());
    }
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

fn normalize_integer_literal(s: &str) -> String {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        if let Ok(value) = u64::from_str_radix(hex, 16) {
            return value.to_string();
        }
    }
    s.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn include_path(d: Directive) -> String {
        match d {
            Directive::Include(p) => p,
            _ => panic!("expected Include"),
        }
    }

    fn define_pair(d: Directive) -> (String, String) {
        match d {
            Directive::Define(n, v) => (n, v),
            _ => panic!("expected Define"),
        }
    }

    #[test]
    fn parses_quoted_include() {
        assert_eq!(include_path(parse_directive("include \"util.h\"")), "util.h");
    }

    #[test]
    fn angle_bracket_include_is_ignored() {
        assert!(matches!(parse_directive("include <stdio.h>"), Directive::Other));
    }

    #[test]
    fn parses_decimal_define() {
        assert_eq!(
            define_pair(parse_directive("define MAX 100")),
            ("MAX".to_string(), "100".to_string())
        );
    }

    #[test]
    fn parses_hex_define_as_decimal() {
        assert_eq!(
            define_pair(parse_directive("define MASK 0xFF")),
            ("MASK".to_string(), "255".to_string())
        );
    }

    #[test]
    fn define_with_non_integer_value_is_ignored() {
        assert!(matches!(parse_directive("define GREETING \"hi\""), Directive::Other));
    }

    #[test]
    fn unknown_directive_is_ignored() {
        assert!(matches!(parse_directive("pragma once"), Directive::Other));
    }
}
