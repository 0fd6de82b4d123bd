//! Numeric literal lexing. Hexadecimal integer literals are converted to
//! decimal at lex time; everything else is passed through verbatim
//! (the simplifier's integer fold handles arithmetic later).

use super::identifier::scan_run;
use crate::cursor::Cursor;

/// Scans a number starting at the cursor (already positioned on a decimal
/// digit) and returns its final lexeme, with `0x...`/`0X...` runs
/// rewritten to decimal.
pub fn lex_number(cursor: &mut Cursor<'_>) -> String {
    let raw = scan_run(cursor);
    to_decimal_if_hex(&raw)
}

fn to_decimal_if_hex(raw: &str) -> String {
    if let Some(digits) = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        let hex_digits: String = digits.chars().take_while(|c| c.is_ascii_hexdigit()).collect();
        let suffix = &digits[hex_digits.len()..];
        if let Ok(value) = u64::from_str_radix(&hex_digits, 16) {
            return format!("{value}{suffix}");
        }
    }
    raw.to_string()
}
