//! The punctuation alphabet: each of these characters is its own
//! token at lex time. Multi-character operators (`==`, `->`, `&&`, ...) are
//! fused later, by the simplifier.

pub const PUNCTUATION: &[char] = &[
    '+', '-', '*', '/', '%', '&', '|', '^', '?', '!', '=', '<', '>', '[', ']', '(', ')', '{', '}',
    ';', ':', ',', '.',
];

#[inline]
pub fn is_punctuation(c: char) -> bool {
    PUNCTUATION.contains(&c)
}
