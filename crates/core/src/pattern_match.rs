//! Wildcard pattern matching for LIKE clauses.
//!
//! Patterns use two wildcards:
//! - `*` matches zero or more characters
//! - `?` matches exactly one character
//!
//! A backslash makes the next character literal (`\*`, `\?`, `\\`).
//! The whole value must match; there is no implicit leading or trailing `*`.

use crate::value::CaseSensitivity;
use alloc::vec::Vec;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Token {
    AnySequence,
    AnyChar,
    Literal(char),
}

fn tokenize(pattern: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = pattern.chars();
    while let Some(ch) = chars.next() {
        let token = match ch {
            '*' => Token::AnySequence,
            '?' => Token::AnyChar,
            // A trailing backslash stands for itself
            '\\' => Token::Literal(chars.next().unwrap_or('\\')),
            c => Token::Literal(c),
        };
        // Collapse runs of `*`
        if token == Token::AnySequence && tokens.last() == Some(&Token::AnySequence) {
            continue;
        }
        tokens.push(token);
    }
    tokens
}

fn chars_equal(a: char, b: char, case: CaseSensitivity) -> bool {
    match case {
        CaseSensitivity::Sensitive => a == b,
        CaseSensitivity::Insensitive => a == b || a.to_lowercase().eq(b.to_lowercase()),
    }
}

/// Wildcard pattern matching.
///
/// ```
/// use tether_core::pattern_match::like;
/// use tether_core::CaseSensitivity;
///
/// assert!(like("0A", "?A", CaseSensitivity::Sensitive));
/// assert!(like("Streets", "*s", CaseSensitivity::Sensitive));
/// assert!(!like("0A", "A", CaseSensitivity::Sensitive));
/// assert!(like("abc", "A*", CaseSensitivity::Insensitive));
/// ```
pub fn like(value: &str, pattern: &str, case: CaseSensitivity) -> bool {
    let v: Vec<char> = value.chars().collect();
    let p = tokenize(pattern);

    let (mut vi, mut pi) = (0usize, 0usize);
    // Position of the last `*` seen and the value index it is currently covering up to
    let mut backtrack: Option<(usize, usize)> = None;

    while vi < v.len() {
        match p.get(pi) {
            Some(Token::AnyChar) => {
                vi += 1;
                pi += 1;
            }
            Some(Token::Literal(c)) if chars_equal(v[vi], *c, case) => {
                vi += 1;
                pi += 1;
            }
            Some(Token::AnySequence) => {
                backtrack = Some((pi, vi));
                pi += 1;
            }
            _ => match backtrack {
                Some((star, covered)) => {
                    // Let the last `*` swallow one more character and retry
                    pi = star + 1;
                    vi = covered + 1;
                    backtrack = Some((star, covered + 1));
                }
                None => return false,
            },
        }
    }

    p[pi..].iter().all(|t| *t == Token::AnySequence)
}
