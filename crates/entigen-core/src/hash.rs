//! Structural hashing of code fragments.
//!
//! The hash ignores whitespace and comments outside of string and character
//! literals, so re-indenting or reformatting generated code never changes it.
//! The value is the Java `String.hashCode` of the normalised text, which keeps
//! hashes embedded in existing `@Generated(hash = N)` markers verifiable.

use std::ops::Range;

/// Sentinel hash meaning "generated, but do not verify".
pub const NO_CHECK_HASH: i32 = -1;

/// Strip whitespace and comments outside of literals.
#[must_use]
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' | '\'' => {
                out.push(c);
                copy_literal(c, &mut chars, &mut out);
            }
            '/' if chars.peek() == Some(&'/') => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for next in chars.by_ref() {
                    if prev == '*' && next == '/' {
                        break;
                    }
                    prev = next;
                }
            }
            c if c.is_whitespace() => {}
            c => out.push(c),
        }
    }

    out
}

fn copy_literal(quote: char, chars: &mut std::iter::Peekable<std::str::Chars<'_>>, out: &mut String) {
    let mut escaped = false;
    for next in chars.by_ref() {
        out.push(next);
        if escaped {
            escaped = false;
        } else if next == '\\' {
            escaped = true;
        } else if next == quote {
            break;
        }
    }
}

/// Java-compatible `String.hashCode` over UTF-16 code units.
#[must_use]
pub fn java_string_hash(text: &str) -> i32 {
    text.encode_utf16()
        .fold(0_i32, |h, unit| h.wrapping_mul(31).wrapping_add(i32::from(unit)))
}

/// Whitespace- and comment-insensitive hash of a code fragment.
#[must_use]
pub fn structural_hash(text: &str) -> i32 {
    java_string_hash(&normalize(text))
}

/// Compare two fragments ignoring formatting.
#[must_use]
pub fn is_structurally_equal(existing: &str, candidate: &str) -> bool {
    normalize(existing) == normalize(candidate)
}

/// Remove `range` (relative to `text`) before hashing, e.g. the provenance
/// annotation whose literal must not feed into its own hash.
#[must_use]
pub fn strip_range(text: &str, range: Range<usize>) -> String {
    let start = range.start.min(text.len());
    let end = range.end.clamp(start, text.len());
    let mut out = String::with_capacity(text.len() - (end - start));
    out.push_str(&text[..start]);
    out.push_str(&text[end..]);
    out
}
