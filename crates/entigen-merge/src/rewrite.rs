//! Buffered text edits over one source string.
//!
//! Edits are recorded against offsets of the original text and applied in a
//! single pass by [`RewriteSession::render`], so earlier edits never shift the
//! offsets of later ones. Insertions at the same offset keep call order.
//! Edits may touch but never overlap.

use std::ops::Range;

use thiserror::Error;

/// An edit starts inside text an earlier edit already rewrites.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("edit at {start}..{end} overlaps an edit ending at {previous_end}")]
pub struct EditOverlap {
    pub start: usize,
    pub end: usize,
    pub previous_end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Edit {
    range: Range<usize>,
    text: String,
    seq: usize,
}

/// Owns the original text and the pending edits against it.
#[derive(Debug, Clone)]
pub struct RewriteSession {
    source: String,
    edits: Vec<Edit>,
}

impl RewriteSession {
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            edits: Vec::new(),
        }
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn insert(&mut self, offset: usize, text: impl Into<String>) {
        self.push(offset..offset, text.into());
    }

    pub fn replace(&mut self, range: Range<usize>, text: impl Into<String>) {
        self.push(range, text.into());
    }

    pub fn remove(&mut self, range: Range<usize>) {
        self.push(range, String::new());
    }

    fn push(&mut self, range: Range<usize>, text: String) {
        let end = range.end.min(self.source.len());
        let start = range.start.min(end);
        let seq = self.edits.len();
        self.edits.push(Edit {
            range: start..end,
            text,
            seq,
        });
    }

    /// Apply every edit to a copy of the original text.
    ///
    /// # Errors
    /// Returns `EditOverlap` when an edit starts inside the range of an
    /// earlier-starting replacement or removal.
    pub fn render(&self) -> Result<String, EditOverlap> {
        let mut edits: Vec<&Edit> = self.edits.iter().collect();
        edits.sort_by_key(|e| (e.range.start, !e.range.is_empty(), e.seq));

        let mut out = String::with_capacity(self.source.len());
        let mut cursor = 0;
        for edit in edits {
            if edit.range.start < cursor {
                return Err(EditOverlap {
                    start: edit.range.start,
                    end: edit.range.end,
                    previous_end: cursor,
                });
            }
            out.push_str(&self.source[cursor..edit.range.start]);
            out.push_str(&edit.text);
            cursor = edit.range.end;
        }
        out.push_str(&self.source[cursor..]);
        Ok(out)
    }
}

/// Widen `range` to whole lines when it is alone on them: leading indentation
/// and the trailing newline are included.
#[must_use]
pub fn whole_lines(source: &str, range: Range<usize>) -> Range<usize> {
    let line_start = source[..range.start].rfind('\n').map_or(0, |i| i + 1);
    let start = if source[line_start..range.start].trim().is_empty() {
        line_start
    } else {
        range.start
    };

    let rest = &source[range.end..];
    let line_end = rest.find('\n').map_or(source.len(), |i| range.end + i + 1);
    let end = if source[range.end..line_end].trim().is_empty() {
        line_end
    } else {
        range.end
    };
    start..end
}

/// Start of the blank line directly above `offset`, if there is one.
#[must_use]
pub fn blank_line_before(source: &str, offset: usize) -> Option<usize> {
    let before = source.get(..offset)?;
    let without_newline = before.strip_suffix('\n')?;
    let line_start = without_newline.rfind('\n').map_or(0, |i| i + 1);
    without_newline[line_start..]
        .trim()
        .is_empty()
        .then_some(line_start)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn edits_apply_against_original_offsets() {
        let mut session = RewriteSession::new("abcdef");
        session.replace(4..6, "XY");
        session.remove(0..1);
        session.insert(2, "-");
        assert_eq!(session.render().as_deref(), Ok("b-cdXY"));
        assert_eq!(session.source(), "abcdef");
    }

    #[test]
    fn insertions_at_one_offset_keep_call_order() {
        let mut session = RewriteSession::new("[]");
        session.insert(1, "a");
        session.insert(1, "b");
        session.insert(1, "c");
        assert_eq!(session.render().as_deref(), Ok("[abc]"));
    }

    #[test]
    fn insertion_before_replacement_at_same_offset() {
        let mut session = RewriteSession::new("xy");
        session.replace(0..1, "Z");
        session.insert(0, ">");
        assert_eq!(session.render().as_deref(), Ok(">Zy"));
    }

    #[test]
    fn overlapping_edits_are_rejected() {
        let mut session = RewriteSession::new("0123456789");
        session.replace(2..6, "_");
        session.replace(4..8, "!");
        assert_eq!(
            session.render(),
            Err(EditOverlap {
                start: 4,
                end: 8,
                previous_end: 6,
            })
        );

        let mut same_range = RewriteSession::new("0123456789");
        same_range.replace(2..6, "a");
        same_range.replace(2..6, "b");
        assert!(same_range.render().is_err());
    }

    #[test]
    fn touching_edits_are_applied() {
        let mut session = RewriteSession::new("0123456789");
        session.replace(2..6, "_");
        session.insert(6, "+");
        session.remove(6..8);
        assert_eq!(session.render().as_deref(), Ok("01_+89"));
    }

    #[test]
    fn whole_lines_covers_indent_and_newline() {
        let source = "class A {\n    int a;\n    int b; // tail\n}\n";
        let a = source.find("int a;").expect("a");
        assert_eq!(&source[whole_lines(source, a..a + 6)], "    int a;\n");

        let b = source.find("int b;").expect("b");
        assert_eq!(&source[whole_lines(source, b..b + 6)], "    int b;");
    }

    #[test]
    fn blank_line_detection() {
        let source = "int a;\n\n    void f() {}\n";
        let f = source.find("    void").expect("f");
        assert_eq!(blank_line_before(source, f), Some(7));
        assert_eq!(blank_line_before(source, 7), None);
    }
}
