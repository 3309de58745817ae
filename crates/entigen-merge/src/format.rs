//! Re-indentation of generated code before it is spliced into a file.

use entigen_config::FormatterConfig;

/// Lays out a code fragment for insertion at a given nesting depth.
pub trait CodeFormatter {
    /// Format `code` so its outermost lines sit at `depth` indentation
    /// levels. The result has no trailing newline.
    fn format(&self, code: &str, depth: usize, config: &FormatterConfig) -> String;
}

/// Re-indents line by line from brace depth; line breaks are kept as given.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndentFormatter;

impl CodeFormatter for IndentFormatter {
    fn format(&self, code: &str, depth: usize, config: &FormatterConfig) -> String {
        let mut scanner = BraceScanner::default();
        let mut level = 0_usize;
        let mut lines = Vec::new();

        for raw in code.trim_matches('\n').lines() {
            let line = raw.trim();
            if line.is_empty() {
                lines.push(String::new());
                continue;
            }

            let in_comment = scanner.in_block_comment;
            let (opens, closes) = scanner.scan(line);
            let leading_close = !in_comment && line.starts_with('}');
            if leading_close {
                level = level.saturating_sub(1);
            }

            let continuation = if in_comment && line.starts_with('*') { " " } else { "" };
            lines.push(format!("{}{continuation}{line}", config.indent(depth + level)));

            let closes = closes - usize::from(leading_close);
            level = (level + opens).saturating_sub(closes);
        }

        lines.join("\n")
    }
}

/// Counts braces outside literals and comments, carrying block-comment state
/// across lines.
#[derive(Debug, Default)]
struct BraceScanner {
    in_block_comment: bool,
}

impl BraceScanner {
    fn scan(&mut self, line: &str) -> (usize, usize) {
        let mut opens = 0;
        let mut closes = 0;
        let mut chars = line.chars().peekable();
        let mut literal: Option<char> = None;

        while let Some(c) = chars.next() {
            if self.in_block_comment {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    self.in_block_comment = false;
                }
                continue;
            }
            if let Some(quote) = literal {
                if c == '\\' {
                    chars.next();
                } else if c == quote {
                    literal = None;
                }
                continue;
            }
            match c {
                '"' | '\'' => literal = Some(c),
                '/' if chars.peek() == Some(&'/') => break,
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    self.in_block_comment = true;
                }
                '{' => opens += 1,
                '}' => closes += 1,
                _ => {}
            }
        }
        (opens, closes)
    }
}
