//! Formatting style for generated code.
//!
//! A `FormatterConfig` value is passed explicitly to every formatting call;
//! there is no ambient formatter state.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

const fn default_indent_size() -> u8 {
    4
}

const fn default_line_width() -> u16 {
    120
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IndentChar {
    #[default]
    Space,
    Tab,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct FormatterConfig {
    #[serde(default)]
    pub indent_char: IndentChar,

    /// Characters per indentation level (ignored for tabs).
    #[serde(default = "default_indent_size")]
    pub indent_size: u8,

    #[serde(default = "default_line_width")]
    pub line_width: u16,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            indent_char: IndentChar::default(),
            indent_size: default_indent_size(),
            line_width: default_line_width(),
        }
    }
}

impl FormatterConfig {
    /// One level of indentation.
    #[must_use]
    pub fn indent_unit(&self) -> String {
        match self.indent_char {
            IndentChar::Tab => "\t".to_string(),
            IndentChar::Space => " ".repeat(usize::from(self.indent_size)),
        }
    }

    /// `depth` levels of indentation.
    #[must_use]
    pub fn indent(&self, depth: usize) -> String {
        self.indent_unit().repeat(depth)
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.indent_char == IndentChar::Space && !(1..=8).contains(&self.indent_size) {
            return Err(ConfigError::InvalidValue {
                field: "format.indent_size".to_string(),
                reason: format!("must be between 1 and 8, got {}", self.indent_size),
            });
        }
        if self.line_width < 40 {
            return Err(ConfigError::InvalidValue {
                field: "format.line_width".to_string(),
                reason: format!("must be at least 40, got {}", self.line_width),
            });
        }
        Ok(())
    }
}

/// Detect the indentation style of existing source.
///
/// Javadoc continuation lines (` * ...`) are skipped. Falls back to the
/// defaults when the source has no indented code lines.
#[must_use]
pub fn detect_style(source: &str) -> FormatterConfig {
    let mut config = FormatterConfig::default();
    let mut smallest: Option<usize> = None;

    for line in source.lines() {
        let content = line.trim_start();
        if content.is_empty() || content.starts_with('*') {
            continue;
        }
        let leading = &line[..line.len() - content.len()];
        if leading.is_empty() {
            continue;
        }
        if leading.starts_with('\t') {
            config.indent_char = IndentChar::Tab;
            config.indent_size = 1;
            return config;
        }
        let width = leading.chars().filter(|c| *c == ' ').count();
        if width > 0 {
            smallest = Some(smallest.map_or(width, |s| s.min(width)));
        }
    }

    if let Some(width) = smallest.and_then(|w| u8::try_from(w).ok())
        && (1..=8).contains(&width)
    {
        config.indent_size = width;
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_two_space_indent() {
        let source = "class A {\n  int a;\n\n  void b() {\n    a = 1;\n  }\n}\n";
        let style = detect_style(source);
        assert_eq!(style.indent_char, IndentChar::Space);
        assert_eq!(style.indent_size, 2);
        assert_eq!(style.indent(2), "    ");
    }

    #[test]
    fn detects_tabs() {
        let style = detect_style("class A {\n\tint a;\n}\n");
        assert_eq!(style.indent_char, IndentChar::Tab);
        assert_eq!(style.indent_unit(), "\t");
    }

    #[test]
    fn javadoc_continuation_lines_are_ignored() {
        let source = "/**\n * doc\n */\nclass A {\n    int a;\n}\n";
        assert_eq!(detect_style(source).indent_size, 4);
    }

    #[test]
    fn unindented_source_keeps_defaults() {
        assert_eq!(detect_style("class A {}"), FormatterConfig::default());
    }

    #[test]
    fn rejects_bad_values() {
        let config = FormatterConfig {
            indent_size: 0,
            ..FormatterConfig::default()
        };
        assert!(config.validate().is_err());
        let narrow = FormatterConfig {
            line_width: 10,
            ..FormatterConfig::default()
        };
        assert!(narrow.validate().is_err());
    }
}
