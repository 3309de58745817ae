//! Candidate code: template rendering plus the provenance stamp.
//!
//! Generation is two-phase. The template output is hashed first, then the
//! `@Generated(hash = N)` marker is placed in front of the declaration. The
//! marker never contributes to its own hash, matching how the parser verifies
//! it later.

use std::borrow::Cow;
use std::collections::BTreeMap;

use entigen_core::hash::structural_hash;
use serde_json::{Map, Value};
use thiserror::Error;

/// Values handed to a template, keyed by placeholder name.
pub type Bindings = Map<String, Value>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("unknown template '{0}'")]
    UnknownTemplate(String),

    #[error("template '{template}' references unbound placeholder '{key}'")]
    MissingBinding { template: String, key: String },

    #[error("template '{template}' has an unterminated placeholder")]
    Unterminated { template: String },
}

/// Produces declaration text for a template id.
pub trait TemplateRenderer {
    /// # Errors
    /// Returns `TemplateError` when the template is unknown or cannot be
    /// filled from `bindings`.
    fn render(&self, template_id: &str, bindings: &Bindings) -> Result<String, TemplateError>;
}

/// In-memory templates with `{{name}}` placeholders.
///
/// String bindings are inserted verbatim, anything else as compact JSON.
#[derive(Debug, Clone, Default)]
pub struct PlaceholderRenderer {
    templates: BTreeMap<String, String>,
}

impl PlaceholderRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_template(mut self, id: impl Into<String>, body: impl Into<String>) -> Self {
        self.templates.insert(id.into(), body.into());
        self
    }
}

impl TemplateRenderer for PlaceholderRenderer {
    fn render(&self, template_id: &str, bindings: &Bindings) -> Result<String, TemplateError> {
        let body = self
            .templates
            .get(template_id)
            .ok_or_else(|| TemplateError::UnknownTemplate(template_id.to_string()))?;

        let mut out = String::with_capacity(body.len());
        let mut rest = body.as_str();
        while let Some(open) = rest.find("{{") {
            out.push_str(&rest[..open]);
            let after = &rest[open + 2..];
            let close = after.find("}}").ok_or_else(|| TemplateError::Unterminated {
                template: template_id.to_string(),
            })?;
            let key = after[..close].trim();
            match bindings.get(key) {
                Some(Value::String(text)) => out.push_str(text),
                Some(other) => out.push_str(&other.to_string()),
                None => {
                    return Err(TemplateError::MissingBinding {
                        template: template_id.to_string(),
                        key: key.to_string(),
                    });
                }
            }
            rest = &after[close + 2..];
        }
        out.push_str(rest);
        Ok(out)
    }
}

/// A stamped declaration ready for the merge engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedCode {
    pub text: String,
    pub hash: i32,
}

impl GeneratedCode {
    /// Render `template_id` and stamp the result.
    ///
    /// # Errors
    /// Propagates the renderer's `TemplateError`.
    pub fn render(
        renderer: &dyn TemplateRenderer,
        template_id: &str,
        bindings: &Bindings,
    ) -> Result<Self, TemplateError> {
        let text = renderer.render(template_id, bindings)?;
        Ok(Self::stamp(&text))
    }

    /// Hash `text` and insert the `@Generated` marker after its leading
    /// comments and blank lines.
    #[must_use]
    pub fn stamp(text: &str) -> Self {
        let hash = structural_hash(text);
        let split = leading_comments_end(text);
        let (comments, declaration) = text.split_at(split);
        let declaration = declaration.trim_start();
        let text = format!("{comments}@Generated(hash = {hash})\n{declaration}");
        Self { text, hash }
    }

    /// `text` as given when it already carries a provenance marker, stamped
    /// otherwise.
    #[must_use]
    pub fn ensure_stamped(text: &str) -> Cow<'_, str> {
        if has_provenance_marker(text) {
            Cow::Borrowed(text)
        } else {
            Cow::Owned(Self::stamp(text).text)
        }
    }
}

impl AsRef<str> for GeneratedCode {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

/// Whether one of the annotations in front of the declaration is
/// `@Generated` or `@Keep`, by simple name.
#[must_use]
pub fn has_provenance_marker(text: &str) -> bool {
    let mut rest = text[leading_comments_end(text)..].trim_start();
    while let Some(after_at) = rest.strip_prefix('@') {
        let name_len = after_at
            .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '$' || c == '.'))
            .unwrap_or(after_at.len());
        let name = &after_at[..name_len];
        if matches!(name.rsplit('.').next(), Some("Generated" | "Keep")) {
            return true;
        }

        rest = after_at[name_len..].trim_start();
        if rest.starts_with('(') {
            let Some(close) = closing_paren(rest) else {
                return false;
            };
            rest = rest[close + 1..].trim_start();
        }
    }
    false
}

/// Offset of the `)` matching the `(` that opens `text`.
fn closing_paren(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote = None;
    let mut escaped = false;
    for (offset, c) in text.char_indices() {
        if let Some(open) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == open {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' => depth += 1,
            ')' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(offset);
                }
            }
            _ => {}
        }
    }
    None
}

/// Byte offset where the first line that is not a comment or blank starts.
fn leading_comments_end(text: &str) -> usize {
    let mut offset = 0;
    let mut in_block = false;
    for line in text.split_inclusive('\n') {
        let trimmed = line.trim();
        let is_comment = if in_block {
            if trimmed.contains("*/") {
                in_block = false;
            }
            true
        } else if trimmed.starts_with("/*") {
            in_block = !trimmed.contains("*/");
            true
        } else {
            trimmed.is_empty() || trimmed.starts_with("//")
        };
        if !is_comment {
            break;
        }
        offset += line.len();
    }
    offset
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn bindings(value: Value) -> Bindings {
        match value {
            Value::Object(map) => map,
            _ => Bindings::new(),
        }
    }

    #[test]
    fn placeholders_are_filled() {
        let renderer = PlaceholderRenderer::new()
            .with_template("getter", "public {{type}} get{{Name}}() {\n    return {{ name }};\n}");
        let text = renderer
            .render(
                "getter",
                &bindings(json!({"type": "long", "Name": "Id", "name": "id"})),
            )
            .expect("should render");
        assert_eq!(text, "public long getId() {\n    return id;\n}");
    }

    #[test]
    fn non_string_bindings_render_as_json() {
        let renderer = PlaceholderRenderer::new().with_template("const", "int LIMIT = {{limit}};");
        let text = renderer
            .render("const", &bindings(json!({"limit": 25})))
            .expect("should render");
        assert_eq!(text, "int LIMIT = 25;");
    }

    #[test]
    fn render_errors() {
        let renderer = PlaceholderRenderer::new()
            .with_template("a", "{{missing}}")
            .with_template("b", "{{open");
        let empty = Bindings::new();
        assert_eq!(
            renderer.render("nope", &empty),
            Err(TemplateError::UnknownTemplate("nope".to_string()))
        );
        assert!(matches!(
            renderer.render("a", &empty),
            Err(TemplateError::MissingBinding { ref key, .. }) if key == "missing"
        ));
        assert!(matches!(
            renderer.render("b", &empty),
            Err(TemplateError::Unterminated { .. })
        ));
    }

    #[test]
    fn stamp_goes_after_javadoc() {
        let code = GeneratedCode::stamp("/**\n * Full constructor.\n */\npublic Note(long id) {\n    this.id = id;\n}");
        assert!(
            code.text
                .starts_with("/**\n * Full constructor.\n */\n@Generated(hash = ")
        );
        assert!(code.text.ends_with(")\npublic Note(long id) {\n    this.id = id;\n}"));
    }

    #[test]
    fn hash_ignores_marker_and_comments() {
        let plain = GeneratedCode::stamp("public Note() {\n}");
        let documented = GeneratedCode::stamp("/** Default. */\npublic Note() { }");
        assert_eq!(plain.hash, documented.hash);
        assert_eq!(plain.hash, structural_hash("public Note() {}"));
        assert_eq!(
            plain.text,
            format!("@Generated(hash = {})\npublic Note() {{\n}}", plain.hash)
        );
    }

    #[test]
    fn marked_candidates_are_not_stamped_twice() {
        let stamped = GeneratedCode::stamp("/** Id. */\npublic long getId() {\nreturn id;\n}");
        assert!(matches!(
            GeneratedCode::ensure_stamped(&stamped.text),
            Cow::Borrowed(_)
        ));

        let after_other = "@Override\n@io.objectbox.annotation.Generated(hash = 7)\npublic String toString() {\nreturn \"(\";\n}";
        assert!(has_provenance_marker(after_other));
        assert!(has_provenance_marker("@SuppressWarnings(\"unused\") @Keep int legacy;"));
    }

    #[test]
    fn unmarked_candidates_are_stamped() {
        let plain = "public long getId() {\nreturn id;\n}";
        assert!(!has_provenance_marker(plain));
        assert!(!has_provenance_marker("@Override\npublic String toString() {\nreturn \"@Generated\";\n}"));
        assert_eq!(
            GeneratedCode::ensure_stamped(plain),
            Cow::<str>::Owned(GeneratedCode::stamp(plain).text)
        );
    }

    #[test]
    fn render_then_stamp() {
        let renderer = PlaceholderRenderer::new().with_template("ctor", "public {{entity}}() {\n}");
        let code = GeneratedCode::render(&renderer, "ctor", &bindings(json!({"entity": "Note"})))
            .expect("should render");
        assert_eq!(code, GeneratedCode::stamp("public Note() {\n}"));
    }
}
