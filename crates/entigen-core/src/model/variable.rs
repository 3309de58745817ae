use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use thiserror::Error;

const JAVA_KEYWORDS: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "final", "finally", "float",
    "for", "goto", "if", "implements", "import", "instanceof", "int", "interface", "long", "native",
    "new", "package", "private", "protected", "public", "return", "short", "static", "strictfp",
    "super", "switch", "synchronized", "this", "throw", "throws", "transient", "try", "void",
    "volatile", "while", "true", "false", "null",
];

/// A resolved type reference.
///
/// Identity is the qualified name plus the primitive flag; the original
/// spelling is kept for display and code generation only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableType {
    pub qualified_name: String,
    pub is_primitive: bool,
    pub original_spelling: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_arguments: Vec<VariableType>,
}

impl VariableType {
    /// A primitive type such as `int` or `long`.
    #[must_use]
    pub fn primitive(token: &str) -> Self {
        Self {
            qualified_name: token.to_string(),
            is_primitive: true,
            original_spelling: token.to_string(),
            type_arguments: Vec::new(),
        }
    }

    /// A reference type.
    #[must_use]
    pub fn object(
        qualified_name: impl Into<String>,
        original_spelling: impl Into<String>,
        type_arguments: Vec<Self>,
    ) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            is_primitive: false,
            original_spelling: original_spelling.into(),
            type_arguments,
        }
    }

    /// Primitive `long`, the type of synthesised foreign-key properties.
    #[must_use]
    pub fn long() -> Self {
        Self::primitive("long")
    }

    /// The last segment of the qualified name, e.g. `List` for `java.util.List`.
    #[must_use]
    pub fn simple_name(&self) -> &str {
        self.qualified_name
            .rsplit('.')
            .next()
            .unwrap_or(&self.qualified_name)
    }

    #[must_use]
    pub fn is_array(&self) -> bool {
        self.qualified_name.ends_with("[]")
    }

    /// First type argument, e.g. `Customer` in `ToOne<Customer>`.
    #[must_use]
    pub fn first_argument(&self) -> Option<&Self> {
        self.type_arguments.first()
    }
}

impl PartialEq for VariableType {
    fn eq(&self, other: &Self) -> bool {
        self.qualified_name == other.qualified_name && self.is_primitive == other.is_primitive
    }
}

impl Eq for VariableType {}

impl Hash for VariableType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.qualified_name.hash(state);
        self.is_primitive.hash(state);
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("'{0}' is not a valid Java identifier")]
pub struct InvalidIdentifier(pub String);

/// Whether `name` can be used as a Java variable name.
#[must_use]
pub fn is_java_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_alphabetic() || first == '_' || first == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
        && !JAVA_KEYWORDS.contains(&name)
}

/// A typed, named variable: a field, parameter, or relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub ty: VariableType,
    pub name: String,
}

impl Variable {
    /// # Errors
    /// Returns `InvalidIdentifier` when `name` is not a Java identifier.
    pub fn new(ty: VariableType, name: impl Into<String>) -> Result<Self, InvalidIdentifier> {
        let name = name.into();
        if !is_java_identifier(&name) {
            return Err(InvalidIdentifier(name));
        }
        Ok(Self { ty, name })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_ignores_spelling() {
        let a = VariableType::object("java.util.List", "List", Vec::new());
        let b = VariableType::object("java.util.List", "java.util.List", Vec::new());
        assert_eq!(a, b);
        assert_ne!(VariableType::primitive("long"), VariableType::object("long", "long", Vec::new()));
    }

    #[test]
    fn simple_name_is_last_segment() {
        let ty = VariableType::object("com.example.Order.Status", "Status", Vec::new());
        assert_eq!(ty.simple_name(), "Status");
        assert_eq!(VariableType::long().simple_name(), "long");
    }

    #[test]
    fn identifiers_are_validated() {
        assert!(Variable::new(VariableType::long(), "customerId").is_ok());
        assert!(Variable::new(VariableType::long(), "$tmp_1").is_ok());
        assert_eq!(
            Variable::new(VariableType::long(), "class"),
            Err(InvalidIdentifier("class".to_string()))
        );
        assert!(!is_java_identifier("1abc"));
        assert!(!is_java_identifier(""));
    }
}
