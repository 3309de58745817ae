//! Owned declaration model lowered from the tree-sitter tree.
//!
//! The visitor and the merge engine both work on these plain structs instead
//! of borrowing ast-grep nodes, so a parsed unit can outlive its tree and be
//! matched exhaustively.

mod lower;

#[cfg(test)]
mod tests;

use std::ops::Range;

use entigen_core::SourceRef;

use crate::parser::{count_syntax_errors, parse_source};

/// Byte span of a node plus its 1-based start line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: u32,
}

impl Span {
    /// Slice of `source` covered by the span; empty when out of bounds.
    #[must_use]
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        source.get(self.start..self.end).unwrap_or_default()
    }

    #[must_use]
    pub const fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    #[must_use]
    pub const fn to_source_ref(self) -> SourceRef {
        SourceRef {
            line: self.line,
            start: self.start,
            end: self.end,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    /// Dotted path without `import`, `static`, the trailing `.*` or `;`.
    pub path: String,
    pub is_static: bool,
    pub is_wildcard: bool,
    pub span: Span,
}

/// One parsed `.java` file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompilationUnit {
    pub package: Option<String>,
    pub package_span: Option<Span>,
    pub imports: Vec<Import>,
    pub types: Vec<TypeDecl>,
    /// Number of `ERROR` nodes tree-sitter had to insert.
    pub syntax_errors: usize,
}

impl CompilationUnit {
    #[must_use]
    pub fn parse(source: &str) -> Self {
        let tree = parse_source(source);
        let root = tree.root();
        let mut unit = lower::lower_program(&root);
        unit.syntax_errors = count_syntax_errors(&root);
        unit
    }

    /// Package name, empty for the default package.
    #[must_use]
    pub fn package_name(&self) -> &str {
        self.package.as_deref().unwrap_or_default()
    }

    /// Find a type by simple name: top-level types first, then nested ones.
    #[must_use]
    pub fn find_type(&self, name: &str) -> Option<&TypeDecl> {
        self.types
            .iter()
            .find(|t| t.name == name)
            .or_else(|| self.types.iter().find_map(|t| t.find_nested(name)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
    Record,
    Annotation,
}

/// Modifier keywords and annotations of a declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub keywords: Vec<String>,
    pub annotations: Vec<Annotation>,
}

impl Modifiers {
    #[must_use]
    pub fn has_keyword(&self, keyword: &str) -> bool {
        self.keywords.iter().any(|k| k == keyword)
    }

    #[must_use]
    pub fn is_static(&self) -> bool {
        self.has_keyword("static")
    }

    #[must_use]
    pub fn is_transient(&self) -> bool {
        self.has_keyword("transient")
    }

    #[must_use]
    pub fn is_private(&self) -> bool {
        self.has_keyword("private")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    pub name: String,
    pub kind: TypeKind,
    pub modifiers: Modifiers,
    pub members: Vec<Declaration>,
    pub span: Span,
    /// The `{ ... }` body including both braces.
    pub body: Span,
    pub doc: Option<Span>,
}

impl TypeDecl {
    /// Declared `static`, or a kind that is implicitly static when nested.
    #[must_use]
    pub fn is_effectively_static(&self) -> bool {
        self.kind != TypeKind::Class || self.modifiers.is_static()
    }

    /// Names of the types declared directly in this body.
    pub fn nested_type_names(&self) -> impl Iterator<Item = &str> {
        self.members.iter().filter_map(|member| match member {
            Declaration::NestedType(nested) => Some(nested.name.as_str()),
            _ => None,
        })
    }

    fn find_nested(&self, name: &str) -> Option<&Self> {
        self.members.iter().find_map(|member| match member {
            Declaration::NestedType(nested) if nested.name == name => Some(nested),
            Declaration::NestedType(nested) => nested.find_nested(name),
            _ => None,
        })
    }
}

/// Member of a type body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    Field(FieldDecl),
    Method(MethodDecl),
    Constructor(ConstructorDecl),
    NestedType(TypeDecl),
}

impl Declaration {
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Field(field) => field.span,
            Self::Method(method) => method.span,
            Self::Constructor(ctor) => ctor.span,
            Self::NestedType(nested) => nested.span,
        }
    }

    #[must_use]
    pub const fn doc(&self) -> Option<Span> {
        match self {
            Self::Field(field) => field.doc,
            Self::Method(method) => method.doc,
            Self::Constructor(ctor) => ctor.doc,
            Self::NestedType(nested) => nested.doc,
        }
    }

    #[must_use]
    pub const fn modifiers(&self) -> &Modifiers {
        match self {
            Self::Field(field) => &field.modifiers,
            Self::Method(method) => &method.modifiers,
            Self::Constructor(ctor) => &ctor.modifiers,
            Self::NestedType(nested) => &nested.modifiers,
        }
    }

    /// The declaration span widened to include its javadoc.
    #[must_use]
    pub fn extent(&self) -> Range<usize> {
        let span = self.span();
        let start = self.doc().map_or(span.start, |doc| doc.start.min(span.start));
        start..span.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declarator {
    pub name: String,
    /// C-style array brackets after the name, e.g. `[]` in `int a[];`.
    pub dimensions: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    pub modifiers: Modifiers,
    pub type_text: String,
    pub declarators: Vec<Declarator>,
    pub span: Span,
    pub doc: Option<Span>,
}

impl FieldDecl {
    /// The full type of one declarator, folding in its own dimensions.
    #[must_use]
    pub fn type_of(&self, declarator: &Declarator) -> String {
        format!("{}{}", self.type_text, declarator.dimensions)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Type as written; varargs are spelled `T...`.
    pub type_text: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDecl {
    pub name: String,
    pub modifiers: Modifiers,
    pub return_type: String,
    pub parameters: Vec<Parameter>,
    pub span: Span,
    pub doc: Option<Span>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructorDecl {
    pub name: String,
    pub modifiers: Modifiers,
    pub parameters: Vec<Parameter>,
    pub span: Span,
    pub doc: Option<Span>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// Name as written, simple or dotted.
    pub name: String,
    pub arguments: AnnotationArguments,
    pub span: Span,
}

impl Annotation {
    /// Last segment of the written name.
    #[must_use]
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotationArguments {
    /// `@X` or `@X()`.
    Marker,
    /// `@X(value)`.
    Single(ElementValue),
    /// `@X(a = 1, b = "c")`.
    Normal(Vec<(String, ElementValue)>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementValue {
    String(String),
    Integer(i64),
    Boolean(bool),
    /// Class literal; the type as written, without `.class`.
    Class(String),
    Array(Vec<ElementValue>),
    Annotation(Box<Annotation>),
    /// Anything else (constants, enum references, arithmetic), as written.
    Expression(String),
}
