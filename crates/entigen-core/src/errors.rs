//! Error types shared by the parser, the relation post-processor, and the
//! merge engine.
//!
//! Every variant is fatal to the file or schema being processed. No variant
//! is retryable: they are static-analysis findings that only a source change
//! can resolve.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Where in the user's source an error was found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    pub entity: String,
    pub member: Option<String>,
    pub line: Option<u32>,
}

impl Location {
    #[must_use]
    pub fn entity(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            member: None,
            line: None,
        }
    }

    #[must_use]
    pub fn member(entity: impl Into<String>, member: impl Into<String>, line: Option<u32>) -> Self {
        Self {
            entity: entity.into(),
            member: Some(member.into()),
            line,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.entity)?;
        if let Some(member) = &self.member {
            write!(f, ".{member}")?;
        }
        if let Some(line) = self.line {
            write!(f, " (line {line})")?;
        }
        Ok(())
    }
}

/// Errors raised while modelling entities or merging generated code.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Two or more wildcard imports could supply an unqualified identifier.
    #[error("{location}: ambiguous type '{identifier}', could come from any of: {}", candidates.join(", "))]
    AmbiguousTypeReference {
        location: Location,
        identifier: String,
        candidates: Vec<String>,
    },

    /// A recognised annotation omits a required argument combination.
    #[error("{location}: @{annotation} is missing required arguments: {message}")]
    MissingAnnotationArguments {
        location: Location,
        annotation: String,
        message: String,
    },

    /// An annotation argument has the wrong shape or an unusable value.
    #[error("{location}: invalid value in @{annotation}: {message}")]
    InvalidAnnotationValue {
        location: Location,
        annotation: String,
        message: String,
    },

    /// An inner class of the entity is used where only a static nested type works.
    #[error(
        "{location}: inner class '{type_name}' must be static; \
         non-static inner classes need an enclosing instance the generator cannot supply"
    )]
    UnsupportedInnerType { location: Location, type_name: String },

    /// A `@Generated(hash = N)` declaration no longer matches the recorded hash.
    #[error(
        "{location}: generated code was modified (expected hash {expected}, found {actual}); \
         mark it @Keep to retain the changes or remove it to regenerate"
    )]
    TamperedGeneratedCode {
        location: Location,
        expected: i32,
        actual: i32,
    },

    /// The generator wants to write a declaration whose existing counterpart is unmarked.
    #[error(
        "{location}: a declaration with this signature already exists and is not marked; \
         annotate it with @Keep to retain it, or with @Generated to let it be replaced"
    )]
    UnmarkedConflict { location: Location },

    /// A relation points at a type that is not an entity of the same schema.
    #[error("{location}: relation target '{target}' is not an entity in schema '{schema}'")]
    UnresolvedRelationTarget {
        location: Location,
        target: String,
        schema: String,
    },

    /// A to-many relation has zero, or more than one, linking strategy.
    #[error(
        "{location}: to-many relation needs exactly one of backlink, join properties, \
         or join entity (found {found})"
    )]
    InsufficientRelationSpec { location: Location, found: usize },

    /// One merge pass defined the same declaration twice.
    #[error("{location}: defined more than once in one merge pass")]
    DuplicateDefinition { location: Location },

    /// Two edits of one merge pass touch the same source text.
    #[error("conflicting edits while merging '{type_name}': {message}")]
    ConflictingEdits { type_name: String, message: String },

    /// The merge target type does not exist in the source.
    #[error("type '{type_name}' not found in source")]
    TypeNotFound { type_name: String },

    /// The source could not be parsed well enough to process.
    #[error("Parse failed for {}: {message}", path.display())]
    ParseFailed { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// The source location attached to the error, if any.
    #[must_use]
    pub const fn location(&self) -> Option<&Location> {
        match self {
            Self::AmbiguousTypeReference { location, .. }
            | Self::MissingAnnotationArguments { location, .. }
            | Self::InvalidAnnotationValue { location, .. }
            | Self::UnsupportedInnerType { location, .. }
            | Self::TamperedGeneratedCode { location, .. }
            | Self::UnmarkedConflict { location }
            | Self::DuplicateDefinition { location }
            | Self::UnresolvedRelationTarget { location, .. }
            | Self::InsufficientRelationSpec { location, .. } => Some(location),
            Self::ConflictingEdits { .. }
            | Self::TypeNotFound { .. }
            | Self::ParseFailed { .. }
            | Self::Io(_) => None,
        }
    }
}
