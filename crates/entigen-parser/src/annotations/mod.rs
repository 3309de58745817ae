//! Typed extraction of the entity annotations.
//!
//! Each recognised annotation has a shape implementing [`AnnotationShape`].
//! An [`AnnotationSet`] looks up the declaration's annotations by resolved
//! qualified name and hands the matching one's arguments to the shape.

mod shapes;


pub use shapes::{
    ConvertArgs, EntityArgs, GeneratedArgs, IdArgs, IndexArgs, JoinEntityArgs, JoinPropertyArgs, Keep,
    NameInDbArgs, OrderByArgs, RelationArgs, TableArgs, Transient, UidArgs, Unique,
};

use entigen_config::AnnotationConfig;
use entigen_core::{CoreError, Location};
use thiserror::Error;

use crate::resolve::{AmbiguousImport, TypeResolver};
use crate::syntax::{Annotation, AnnotationArguments, ElementValue};

/// Why an annotation could not be shaped.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShapeError {
    #[error("{0}")]
    Missing(String),

    #[error("argument '{key}' {message}")]
    Invalid { key: String, message: String },

    #[error(transparent)]
    Ambiguous(#[from] AmbiguousImport),
}

impl ShapeError {
    pub(crate) fn invalid(key: &str, message: impl Into<String>) -> Self {
        Self::Invalid {
            key: key.to_string(),
            message: message.into(),
        }
    }

    /// Attach the annotation name and source location.
    #[must_use]
    pub fn into_core(self, annotation: &str, location: Location) -> CoreError {
        match self {
            Self::Missing(message) => CoreError::MissingAnnotationArguments {
                location,
                annotation: annotation.to_string(),
                message,
            },
            Self::Invalid { .. } => CoreError::InvalidAnnotationValue {
                location,
                annotation: annotation.to_string(),
                message: self.to_string(),
            },
            Self::Ambiguous(ambiguous) => CoreError::AmbiguousTypeReference {
                location,
                identifier: ambiguous.identifier,
                candidates: ambiguous.candidates,
            },
        }
    }
}

/// A recognised annotation with named arguments and defaults.
pub trait AnnotationShape: Sized {
    /// Simple name, e.g. `Entity`.
    const NAME: &'static str;

    /// # Errors
    /// Returns `ShapeError` for missing required arguments or values of the wrong kind.
    fn from_args(args: &Arguments<'_>) -> Result<Self, ShapeError>;
}

/// Argument access for one annotation occurrence.
///
/// A single-value annotation `@X(v)` exposes `v` under the key `value`.
pub struct Arguments<'a> {
    values: Vec<(&'a str, &'a ElementValue)>,
    resolver: &'a TypeResolver,
}

impl<'a> Arguments<'a> {
    #[must_use]
    pub fn new(annotation: &'a Annotation, resolver: &'a TypeResolver) -> Self {
        let values = match &annotation.arguments {
            AnnotationArguments::Marker => Vec::new(),
            AnnotationArguments::Single(value) => vec![("value", value)],
            AnnotationArguments::Normal(pairs) => {
                pairs.iter().map(|(key, value)| (key.as_str(), value)).collect()
            }
        };
        Self { values, resolver }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&'a ElementValue> {
        self.values
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, value)| *value)
    }

    /// # Errors
    /// Returns `ShapeError::Invalid` when the value is not a string literal.
    pub fn string(&self, key: &str) -> Result<Option<String>, ShapeError> {
        match self.get(key) {
            None => Ok(None),
            Some(ElementValue::String(value)) => Ok(Some(value.clone())),
            Some(other) => Err(ShapeError::invalid(
                key,
                format!("must be a string literal, got {}", describe(other)),
            )),
        }
    }

    /// # Errors
    /// Returns `ShapeError::Invalid` when the value is not `true` or `false`.
    pub fn bool(&self, key: &str) -> Result<Option<bool>, ShapeError> {
        match self.get(key) {
            None => Ok(None),
            Some(ElementValue::Boolean(value)) => Ok(Some(*value)),
            Some(other) => Err(ShapeError::invalid(
                key,
                format!("must be true or false, got {}", describe(other)),
            )),
        }
    }

    /// # Errors
    /// Returns `ShapeError::Invalid` when the value is not an integer literal.
    pub fn int(&self, key: &str) -> Result<Option<i64>, ShapeError> {
        match self.get(key) {
            None => Ok(None),
            Some(ElementValue::Integer(value)) => Ok(Some(*value)),
            Some(other) => Err(ShapeError::invalid(
                key,
                format!("must be an integer literal, got {}", describe(other)),
            )),
        }
    }

    /// Class literal resolved to a qualified name.
    ///
    /// # Errors
    /// Returns `ShapeError::Invalid` for non-class values and
    /// `ShapeError::Ambiguous` when the class name cannot be resolved uniquely.
    pub fn class(&self, key: &str) -> Result<Option<String>, ShapeError> {
        match self.get(key) {
            None => Ok(None),
            Some(ElementValue::Class(written)) => {
                Ok(Some(self.resolver.resolve(written)?.qualified_name))
            }
            Some(other) => Err(ShapeError::invalid(
                key,
                format!("must be a class literal, got {}", describe(other)),
            )),
        }
    }

    /// Array of nested annotations, each shaped as `T`. A lone nested
    /// annotation counts as a one-element array.
    ///
    /// # Errors
    /// Returns `ShapeError::Invalid` when an element is not a `@T`, or the
    /// element's own shaping error.
    pub fn nested<T: AnnotationShape>(&self, key: &str) -> Result<Vec<T>, ShapeError> {
        let elements: Vec<&ElementValue> = match self.get(key) {
            None => return Ok(Vec::new()),
            Some(ElementValue::Array(items)) => items.iter().collect(),
            Some(single) => vec![single],
        };

        elements
            .into_iter()
            .map(|element| match element {
                ElementValue::Annotation(annotation) if annotation.simple_name() == T::NAME => {
                    T::from_args(&Arguments::new(annotation, self.resolver))
                }
                other => Err(ShapeError::invalid(
                    key,
                    format!("must contain @{} annotations, got {}", T::NAME, describe(other)),
                )),
            })
            .collect()
    }
}

fn describe(value: &ElementValue) -> String {
    match value {
        ElementValue::String(s) => format!("string \"{s}\""),
        ElementValue::Integer(i) => format!("integer {i}"),
        ElementValue::Boolean(b) => format!("boolean {b}"),
        ElementValue::Class(c) => format!("class literal {c}.class"),
        ElementValue::Array(_) => "an array".to_string(),
        ElementValue::Annotation(a) => format!("annotation @{}", a.name),
        ElementValue::Expression(e) => format!("expression '{e}'"),
    }
}

/// The annotations on one declaration, with what is needed to resolve them.
pub struct AnnotationSet<'a> {
    annotations: &'a [Annotation],
    resolver: &'a TypeResolver,
    config: &'a AnnotationConfig,
}

impl<'a> AnnotationSet<'a> {
    #[must_use]
    pub const fn new(
        annotations: &'a [Annotation],
        resolver: &'a TypeResolver,
        config: &'a AnnotationConfig,
    ) -> Self {
        Self {
            annotations,
            resolver,
            config,
        }
    }

    /// The annotation that resolves to `qualified`, if present.
    ///
    /// Only annotations whose simple name matches are resolved, so unrelated
    /// annotations never raise ambiguity errors.
    ///
    /// # Errors
    /// Returns `AmbiguousImport` when a candidate's name is ambiguous.
    pub fn find(&self, qualified: &str) -> Result<Option<&'a Annotation>, AmbiguousImport> {
        let simple = qualified.rsplit('.').next().unwrap_or(qualified);
        for annotation in self.annotations {
            if annotation.simple_name() == simple
                && self.resolver.resolve_name(&annotation.name)? == qualified
            {
                return Ok(Some(annotation));
            }
        }
        Ok(None)
    }

    /// Whether an entity annotation named `T::NAME` is present.
    ///
    /// # Errors
    /// Returns `AmbiguousImport` when the annotation name is ambiguous.
    pub fn has<T: AnnotationShape>(&self) -> Result<bool, AmbiguousImport> {
        Ok(self.find(&self.config.qualified(T::NAME))?.is_some())
    }

    /// Extract the entity annotation `T`, if present.
    ///
    /// # Errors
    /// Returns `ShapeError` when the annotation is present but malformed.
    pub fn extract<T: AnnotationShape>(&self) -> Result<Option<T>, ShapeError> {
        match self.find(&self.config.qualified(T::NAME))? {
            None => Ok(None),
            Some(annotation) => T::from_args(&Arguments::new(annotation, self.resolver)).map(Some),
        }
    }

    /// The first recognised not-null annotation, as written.
    ///
    /// # Errors
    /// Returns `AmbiguousImport` when a candidate's name is ambiguous.
    pub fn not_null_spelling(&self) -> Result<Option<&'a str>, AmbiguousImport> {
        let recognised = self.config.not_null_annotations();
        for annotation in self.annotations {
            let simple = annotation.simple_name();
            if !recognised.iter().any(|q| q.rsplit('.').next() == Some(simple)) {
                continue;
            }
            let resolved = self.resolver.resolve_name(&annotation.name)?;
            if recognised.contains(&resolved) {
                return Ok(Some(annotation.name.as_str()));
            }
        }
        Ok(None)
    }
}
