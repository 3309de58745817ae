use serde::{Deserialize, Serialize};

use crate::hash::NO_CHECK_HASH;

use super::variable::Variable;

/// Byte span and 1-based line of a declaration in its source file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    pub line: u32,
    pub start: usize,
    pub end: usize,
}

/// Who owns a declaration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "hash")]
pub enum ProvenanceHint {
    /// Hand-written, unmarked.
    #[default]
    None,
    /// Hand-written and explicitly protected from regeneration.
    Keep,
    /// Machine-written; the hash, when present, is the structural hash at generation time.
    Generated(Option<i32>),
}

impl ProvenanceHint {
    /// The hash to verify, unless absent or the no-check sentinel.
    #[must_use]
    pub const fn verifiable_hash(self) -> Option<i32> {
        match self {
            Self::Generated(Some(hash)) if hash != NO_CHECK_HASH => Some(hash),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_generated(self) -> bool {
        matches!(self, Self::Generated(_))
    }
}

/// Declarations the merge engine can (re)generate.
pub trait Generatable {
    fn hint(&self) -> ProvenanceHint;
    fn source(&self) -> Option<SourceRef>;
    /// Human-readable name used in diagnostics.
    fn display_name(&self) -> String;
}

/// A field excluded from persistence but tracked for provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransientField {
    pub variable: Variable,
    pub source: Option<SourceRef>,
    pub hint: ProvenanceHint,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Method {
    pub name: String,
    pub parameters: Vec<Variable>,
    pub return_type: String,
    pub source: Option<SourceRef>,
    pub hint: ProvenanceHint,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constructor {
    pub parameters: Vec<Variable>,
    pub source: Option<SourceRef>,
    pub hint: ProvenanceHint,
}

impl Generatable for TransientField {
    fn hint(&self) -> ProvenanceHint {
        self.hint
    }

    fn source(&self) -> Option<SourceRef> {
        self.source
    }

    fn display_name(&self) -> String {
        self.variable.name.clone()
    }
}

impl Generatable for Method {
    fn hint(&self) -> ProvenanceHint {
        self.hint
    }

    fn source(&self) -> Option<SourceRef> {
        self.source
    }

    fn display_name(&self) -> String {
        format!("{}({})", self.name, parameter_types(&self.parameters))
    }
}

impl Generatable for Constructor {
    fn hint(&self) -> ProvenanceHint {
        self.hint
    }

    fn source(&self) -> Option<SourceRef> {
        self.source
    }

    fn display_name(&self) -> String {
        format!("<init>({})", parameter_types(&self.parameters))
    }
}

fn parameter_types(parameters: &[Variable]) -> String {
    parameters
        .iter()
        .map(|p| p.ty.original_spelling.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
