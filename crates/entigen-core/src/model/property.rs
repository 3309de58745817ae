use serde::{Deserialize, Serialize};

use super::members::SourceRef;
use super::variable::Variable;

/// Primary-key flags from `@Id`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdInfo {
    pub autoincrement: bool,
    pub assignable: bool,
}

/// Single-property index from `@Index` on a field, or synthesised for a
/// foreign key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyIndex {
    pub name: Option<String>,
    pub is_unique: bool,
}

/// Converter-backed persistence from `@Convert`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomType {
    /// Qualified name of the converter class.
    pub converter_class: String,
    /// Qualified name of the type actually stored.
    pub db_type: String,
}

/// A persisted property of an entity.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedProperty {
    pub variable: Variable,
    pub source: Option<SourceRef>,
    pub id: Option<IdInfo>,
    pub index: Option<PropertyIndex>,
    pub is_not_null: bool,
    pub db_column_name: Option<String>,
    /// `Some(0)` requests a fresh uid from the id sync step.
    pub uid: Option<i64>,
    pub custom_type: Option<CustomType>,
    pub is_unique: bool,
    pub is_field_accessible: bool,
    /// Set only on properties synthesised to back a to-one relation.
    pub virtual_target_name: Option<String>,
}

impl ParsedProperty {
    /// A property with no metadata beyond its variable.
    #[must_use]
    pub const fn plain(variable: Variable) -> Self {
        Self {
            variable,
            source: None,
            id: None,
            index: None,
            is_not_null: false,
            db_column_name: None,
            uid: None,
            custom_type: None,
            is_unique: false,
            is_field_accessible: true,
            virtual_target_name: None,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.variable.name
    }

    /// Whether the property was declared by the user rather than synthesised.
    #[must_use]
    pub const fn is_declared(&self) -> bool {
        self.virtual_target_name.is_none()
    }
}
