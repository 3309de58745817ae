use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::index::TableIndex;
use super::members::{Constructor, Method, SourceRef, TransientField};
use super::property::ParsedProperty;
use super::relation::{ManyRelation, OneRelation};

/// A type declared inside the entity body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NestedType {
    pub name: String,
    /// Declared `static`, or implicitly static (enum, interface, record, annotation).
    pub is_static: bool,
}

/// One persisted type, created per source file by the parser.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    pub schema_name: String,
    pub package_name: String,
    pub is_active: bool,
    pub table_name: Option<String>,
    pub uid: Option<i64>,
    pub keep_source_entirely: bool,
    pub generate_constructors: bool,
    pub generate_accessors: bool,
    pub properties: Vec<ParsedProperty>,
    pub transient_fields: Vec<TransientField>,
    pub constructors: Vec<Constructor>,
    pub methods: Vec<Method>,
    pub one_relations: Vec<OneRelation>,
    pub many_relations: Vec<ManyRelation>,
    pub indexes: Vec<TableIndex>,
    pub nested_types: Vec<NestedType>,
    pub source_file: PathBuf,
    #[serde(skip)]
    pub source_text: String,
    pub last_field_position: Option<SourceRef>,
    /// First not-null annotation spelling seen on any field, as written.
    pub not_null_annotation: Option<String>,
}

impl Entity {
    /// `package.Name`, or just `Name` in the default package.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        if self.package_name.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.package_name, self.name)
        }
    }

    #[must_use]
    pub fn property(&self, name: &str) -> Option<&ParsedProperty> {
        self.properties.iter().find(|p| p.variable.name == name)
    }

    pub fn property_mut(&mut self, name: &str) -> Option<&mut ParsedProperty> {
        self.properties.iter_mut().find(|p| p.variable.name == name)
    }

    #[must_use]
    pub fn id_property(&self) -> Option<&ParsedProperty> {
        self.properties.iter().find(|p| p.id.is_some())
    }

    #[must_use]
    pub fn nested_type(&self, name: &str) -> Option<&NestedType> {
        self.nested_types.iter().find(|n| n.name == name)
    }
}

/// Entities sharing a schema name, post-processed together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub name: String,
    pub entities: Vec<Entity>,
}

impl Schema {
    #[must_use]
    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.name == name)
    }
}
