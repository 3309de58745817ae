//! The entity model built by the parser and consumed by the merge engine.

mod entity;
mod index;
mod members;
mod property;
mod relation;
mod variable;

pub use entity::{Entity, NestedType, Schema};
pub use index::{IndexOrder, OrderSpecError, OrderedProperty, TableIndex, parse_order_spec};
pub use members::{Constructor, Generatable, Method, ProvenanceHint, SourceRef, TransientField};
pub use property::{CustomType, IdInfo, ParsedProperty, PropertyIndex};
pub use relation::{JoinColumnPair, JoinEntitySpec, ManyRelation, OneRelation};
pub use variable::{InvalidIdentifier, Variable, VariableType, is_java_identifier};
