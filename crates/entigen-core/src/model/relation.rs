use serde::{Deserialize, Serialize};

use super::index::OrderedProperty;
use super::members::SourceRef;
use super::variable::{Variable, VariableType};

/// Reference from one entity to a single target.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OneRelation {
    pub variable: Variable,
    /// The target entity type; the type argument when the field is a handle.
    pub target: VariableType,
    /// The field is declared as a to-one handle rather than the raw target type.
    pub is_handle: bool,
    /// Defaults to `<fieldName>Id` during post-processing.
    pub foreign_key_property_name: Option<String>,
    pub db_column_name: Option<String>,
    pub is_not_null: bool,
    pub is_unique: bool,
    pub source: Option<SourceRef>,
}

impl OneRelation {
    /// The explicit foreign-key property name or the `<field>Id` default.
    #[must_use]
    pub fn foreign_key_name(&self) -> String {
        self.foreign_key_property_name
            .clone()
            .unwrap_or_else(|| format!("{}Id", self.variable.name))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinColumnPair {
    pub source: String,
    pub target: String,
}

/// Link through an intermediate entity (`@JoinEntity`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinEntitySpec {
    /// Qualified name of the join entity.
    pub entity: String,
    pub source_property: String,
    pub target_property: String,
}

/// Reference from one entity to a collection of targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManyRelation {
    pub variable: Variable,
    /// Element type of the collection.
    pub target: VariableType,
    pub backlink_property_name: Option<String>,
    pub join_column_pairs: Vec<JoinColumnPair>,
    pub join_entity: Option<JoinEntitySpec>,
    pub order: Vec<OrderedProperty>,
    pub source: Option<SourceRef>,
}

impl ManyRelation {
    /// How many of the mutually exclusive linking strategies are set.
    #[must_use]
    pub fn linking_strategy_count(&self) -> usize {
        usize::from(self.backlink_property_name.is_some())
            + usize::from(!self.join_column_pairs.is_empty())
            + usize::from(self.join_entity.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer() -> VariableType {
        VariableType::object("com.example.Customer", "Customer", Vec::new())
    }

    #[test]
    fn foreign_key_defaults_to_field_name_plus_id() {
        let relation = OneRelation {
            variable: Variable::new(customer(), "customer").expect("valid"),
            target: customer(),
            is_handle: false,
            foreign_key_property_name: None,
            db_column_name: None,
            is_not_null: false,
            is_unique: false,
            source: None,
        };
        assert_eq!(relation.foreign_key_name(), "customerId");

        let explicit = OneRelation {
            foreign_key_property_name: Some("buyerRef".to_string()),
            ..relation
        };
        assert_eq!(explicit.foreign_key_name(), "buyerRef");
    }

    #[test]
    fn counts_linking_strategies() {
        let list = VariableType::object("java.util.List", "List", vec![customer()]);
        let mut relation = ManyRelation {
            variable: Variable::new(list, "customers").expect("valid"),
            target: customer(),
            backlink_property_name: None,
            join_column_pairs: Vec::new(),
            join_entity: None,
            order: Vec::new(),
            source: None,
        };
        assert_eq!(relation.linking_strategy_count(), 0);

        relation.backlink_property_name = Some("shop".to_string());
        relation.join_column_pairs.push(JoinColumnPair {
            source: "id".to_string(),
            target: "shopId".to_string(),
        });
        assert_eq!(relation.linking_strategy_count(), 2);
    }
}
