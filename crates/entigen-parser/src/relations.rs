//! Schema-wide relation post-processing.
//!
//! Runs once per schema after every entity of it was parsed. Foreign keys of
//! to-one relations are materialised as properties first, for all entities,
//! so that relation validation sees the final property lists.

use std::collections::BTreeSet;

use entigen_core::{
    CoreError, Entity, Location, ManyRelation, ParsedProperty, PropertyIndex, Variable,
    VariableType,
};
use tracing::debug;

/// Materialise foreign keys, then validate every relation of the schema.
///
/// # Errors
/// Returns `UnresolvedRelationTarget` for targets, backlinks or join entities
/// outside the schema, `InsufficientRelationSpec` for to-many relations
/// without exactly one linking strategy, and `InvalidAnnotationValue` for
/// unusable foreign-key or join-property names.
pub fn process_schema(entities: &mut [Entity]) -> Result<(), CoreError> {
    for entity in entities.iter_mut() {
        materialize_foreign_keys(entity)?;
    }

    let known: BTreeSet<String> = entities.iter().map(Entity::qualified_name).collect();
    for entity in entities.iter() {
        validate_relations(entity, entities, &known)?;
    }
    Ok(())
}

fn materialize_foreign_keys(entity: &mut Entity) -> Result<(), CoreError> {
    for position in 0..entity.one_relations.len() {
        let relation = &entity.one_relations[position];
        let field = relation.variable.name.clone();
        let line = relation.source.map(|s| s.line);
        let foreign_key = relation.foreign_key_name();
        let virtual_target = if relation.is_handle {
            format!("{field}ToOne")
        } else {
            field.clone()
        };
        let is_not_null = relation.is_not_null;

        if let Some(existing) = entity.property_mut(&foreign_key) {
            existing.index.get_or_insert_with(PropertyIndex::default);
        } else {
            let variable = Variable::new(VariableType::long(), &foreign_key).map_err(|e| {
                CoreError::InvalidAnnotationValue {
                    location: Location::member(&entity.name, &field, line),
                    annotation: "Relation".to_string(),
                    message: format!("idProperty: {e}"),
                }
            })?;
            debug!(entity = %entity.name, property = %foreign_key, "synthesised foreign key property");
            entity.properties.push(ParsedProperty {
                index: Some(PropertyIndex::default()),
                is_not_null,
                is_field_accessible: false,
                virtual_target_name: Some(virtual_target),
                ..ParsedProperty::plain(variable)
            });
        }

        entity.one_relations[position].foreign_key_property_name = Some(foreign_key);
    }
    Ok(())
}

fn validate_relations(
    entity: &Entity,
    schema: &[Entity],
    known: &BTreeSet<String>,
) -> Result<(), CoreError> {
    let unresolved = |field: &str, line: Option<u32>, target: String| {
        CoreError::UnresolvedRelationTarget {
            location: Location::member(&entity.name, field, line),
            target,
            schema: entity.schema_name.clone(),
        }
    };

    for relation in &entity.one_relations {
        if !known.contains(&relation.target.qualified_name) {
            return Err(unresolved(
                &relation.variable.name,
                relation.source.map(|s| s.line),
                relation.target.qualified_name.clone(),
            ));
        }
    }

    for relation in &entity.many_relations {
        let field = relation.variable.name.as_str();
        let line = relation.source.map(|s| s.line);
        let Some(target) = schema
            .iter()
            .find(|e| e.qualified_name() == relation.target.qualified_name)
        else {
            return Err(unresolved(field, line, relation.target.qualified_name.clone()));
        };

        let found = relation.linking_strategy_count();
        if found != 1 {
            return Err(CoreError::InsufficientRelationSpec {
                location: Location::member(&entity.name, field, line),
                found,
            });
        }

        if let Some(backlink) = &relation.backlink_property_name {
            let exists = target.one_relations.iter().any(|r| &r.variable.name == backlink)
                || target.property(backlink).is_some();
            if !exists {
                return Err(unresolved(field, line, format!("{}.{backlink}", target.name)));
            }
        }

        if let Some(join) = &relation.join_entity
            && !known.contains(&join.entity)
        {
            return Err(unresolved(field, line, join.entity.clone()));
        }

        validate_join_columns(entity, target, relation)?;
    }
    Ok(())
}

fn validate_join_columns(
    entity: &Entity,
    target: &Entity,
    relation: &ManyRelation,
) -> Result<(), CoreError> {
    for pair in &relation.join_column_pairs {
        let missing = if entity.property(&pair.source).is_none() {
            Some(format!("'{}' is not a property of {}", pair.source, entity.name))
        } else if target.property(&pair.target).is_none() {
            Some(format!("'{}' is not a property of {}", pair.target, target.name))
        } else {
            None
        };
        if let Some(message) = missing {
            return Err(CoreError::InvalidAnnotationValue {
                location: Location::member(
                    &entity.name,
                    &relation.variable.name,
                    relation.source.map(|s| s.line),
                ),
                annotation: "JoinProperty".to_string(),
                message,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use entigen_config::{AnnotationConfig, ParserConfig};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::visitor::parse_entity;

    const HEADER: &str = "package shop;\n\
        import io.objectbox.annotation.Entity;\n\
        import io.objectbox.annotation.JoinEntity;\n\
        import io.objectbox.annotation.JoinProperty;\n\
        import io.objectbox.annotation.Relation;\n\
        import io.objectbox.relation.ToOne;\n";

    fn schema(bodies: &[(&str, &str)]) -> Vec<Entity> {
        let siblings: Vec<String> = bodies.iter().map(|(name, _)| (*name).to_string()).collect();
        bodies
            .iter()
            .map(|(name, body)| {
                let source = format!("{HEADER}@Entity\nclass {name} {{\n{body}\n}}\n");
                parse_entity(
                    &source,
                    Path::new(&format!("{name}.java")),
                    &siblings,
                    &ParserConfig::default(),
                    &AnnotationConfig::default(),
                )
                .expect("should parse")
                .expect("should be an entity")
            })
            .collect()
    }

    #[test]
    fn default_foreign_key_is_synthesised() {
        let mut entities = schema(&[
            ("Order", "long id; @Relation Customer customer;"),
            ("Customer", "long id;"),
        ]);
        process_schema(&mut entities).expect("valid schema");

        let order = &entities[0];
        let fk = order.property("customerId").expect("synthesised");
        assert_eq!(fk.variable.ty, VariableType::long());
        assert!(fk.variable.ty.is_primitive);
        assert_eq!(fk.virtual_target_name.as_deref(), Some("customer"));
        assert_eq!(fk.index, Some(PropertyIndex::default()));
        assert!(!fk.is_declared());
        assert!(!fk.is_field_accessible);
        assert_eq!(
            order.one_relations[0].foreign_key_property_name.as_deref(),
            Some("customerId")
        );
    }

    #[test]
    fn handle_typed_relation_names_virtual_target_with_suffix() {
        let mut entities = schema(&[
            ("Order", "long id; @Relation ToOne<Customer> customer;"),
            ("Customer", "long id;"),
        ]);
        process_schema(&mut entities).expect("valid schema");

        let fk = entities[0].property("customerId").expect("synthesised");
        assert_eq!(fk.virtual_target_name.as_deref(), Some("customerToOne"));
    }

    #[test]
    fn declared_foreign_key_is_reused_and_indexed() {
        let mut entities = schema(&[
            ("Order", "long id; long buyerRef; @Relation(idProperty = \"buyerRef\") Customer customer;"),
            ("Customer", "long id;"),
        ]);
        process_schema(&mut entities).expect("valid schema");

        let order = &entities[0];
        assert_eq!(order.properties.len(), 2);
        let fk = order.property("buyerRef").expect("declared");
        assert!(fk.is_declared());
        assert!(fk.index.is_some());
        assert!(order.property("customerId").is_none());
    }

    #[test]
    fn unknown_to_one_target_is_rejected() {
        let mut entities = schema(&[("Order", "long id; @Relation Customer customer;")]);
        let error = process_schema(&mut entities).expect_err("Customer is not an entity");
        match error {
            CoreError::UnresolvedRelationTarget {
                location,
                target,
                schema,
            } => {
                assert_eq!(target, "shop.Customer");
                assert_eq!(schema, "default");
                assert_eq!(location.member.as_deref(), Some("customer"));
            }
            other => panic!("expected UnresolvedRelationTarget, got {other:?}"),
        }
        assert!(entities[0].property("customerId").is_some());
    }

    #[test]
    fn to_many_needs_exactly_one_strategy() {
        let mut none = schema(&[
            ("Order", "long id; @Relation List<Item> items;"),
            ("Item", "long id;"),
        ]);
        assert!(matches!(
            process_schema(&mut none),
            Err(CoreError::InsufficientRelationSpec { found: 0, .. })
        ));

        let mut two = schema(&[
            (
                "Order",
                "long id; @Relation(backlink = \"order\", joinProperties = @JoinProperty(name = \"id\", referencedName = \"orderId\")) List<Item> items;",
            ),
            ("Item", "long id; long orderId; @Relation Order order;"),
        ]);
        assert!(matches!(
            process_schema(&mut two),
            Err(CoreError::InsufficientRelationSpec { found: 2, .. })
        ));
    }

    #[test]
    fn backlink_must_exist_on_target() {
        let mut valid = schema(&[
            ("Order", "long id; @Relation(backlink = \"order\") List<Item> items;"),
            ("Item", "long id; @Relation Order order;"),
        ]);
        process_schema(&mut valid).expect("valid schema");
        assert!(valid[1].property("orderId").is_some());

        let mut broken = schema(&[
            ("Order", "long id; @Relation(backlink = \"owner\") List<Item> items;"),
            ("Item", "long id;"),
        ]);
        assert!(matches!(
            process_schema(&mut broken),
            Err(CoreError::UnresolvedRelationTarget { ref target, .. }) if target == "Item.owner"
        ));
    }

    #[test]
    fn join_entity_must_be_in_schema() {
        let body = "long id; @Relation @JoinEntity(entity = Link.class, sourceProperty = \"a\", targetProperty = \"b\") List<Item> items;";
        let mut missing = schema(&[("Order", body), ("Item", "long id;")]);
        assert!(matches!(
            process_schema(&mut missing),
            Err(CoreError::UnresolvedRelationTarget { .. })
        ));

        let mut present = schema(&[
            ("Order", body),
            ("Item", "long id;"),
            ("Link", "long id; long a; long b;"),
        ]);
        process_schema(&mut present).expect("valid schema");
    }

    #[test]
    fn join_columns_must_name_properties() {
        let mut entities = schema(&[
            (
                "Order",
                "long id; @Relation(joinProperties = @JoinProperty(name = \"code\", referencedName = \"orderCode\")) List<Item> items;",
            ),
            ("Item", "long id; String orderCode;"),
        ]);
        assert!(matches!(
            process_schema(&mut entities),
            Err(CoreError::InvalidAnnotationValue { ref annotation, .. }) if annotation == "JoinProperty"
        ));
    }
}
