use entigen_core::{
    CoreError, CustomType, IdInfo, JoinColumnPair, JoinEntitySpec, Location, ManyRelation,
    OneRelation, ParsedProperty, PropertyIndex, TransientField, VariableType,
};
use tracing::debug;

use super::{EntityBuilder, InnerTypeUse, VisitContext};
use crate::annotations::{
    AnnotationSet, ConvertArgs, IdArgs, IndexArgs, JoinEntityArgs, NameInDbArgs, OrderByArgs,
    RelationArgs, Transient, UidArgs, Unique,
};
use crate::syntax::{Declarator, FieldDecl};

const LIST_TYPES: &[&str] = &["java.util.List", "java.util.ArrayList", "java.util.Collection"];

/// Classify one field declaration, expanding `int a, b;` into one entry per name.
pub(super) fn visit_field(
    ctx: &VisitContext<'_>,
    builder: &mut EntityBuilder,
    field: &FieldDecl,
) -> Result<(), CoreError> {
    builder.entity.last_field_position = Some(field.span.to_source_ref());

    let set = ctx.annotation_set(&field.modifiers.annotations);
    let first_name = field
        .declarators
        .first()
        .map_or("<field>", |d| d.name.as_str());
    let location = ctx.location(first_name, field.span.line);

    let is_transient = field.modifiers.is_static()
        || field.modifiers.is_transient()
        || ctx.has::<Transient>(&set, &location)?;
    if is_transient {
        let hint = ctx.provenance(&set, field.span, &location)?;
        for declarator in &field.declarators {
            let ty = ctx.resolve(&field.type_of(declarator), &location)?;
            builder.entity.transient_fields.push(TransientField {
                variable: ctx.variable(ty, &declarator.name)?,
                source: Some(field.span.to_source_ref()),
                hint,
            });
        }
        return Ok(());
    }

    for declarator in &field.declarators {
        let location = ctx.location(&declarator.name, field.span.line);
        visit_declarator(ctx, builder, field, declarator, &set, &location)?;
    }
    Ok(())
}

fn visit_declarator(
    ctx: &VisitContext<'_>,
    builder: &mut EntityBuilder,
    field: &FieldDecl,
    declarator: &Declarator,
    set: &AnnotationSet<'_>,
    location: &Location,
) -> Result<(), CoreError> {
    let ty = ctx.resolve(&field.type_of(declarator), location)?;

    let not_null_spelling = set
        .not_null_spelling()
        .map_err(super::ambiguous(location.clone()))?;
    if let Some(spelling) = not_null_spelling
        && builder.entity.not_null_annotation.is_none()
    {
        builder.entity.not_null_annotation = Some(spelling.to_string());
    }
    let is_not_null = ty.is_primitive || not_null_spelling.is_some();

    let relation = ctx.extract::<RelationArgs>(set, location)?;
    let is_handle = ty.qualified_name == ctx.annotations.handle("ToOne");

    match relation {
        None if is_handle => {
            debug!(
                entity = %builder.entity.name,
                field = %declarator.name,
                "to-one handle without @Relation, not modelled"
            );
            Ok(())
        }
        Some(relation) if is_list_like(ctx, &ty) => {
            let many = many_relation(ctx, field, declarator, ty, relation, set, location)?;
            builder.entity.many_relations.push(many);
            Ok(())
        }
        Some(relation) => {
            let target = if is_handle {
                type_argument(&ty, location)?
            } else {
                ty.clone()
            };
            builder.entity.one_relations.push(OneRelation {
                variable: ctx.variable(ty, &declarator.name)?,
                target,
                is_handle,
                foreign_key_property_name: relation.id_property,
                db_column_name: ctx.extract::<NameInDbArgs>(set, location)?.map(|n| n.value),
                is_not_null,
                is_unique: ctx.has::<Unique>(set, location)?,
                source: Some(field.span.to_source_ref()),
            });
            Ok(())
        }
        None => {
            let property =
                property(ctx, builder, field, declarator, ty, is_not_null, set, location)?;
            builder.entity.properties.push(property);
            Ok(())
        }
    }
}

fn is_list_like(ctx: &VisitContext<'_>, ty: &VariableType) -> bool {
    LIST_TYPES.contains(&ty.qualified_name.as_str())
        || ty.qualified_name == ctx.annotations.handle("ToMany")
}

fn type_argument(ty: &VariableType, location: &Location) -> Result<VariableType, CoreError> {
    ty.first_argument()
        .cloned()
        .ok_or_else(|| CoreError::InvalidAnnotationValue {
            location: location.clone(),
            annotation: "Relation".to_string(),
            message: format!(
                "'{}' needs a type argument naming the target entity",
                ty.original_spelling
            ),
        })
}

fn many_relation(
    ctx: &VisitContext<'_>,
    field: &FieldDecl,
    declarator: &Declarator,
    ty: VariableType,
    relation: RelationArgs,
    set: &AnnotationSet<'_>,
    location: &Location,
) -> Result<ManyRelation, CoreError> {
    let target = type_argument(&ty, location)?;
    let join_entity = ctx
        .extract::<JoinEntityArgs>(set, location)?
        .map(|join| JoinEntitySpec {
            entity: join.entity,
            source_property: join.source_property,
            target_property: join.target_property,
        });
    let order = ctx
        .extract::<OrderByArgs>(set, location)?
        .map(|o| o.order)
        .unwrap_or_default();

    Ok(ManyRelation {
        variable: ctx.variable(ty, &declarator.name)?,
        target,
        backlink_property_name: relation.backlink,
        join_column_pairs: relation
            .join_properties
            .into_iter()
            .map(|p| JoinColumnPair {
                source: p.name,
                target: p.referenced_name,
            })
            .collect(),
        join_entity,
        order,
        source: Some(field.span.to_source_ref()),
    })
}

#[allow(clippy::too_many_arguments)]
fn property(
    ctx: &VisitContext<'_>,
    builder: &mut EntityBuilder,
    field: &FieldDecl,
    declarator: &Declarator,
    ty: VariableType,
    is_not_null: bool,
    set: &AnnotationSet<'_>,
    location: &Location,
) -> Result<ParsedProperty, CoreError> {
    let custom_type = ctx
        .extract::<ConvertArgs>(set, location)?
        .map(|convert| CustomType {
            converter_class: convert.converter,
            db_type: convert.db_type,
        });
    if let Some(custom) = &custom_type {
        for qualified_name in [&custom.converter_class, &ty.qualified_name] {
            builder.inner_type_uses.push(InnerTypeUse {
                member: declarator.name.clone(),
                line: field.span.line,
                qualified_name: qualified_name.clone(),
            });
        }
    }

    let id = ctx.extract::<IdArgs>(set, location)?.map(|id| IdInfo {
        autoincrement: id.autoincrement,
        assignable: id.assignable,
    });
    let index = ctx
        .extract::<IndexArgs>(set, location)?
        .map(|index| PropertyIndex {
            name: index.name,
            is_unique: index.unique,
        });

    Ok(ParsedProperty {
        variable: ctx.variable(ty, &declarator.name)?,
        source: Some(field.span.to_source_ref()),
        id,
        index,
        is_not_null,
        db_column_name: ctx.extract::<NameInDbArgs>(set, location)?.map(|n| n.value),
        uid: ctx.extract::<UidArgs>(set, location)?.map(UidArgs::uid),
        custom_type,
        is_unique: ctx.has::<Unique>(set, location)?,
        is_field_accessible: !field.modifiers.is_private(),
        virtual_target_name: None,
    })
}
