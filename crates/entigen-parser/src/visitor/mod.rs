//! Entity model visitor.
//!
//! Walks the declarations of one compilation unit and builds the
//! [`Entity`] for the first top-level type carrying the entity annotation.
//! Accumulation happens in an explicit `EntityBuilder`; the visitor itself
//! holds no state between calls.

mod fields;
mod members;


use std::path::Path;

use entigen_config::{AnnotationConfig, ParserConfig};
use entigen_core::hash::{strip_range, structural_hash};
use entigen_core::{CoreError, Entity, Location, NestedType, ProvenanceHint, Variable, VariableType};
use tracing::{debug, warn};

use crate::annotations::{
    AnnotationSet, AnnotationShape, Arguments, EntityArgs, GeneratedArgs, Keep, NameInDbArgs,
    ShapeError, TableArgs, UidArgs,
};
use crate::resolve::{AmbiguousImport, TypeResolver};
use crate::syntax::{Annotation, CompilationUnit, Declaration, Span, TypeDecl};

/// Where the visitor stands within one compilation unit.
enum VisitState {
    NotYetEntity,
    IsEntity(Box<EntityBuilder>),
}

/// An inner type used as converter or custom value type, checked at finalisation.
struct InnerTypeUse {
    member: String,
    line: u32,
    qualified_name: String,
}

/// Accumulates one entity while its body is visited.
struct EntityBuilder {
    entity: Entity,
    table: Option<TableArgs>,
    inner_type_uses: Vec<InnerTypeUse>,
}

/// Shared, read-only inputs of one visit.
struct VisitContext<'a> {
    source: &'a str,
    path: &'a Path,
    entity_name: &'a str,
    resolver: TypeResolver,
    annotations: &'a AnnotationConfig,
}

fn ambiguous(location: Location) -> impl FnOnce(AmbiguousImport) -> CoreError {
    move |ambiguous| CoreError::AmbiguousTypeReference {
        location,
        identifier: ambiguous.identifier,
        candidates: ambiguous.candidates,
    }
}

impl VisitContext<'_> {
    fn annotation_set<'s>(&'s self, annotations: &'s [Annotation]) -> AnnotationSet<'s> {
        AnnotationSet::new(annotations, &self.resolver, self.annotations)
    }

    fn location(&self, member: &str, line: u32) -> Location {
        Location::member(self.entity_name, member, Some(line))
    }

    fn resolve(&self, text: &str, location: &Location) -> Result<VariableType, CoreError> {
        self.resolver
            .resolve(text)
            .map_err(ambiguous(location.clone()))
    }

    fn variable(&self, ty: VariableType, name: &str) -> Result<Variable, CoreError> {
        Variable::new(ty, name).map_err(|e| CoreError::ParseFailed {
            path: self.path.to_path_buf(),
            message: format!("{}: {e}", self.entity_name),
        })
    }

    fn extract<T: AnnotationShape>(
        &self,
        set: &AnnotationSet<'_>,
        location: &Location,
    ) -> Result<Option<T>, CoreError> {
        set.extract::<T>()
            .map_err(|e| e.into_core(T::NAME, location.clone()))
    }

    fn has<T: AnnotationShape>(
        &self,
        set: &AnnotationSet<'_>,
        location: &Location,
    ) -> Result<bool, CoreError> {
        set.has::<T>().map_err(ambiguous(location.clone()))
    }

    /// Provenance of a member, verifying the recorded hash of generated code.
    ///
    /// `@Keep` wins over `@Generated` when both are present.
    fn provenance(
        &self,
        set: &AnnotationSet<'_>,
        span: Span,
        location: &Location,
    ) -> Result<ProvenanceHint, CoreError> {
        if self.has::<Keep>(set, location)? {
            return Ok(ProvenanceHint::Keep);
        }

        let generated = set
            .find(&self.annotations.qualified(GeneratedArgs::NAME))
            .map_err(ambiguous(location.clone()))?;
        let Some(annotation) = generated else {
            return Ok(ProvenanceHint::None);
        };

        let args = GeneratedArgs::from_args(&Arguments::new(annotation, &self.resolver))
            .map_err(|e| e.into_core(GeneratedArgs::NAME, location.clone()))?;
        let hint = ProvenanceHint::Generated(args.hash);

        if let Some(expected) = hint.verifiable_hash() {
            let text = span.text(self.source);
            let relative = annotation.span.start.saturating_sub(span.start)
                ..annotation.span.end.saturating_sub(span.start);
            let actual = structural_hash(&strip_range(text, relative));
            if actual != expected {
                return Err(CoreError::TamperedGeneratedCode {
                    location: location.clone(),
                    expected,
                    actual,
                });
            }
        }
        Ok(hint)
    }
}

impl EntityBuilder {
    fn start(
        ctx: &VisitContext<'_>,
        unit: &CompilationUnit,
        decl: &TypeDecl,
        args: EntityArgs,
        parser: &ParserConfig,
    ) -> Result<Self, CoreError> {
        let set = ctx.annotation_set(&decl.modifiers.annotations);
        let location = Location::entity(&decl.name);

        let table = ctx.extract::<TableArgs>(&set, &location)?;
        let name_in_db = ctx.extract::<NameInDbArgs>(&set, &location)?;
        let uid = ctx.extract::<UidArgs>(&set, &location)?;
        let keep = ctx.has::<Keep>(&set, &location)?;

        let table_name = table
            .as_ref()
            .and_then(|t| t.name.clone())
            .or(name_in_db.map(|n| n.value));

        let entity = Entity {
            name: decl.name.clone(),
            schema_name: args
                .schema
                .unwrap_or_else(|| parser.default_schema.clone()),
            package_name: unit.package_name().to_string(),
            is_active: args.active,
            table_name,
            uid: uid.map(UidArgs::uid),
            keep_source_entirely: keep,
            generate_constructors: args.generate_constructors,
            generate_accessors: args.generate_accessors,
            properties: Vec::new(),
            transient_fields: Vec::new(),
            constructors: Vec::new(),
            methods: Vec::new(),
            one_relations: Vec::new(),
            many_relations: Vec::new(),
            indexes: Vec::new(),
            nested_types: Vec::new(),
            source_file: ctx.path.to_path_buf(),
            source_text: ctx.source.to_string(),
            last_field_position: None,
            not_null_annotation: None,
        };

        Ok(Self {
            entity,
            table,
            inner_type_uses: Vec::new(),
        })
    }

    fn visit(&mut self, ctx: &VisitContext<'_>, declaration: &Declaration) -> Result<(), CoreError> {
        match declaration {
            Declaration::Field(field) => fields::visit_field(ctx, self, field),
            Declaration::Method(method) => members::visit_method(ctx, self, method),
            Declaration::Constructor(ctor) => members::visit_constructor(ctx, self, ctor),
            Declaration::NestedType(nested) => {
                self.entity.nested_types.push(NestedType {
                    name: nested.name.clone(),
                    is_static: nested.is_effectively_static(),
                });
                Ok(())
            }
        }
    }

    /// Validate what could only be checked once the whole body was seen.
    fn finish(mut self) -> Result<Entity, CoreError> {
        let prefix = format!("{}.", self.entity.qualified_name());
        for usage in &self.inner_type_uses {
            let Some(rest) = usage.qualified_name.strip_prefix(&prefix) else {
                continue;
            };
            let inner = rest.split('.').next().unwrap_or(rest);
            if self.entity.nested_type(inner).is_some_and(|n| !n.is_static) {
                return Err(CoreError::UnsupportedInnerType {
                    location: Location::member(&self.entity.name, &usage.member, Some(usage.line)),
                    type_name: inner.to_string(),
                });
            }
        }

        if let Some(table) = self.table.take() {
            for index in &table.indexes {
                let index = index.to_table_index().map_err(|e| {
                    e.into_core("Index", Location::entity(&self.entity.name))
                })?;
                if let Some(unknown) = index
                    .properties
                    .iter()
                    .find(|p| !self.is_indexable(&p.name))
                {
                    return Err(CoreError::InvalidAnnotationValue {
                        location: Location::entity(&self.entity.name),
                        annotation: TableArgs::NAME.to_string(),
                        message: format!("index references unknown property '{}'", unknown.name),
                    });
                }
                self.entity.indexes.push(index);
            }
        }

        Ok(self.entity)
    }

    fn is_indexable(&self, name: &str) -> bool {
        self.entity.property(name).is_some()
            || self
                .entity
                .one_relations
                .iter()
                .any(|r| r.variable.name == name || r.foreign_key_name() == name)
    }
}

/// Parse one source file into its entity, if it declares one.
///
/// # Errors
/// Returns `CoreError::ParseFailed` for files with syntax errors when
/// `parser.tolerate_syntax_errors` is off, or any error of [`visit_unit`].
pub fn parse_entity(
    source: &str,
    path: &Path,
    siblings: &[String],
    parser: &ParserConfig,
    annotations: &AnnotationConfig,
) -> Result<Option<Entity>, CoreError> {
    let unit = CompilationUnit::parse(source);
    if unit.syntax_errors > 0 {
        if !parser.tolerate_syntax_errors {
            return Err(CoreError::ParseFailed {
                path: path.to_path_buf(),
                message: format!("{} syntax error(s)", unit.syntax_errors),
            });
        }
        warn!(path = %path.display(), errors = unit.syntax_errors, "parsing despite syntax errors");
    }
    visit_unit(&unit, source, path, siblings, parser, annotations)
}

/// Build the entity of an already parsed unit.
///
/// # Errors
/// Returns the first resolution, annotation, tamper or inner-type error found.
pub fn visit_unit(
    unit: &CompilationUnit,
    source: &str,
    path: &Path,
    siblings: &[String],
    parser: &ParserConfig,
    annotations: &AnnotationConfig,
) -> Result<Option<Entity>, CoreError> {
    let mut state = VisitState::NotYetEntity;

    for decl in &unit.types {
        let ctx = VisitContext {
            source,
            path,
            entity_name: &decl.name,
            resolver: TypeResolver::new(unit.package_name(), &unit.imports, Some(&decl.name), siblings)
                .with_nested(decl.nested_type_names()),
            annotations,
        };

        let set = ctx.annotation_set(&decl.modifiers.annotations);
        let marker = set
            .extract::<EntityArgs>()
            .map_err(|e: ShapeError| e.into_core(EntityArgs::NAME, Location::entity(&decl.name)))?;
        let Some(args) = marker else {
            continue;
        };

        debug!(entity = %decl.name, path = %path.display(), "found entity");
        let mut builder = EntityBuilder::start(&ctx, unit, decl, args, parser)?;
        for member in &decl.members {
            builder.visit(&ctx, member)?;
        }
        state = VisitState::IsEntity(Box::new(builder));
        break;
    }

    match state {
        VisitState::NotYetEntity => Ok(None),
        VisitState::IsEntity(builder) => builder.finish().map(Some),
    }
}
