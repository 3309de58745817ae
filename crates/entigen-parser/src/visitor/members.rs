use entigen_core::{Constructor, CoreError, Location, Method, Variable};

use super::{EntityBuilder, VisitContext};
use crate::syntax::{ConstructorDecl, MethodDecl, Parameter};

pub(super) fn visit_method(
    ctx: &VisitContext<'_>,
    builder: &mut EntityBuilder,
    method: &MethodDecl,
) -> Result<(), CoreError> {
    let location = ctx.location(&method.name, method.span.line);
    let set = ctx.annotation_set(&method.modifiers.annotations);
    let hint = ctx.provenance(&set, method.span, &location)?;

    builder.entity.methods.push(Method {
        name: method.name.clone(),
        parameters: parameters(ctx, &method.parameters, &location)?,
        return_type: method.return_type.clone(),
        source: Some(method.span.to_source_ref()),
        hint,
    });
    Ok(())
}

pub(super) fn visit_constructor(
    ctx: &VisitContext<'_>,
    builder: &mut EntityBuilder,
    ctor: &ConstructorDecl,
) -> Result<(), CoreError> {
    let location = ctx.location("<init>", ctor.span.line);
    let set = ctx.annotation_set(&ctor.modifiers.annotations);
    let hint = ctx.provenance(&set, ctor.span, &location)?;

    builder.entity.constructors.push(Constructor {
        parameters: parameters(ctx, &ctor.parameters, &location)?,
        source: Some(ctor.span.to_source_ref()),
        hint,
    });
    Ok(())
}

fn parameters(
    ctx: &VisitContext<'_>,
    parameters: &[Parameter],
    location: &Location,
) -> Result<Vec<Variable>, CoreError> {
    parameters
        .iter()
        .map(|p| {
            let ty = ctx.resolve(&p.type_text, location)?;
            ctx.variable(ty, &p.name)
        })
        .collect()
}
