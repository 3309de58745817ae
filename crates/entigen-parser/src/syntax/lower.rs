use ast_grep_core::{Doc, Node};

use super::{
    Annotation, AnnotationArguments, CompilationUnit, ConstructorDecl, Declaration, Declarator,
    ElementValue, FieldDecl, Import, MethodDecl, Modifiers, Parameter, Span, TypeDecl, TypeKind,
};

fn span_of<D: Doc>(node: &Node<D>) -> Span {
    let range = node.range();
    Span {
        start: range.start,
        end: range.end,
        line: u32::try_from(node.start_pos().line() + 1).unwrap_or(u32::MAX),
    }
}

fn is_comment<D: Doc>(node: &Node<D>) -> bool {
    matches!(node.kind().as_ref(), "line_comment" | "block_comment")
}

pub(super) fn lower_program<D: Doc>(root: &Node<D>) -> CompilationUnit {
    let mut unit = CompilationUnit::default();

    for child in root.children() {
        match child.kind().as_ref() {
            "package_declaration" => {
                unit.package = child
                    .children()
                    .find(|c| matches!(c.kind().as_ref(), "scoped_identifier" | "identifier"))
                    .map(|name| name.text().to_string());
                unit.package_span = Some(span_of(&child));
            }
            "import_declaration" => unit.imports.push(lower_import(&child)),
            _ => {
                if let Some(decl) = lower_type(&child) {
                    unit.types.push(decl);
                }
            }
        }
    }

    unit
}

fn lower_import<D: Doc>(node: &Node<D>) -> Import {
    let text = node.text();
    let body = text
        .trim()
        .trim_start_matches("import")
        .trim_end_matches(';')
        .trim();
    let (is_static, body) = body
        .strip_prefix("static")
        .filter(|rest| rest.starts_with(char::is_whitespace))
        .map_or((false, body), |rest| (true, rest.trim_start()));
    let path: String = body.chars().filter(|c| !c.is_whitespace()).collect();
    let (path, is_wildcard) = path
        .strip_suffix(".*")
        .map_or((path.clone(), false), |p| (p.to_string(), true));

    Import {
        path,
        is_static,
        is_wildcard,
        span: span_of(node),
    }
}

fn lower_type<D: Doc>(node: &Node<D>) -> Option<TypeDecl> {
    let kind = match node.kind().as_ref() {
        "class_declaration" => TypeKind::Class,
        "interface_declaration" => TypeKind::Interface,
        "enum_declaration" => TypeKind::Enum,
        "record_declaration" => TypeKind::Record,
        "annotation_type_declaration" => TypeKind::Annotation,
        _ => return None,
    };
    let name = node.field("name")?.text().to_string();
    let body_node = node.field("body")?;

    let mut members = Vec::new();
    for child in body_node.children() {
        if child.kind().as_ref() == "enum_body_declarations" {
            members.extend(child.children().filter_map(|c| lower_member(&c)));
        } else if let Some(member) = lower_member(&child) {
            members.push(member);
        }
    }

    Some(TypeDecl {
        name,
        kind,
        modifiers: lower_modifiers(node),
        members,
        span: span_of(node),
        body: span_of(&body_node),
        doc: javadoc_before(node),
    })
}

fn lower_member<D: Doc>(node: &Node<D>) -> Option<Declaration> {
    match node.kind().as_ref() {
        "field_declaration" | "constant_declaration" => Some(Declaration::Field(lower_field(node)?)),
        "method_declaration" => Some(Declaration::Method(lower_method(node)?)),
        "constructor_declaration" => Some(Declaration::Constructor(lower_constructor(node)?)),
        _ => lower_type(node).map(Declaration::NestedType),
    }
}

fn lower_field<D: Doc>(node: &Node<D>) -> Option<FieldDecl> {
    let type_text = node.field("type")?.text().to_string();
    let declarators = node
        .children()
        .filter(|c| c.kind().as_ref() == "variable_declarator")
        .filter_map(|declarator| {
            Some(Declarator {
                name: declarator.field("name")?.text().to_string(),
                dimensions: declarator
                    .field("dimensions")
                    .map(|d| compact(&d.text()))
                    .unwrap_or_default(),
            })
        })
        .collect();

    let mut modifiers = lower_modifiers(node);
    if node.kind().as_ref() == "constant_declaration" && !modifiers.is_static() {
        modifiers.keywords.push("static".to_string());
    }

    Some(FieldDecl {
        modifiers,
        type_text,
        declarators,
        span: span_of(node),
        doc: javadoc_before(node),
    })
}

fn lower_method<D: Doc>(node: &Node<D>) -> Option<MethodDecl> {
    let mut return_type = node.field("type")?.text().to_string();
    if let Some(dimensions) = node.field("dimensions") {
        return_type.push_str(&compact(&dimensions.text()));
    }
    Some(MethodDecl {
        name: node.field("name")?.text().to_string(),
        modifiers: lower_modifiers(node),
        return_type,
        parameters: lower_parameters(node),
        span: span_of(node),
        doc: javadoc_before(node),
    })
}

fn lower_constructor<D: Doc>(node: &Node<D>) -> Option<ConstructorDecl> {
    Some(ConstructorDecl {
        name: node.field("name")?.text().to_string(),
        modifiers: lower_modifiers(node),
        parameters: lower_parameters(node),
        span: span_of(node),
        doc: javadoc_before(node),
    })
}

fn lower_parameters<D: Doc>(node: &Node<D>) -> Vec<Parameter> {
    let Some(parameters) = node.field("parameters") else {
        return Vec::new();
    };

    parameters
        .children()
        .filter_map(|child| match child.kind().as_ref() {
            "formal_parameter" => {
                let mut type_text = child.field("type")?.text().to_string();
                if let Some(dimensions) = child.field("dimensions") {
                    type_text.push_str(&compact(&dimensions.text()));
                }
                Some(Parameter {
                    type_text,
                    name: child.field("name")?.text().to_string(),
                })
            }
            "spread_parameter" => {
                let declarator = child
                    .children()
                    .find(|c| c.kind().as_ref() == "variable_declarator")?;
                let element = child.children().find(|c| {
                    c.is_named()
                        && !is_comment(c)
                        && !matches!(c.kind().as_ref(), "modifiers" | "variable_declarator")
                })?;
                Some(Parameter {
                    type_text: format!("{}...", element.text()),
                    name: declarator.field("name")?.text().to_string(),
                })
            }
            _ => None,
        })
        .collect()
}

fn lower_modifiers<D: Doc>(node: &Node<D>) -> Modifiers {
    let Some(modifiers) = node.children().find(|c| c.kind().as_ref() == "modifiers") else {
        return Modifiers::default();
    };

    let mut lowered = Modifiers::default();
    for child in modifiers.children() {
        match child.kind().as_ref() {
            "annotation" | "marker_annotation" => {
                if let Some(annotation) = lower_annotation(&child) {
                    lowered.annotations.push(annotation);
                }
            }
            _ if !child.is_named() => lowered.keywords.push(child.text().to_string()),
            _ => {}
        }
    }
    lowered
}

fn lower_annotation<D: Doc>(node: &Node<D>) -> Option<Annotation> {
    let name = compact(&node.field("name")?.text());
    let arguments = match node.field("arguments") {
        None => AnnotationArguments::Marker,
        Some(list) => {
            let values: Vec<_> = list
                .children()
                .filter(|c| c.is_named() && !is_comment(c))
                .collect();
            match values.as_slice() {
                [] => AnnotationArguments::Marker,
                [single] if single.kind().as_ref() != "element_value_pair" => {
                    AnnotationArguments::Single(lower_element_value(single))
                }
                pairs => AnnotationArguments::Normal(
                    pairs
                        .iter()
                        .filter(|pair| pair.kind().as_ref() == "element_value_pair")
                        .filter_map(|pair| {
                            let key = pair.field("key")?.text().to_string();
                            let value = lower_element_value(&pair.field("value")?);
                            Some((key, value))
                        })
                        .collect(),
                ),
            }
        }
    };

    Some(Annotation {
        name,
        arguments,
        span: span_of(node),
    })
}

fn lower_element_value<D: Doc>(node: &Node<D>) -> ElementValue {
    let text = node.text();
    match node.kind().as_ref() {
        "string_literal" => ElementValue::String(unquote(&text)),
        "decimal_integer_literal"
        | "hex_integer_literal"
        | "octal_integer_literal"
        | "binary_integer_literal" => {
            parse_integer(&text).map_or_else(|| ElementValue::Expression(text.to_string()), ElementValue::Integer)
        }
        "unary_expression" => {
            let operator = node.field("operator").map(|op| op.text().to_string());
            let operand = node.field("operand").map(|operand| lower_element_value(&operand));
            match (operator.as_deref(), operand) {
                (Some("-"), Some(ElementValue::Integer(value))) => ElementValue::Integer(-value),
                (Some("+"), Some(ElementValue::Integer(value))) => ElementValue::Integer(value),
                _ => ElementValue::Expression(text.to_string()),
            }
        }
        "parenthesized_expression" => node
            .children()
            .find(|c| c.is_named() && !is_comment(c))
            .map_or_else(|| ElementValue::Expression(text.to_string()), |inner| lower_element_value(&inner)),
        "true" => ElementValue::Boolean(true),
        "false" => ElementValue::Boolean(false),
        "class_literal" => {
            let written = compact(&text);
            ElementValue::Class(written.trim_end_matches(".class").to_string())
        }
        "element_value_array_initializer" => ElementValue::Array(
            node.children()
                .filter(|c| c.is_named() && !is_comment(c))
                .map(|c| lower_element_value(&c))
                .collect(),
        ),
        "annotation" | "marker_annotation" => lower_annotation(node).map_or_else(
            || ElementValue::Expression(text.to_string()),
            |annotation| ElementValue::Annotation(Box::new(annotation)),
        ),
        _ => ElementValue::Expression(text.to_string()),
    }
}

/// The `/** ... */` comment directly before `node`, skipping line comments.
fn javadoc_before<D: Doc>(node: &Node<D>) -> Option<Span> {
    let mut current = node.prev();
    while let Some(prev) = current {
        match prev.kind().as_ref() {
            "line_comment" => current = prev.prev(),
            "block_comment" if prev.text().starts_with("/**") => return Some(span_of(&prev)),
            _ => return None,
        }
    }
    None
}

fn compact(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

fn parse_integer(text: &str) -> Option<i64> {
    let cleaned: String = text
        .trim_end_matches(['l', 'L'])
        .chars()
        .filter(|c| *c != '_')
        .collect();
    if let Some(hex) = cleaned.strip_prefix("0x").or_else(|| cleaned.strip_prefix("0X")) {
        return i64::from_str_radix(hex, 16).ok();
    }
    if let Some(binary) = cleaned.strip_prefix("0b").or_else(|| cleaned.strip_prefix("0B")) {
        return i64::from_str_radix(binary, 2).ok();
    }
    if cleaned.len() > 1 && cleaned.starts_with('0') {
        return i64::from_str_radix(&cleaned[1..], 8).ok();
    }
    cleaned.parse().ok()
}

fn unquote(literal: &str) -> String {
    let inner = literal
        .strip_prefix("\"\"\"")
        .and_then(|s| s.strip_suffix("\"\"\""))
        .or_else(|| literal.strip_prefix('"').and_then(|s| s.strip_suffix('"')))
        .unwrap_or(literal);

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_accept_suffixes_and_radixes() {
        assert_eq!(parse_integer("42"), Some(42));
        assert_eq!(parse_integer("1_000L"), Some(1000));
        assert_eq!(parse_integer("0x1F"), Some(31));
        assert_eq!(parse_integer("0b101"), Some(5));
        assert_eq!(parse_integer("017"), Some(15));
        assert_eq!(parse_integer("0"), Some(0));
    }

    #[test]
    fn strings_are_unescaped() {
        assert_eq!(unquote(r#""a\"b""#), "a\"b");
        assert_eq!(unquote(r#""line\n""#), "line\n");
        assert_eq!(unquote("\"plain\""), "plain");
    }
}
