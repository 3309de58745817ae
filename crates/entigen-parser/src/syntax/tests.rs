use pretty_assertions::assert_eq;

use super::*;

const NOTE: &str = r#"package com.example.notes;

import java.util.List;
import static java.util.Objects.requireNonNull;
import io.objectbox.annotation.*;

/** A note. */
@Entity(active = true)
public class Note {
    @Id(autoincrement = true) long id;

    /** Title shown in lists. */
    @NotNull
    private String title, subtitle;

    int ratings[];

    @Generated(hash = -1)
    public Note() {
    }

    // hand-written
    @Keep
    public Note(long id, String... tags) {
        this.id = id;
    }

    public List<String> tags(final int limit) { return null; }

    public static class Converter {}

    enum Kind { A, B; void noop() {} }
}
"#;

fn note_type(unit: &CompilationUnit) -> &TypeDecl {
    unit.find_type("Note").expect("should find Note")
}

#[test]
fn package_and_imports() {
    let unit = CompilationUnit::parse(NOTE);
    assert_eq!(unit.package_name(), "com.example.notes");
    assert_eq!(unit.syntax_errors, 0);

    let imports: Vec<_> = unit
        .imports
        .iter()
        .map(|i| (i.path.as_str(), i.is_static, i.is_wildcard))
        .collect();
    assert_eq!(
        imports,
        vec![
            ("java.util.List", false, false),
            ("java.util.Objects.requireNonNull", true, false),
            ("io.objectbox.annotation", false, true),
        ]
    );
}

#[test]
fn type_declaration_carries_annotations_and_doc() {
    let unit = CompilationUnit::parse(NOTE);
    let note = note_type(&unit);
    assert_eq!(note.kind, TypeKind::Class);
    assert!(note.modifiers.has_keyword("public"));
    assert_eq!(note.modifiers.annotations[0].name, "Entity");
    assert_eq!(
        note.modifiers.annotations[0].arguments,
        AnnotationArguments::Normal(vec![("active".to_string(), ElementValue::Boolean(true))])
    );
    let doc = note.doc.expect("type has javadoc");
    assert_eq!(doc.text(NOTE), "/** A note. */");
    assert!(note.body.text(NOTE).starts_with('{'));
    assert!(note.body.text(NOTE).ends_with('}'));
}

#[test]
fn multi_variable_fields_keep_every_declarator() {
    let unit = CompilationUnit::parse(NOTE);
    let fields: Vec<&FieldDecl> = note_type(&unit)
        .members
        .iter()
        .filter_map(|m| match m {
            Declaration::Field(field) => Some(field),
            _ => None,
        })
        .collect();
    assert_eq!(fields.len(), 3);

    let title = fields[1];
    assert_eq!(title.type_text, "String");
    let names: Vec<_> = title.declarators.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["title", "subtitle"]);
    assert!(title.modifiers.is_private());
    assert_eq!(title.modifiers.annotations[0].arguments, AnnotationArguments::Marker);
    assert!(title.doc.is_some());

    let ratings = fields[2];
    assert_eq!(ratings.type_of(&ratings.declarators[0]), "int[]");
}

#[test]
fn constructors_methods_and_parameters() {
    let unit = CompilationUnit::parse(NOTE);
    let note = note_type(&unit);

    let ctors: Vec<&ConstructorDecl> = note
        .members
        .iter()
        .filter_map(|m| match m {
            Declaration::Constructor(ctor) => Some(ctor),
            _ => None,
        })
        .collect();
    assert_eq!(ctors.len(), 2);
    assert!(ctors[0].parameters.is_empty());
    assert_eq!(
        ctors[0].modifiers.annotations[0].arguments,
        AnnotationArguments::Normal(vec![("hash".to_string(), ElementValue::Integer(-1))])
    );
    let types: Vec<_> = ctors[1].parameters.iter().map(|p| p.type_text.as_str()).collect();
    assert_eq!(types, vec!["long", "String..."]);
    assert_eq!(ctors[1].parameters[1].name, "tags");

    let method = note
        .members
        .iter()
        .find_map(|m| match m {
            Declaration::Method(method) if method.name == "tags" => Some(method),
            _ => None,
        })
        .expect("tags method");
    assert_eq!(method.return_type, "List<String>");
    assert_eq!(method.parameters[0].type_text, "int");
}

#[test]
fn nested_types_report_static_ness() {
    let unit = CompilationUnit::parse(NOTE);
    let note = note_type(&unit);
    let nested: Vec<_> = note.nested_type_names().collect();
    assert_eq!(nested, vec!["Converter", "Kind"]);

    let converter = unit.find_type("Converter").expect("nested lookup");
    assert!(converter.is_effectively_static());
    let kind = unit.find_type("Kind").expect("nested enum");
    assert_eq!(kind.kind, TypeKind::Enum);
    assert!(kind.is_effectively_static());
    assert_eq!(kind.members.len(), 1);
}

#[test]
fn element_values_cover_arrays_classes_and_nested_annotations() {
    let source = r#"
@Table(name = "t", indexes = {@Index("name DESC, age"), @Index(value = "x", unique = true)})
@Convert(converter = Foo.Bar.class, dbType = String.class)
@Uid(42L)
class A {}
"#;
    let unit = CompilationUnit::parse(source);
    let a = unit.find_type("A").expect("A");
    let annotations = &a.modifiers.annotations;

    let AnnotationArguments::Normal(table) = &annotations[0].arguments else {
        panic!("expected normal arguments");
    };
    assert_eq!(table[0], ("name".to_string(), ElementValue::String("t".to_string())));
    let ElementValue::Array(indexes) = &table[1].1 else {
        panic!("expected array");
    };
    assert_eq!(indexes.len(), 2);
    let ElementValue::Annotation(first) = &indexes[0] else {
        panic!("expected nested annotation");
    };
    assert_eq!(
        first.arguments,
        AnnotationArguments::Single(ElementValue::String("name DESC, age".to_string()))
    );

    assert_eq!(
        annotations[1].arguments,
        AnnotationArguments::Normal(vec![
            ("converter".to_string(), ElementValue::Class("Foo.Bar".to_string())),
            ("dbType".to_string(), ElementValue::Class("String".to_string())),
        ])
    );
    assert_eq!(annotations[2].arguments, AnnotationArguments::Single(ElementValue::Integer(42)));
}

#[test]
fn extent_includes_javadoc() {
    let unit = CompilationUnit::parse(NOTE);
    let note = note_type(&unit);
    let title = &note.members[1];
    let extent = title.extent();
    assert!(NOTE[extent].starts_with("/** Title shown in lists. */"));
    assert_eq!(title.span().line, 13);
}
