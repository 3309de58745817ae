//! JSON shape of the entity model as dumped by drivers.

use std::path::PathBuf;

use entigen_core::{
    Entity, IdInfo, ParsedProperty, ProvenanceHint, TransientField, Variable, VariableType,
};
use pretty_assertions::assert_eq;

fn sample_entity() -> Entity {
    let mut id = ParsedProperty::plain(Variable::new(VariableType::long(), "id").expect("valid"));
    id.id = Some(IdInfo {
        autoincrement: true,
        assignable: false,
    });
    id.is_not_null = true;

    Entity {
        name: "Note".to_string(),
        schema_name: "default".to_string(),
        package_name: "com.example".to_string(),
        is_active: false,
        table_name: None,
        uid: None,
        keep_source_entirely: false,
        generate_constructors: true,
        generate_accessors: true,
        properties: vec![id],
        transient_fields: vec![TransientField {
            variable: Variable::new(
                VariableType::object("java.lang.String", "String", Vec::new()),
                "cache",
            )
            .expect("valid"),
            source: None,
            hint: ProvenanceHint::Generated(Some(7)),
        }],
        constructors: Vec::new(),
        methods: Vec::new(),
        one_relations: Vec::new(),
        many_relations: Vec::new(),
        indexes: Vec::new(),
        nested_types: Vec::new(),
        source_file: PathBuf::from("Note.java"),
        source_text: "class Note {}".to_string(),
        last_field_position: None,
        not_null_annotation: None,
    }
}

#[test]
fn source_text_is_not_serialized() {
    let json = serde_json::to_value(sample_entity()).expect("serializes");
    assert!(json.get("source_text").is_none());
    assert_eq!(json["name"], "Note");
    assert_eq!(json["properties"][0]["id"]["autoincrement"], true);
}

#[test]
fn provenance_hint_is_tagged() {
    let json = serde_json::to_value(sample_entity()).expect("serializes");
    assert_eq!(
        json["transient_fields"][0]["hint"],
        serde_json::json!({ "kind": "generated", "hash": 7 })
    );
    assert_eq!(
        serde_json::to_value(ProvenanceHint::Keep).expect("serializes"),
        serde_json::json!({ "kind": "keep" })
    );
}

#[test]
fn qualified_name_and_lookups() {
    let entity = sample_entity();
    assert_eq!(entity.qualified_name(), "com.example.Note");
    assert!(entity.id_property().is_some());
    assert!(entity.property("missing").is_none());
}
