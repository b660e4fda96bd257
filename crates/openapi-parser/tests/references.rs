//! Reference resolution within a source, across files and around cycles.

use openapi_parser::openapi::Schema;
use openapi_parser::{Document, Error, JsonInput, RawValue, Source};
use serde_json::json;
use std::fs;
use std::sync::Arc;

fn widgets() -> Arc<Source> {
    Source::new(Arc::new(JsonInput::new(
        "widgets",
        json!({"components": {"widgets": {"x": 1}}}),
    )))
}

#[test]
fn anchor_reference_resolves_to_data() {
    let resolved = widgets().resolve_reference("#/components/widgets/x").unwrap();
    assert_eq!(resolved.value, RawValue::Integer(1));
    assert_eq!(resolved.pointer.to_string(), "#/components/widgets/x");
}

#[test]
fn missing_target_is_a_reference_error() {
    let err = widgets().resolve_reference("#/components/missing").unwrap_err();
    assert!(matches!(err, Error::Reference { .. }));
}

#[test]
fn non_anchor_reference_is_rejected() {
    let err = widgets().resolve_reference("widgets.yaml#/x").unwrap_err();
    assert!(err.is_reference());
    assert!(
        err.to_string()
            .starts_with("only anchor references are currently supported")
    );
}

const NODE_TREE: &str = "\
openapi: 3.0.3
info:
  title: Trees
  version: '1.0'
components:
  schemas:
    Node:
      type: object
      properties:
        value:
          type: integer
        children:
          type: array
          items:
            $ref: '#/components/schemas/Node'
";

#[test]
fn reference_only_cycles_are_errors() {
    let document = Document::from_yaml_str(
        "cycles.yaml",
        "\
openapi: 3.0.3
info:
  title: Cycles
  version: '1.0'
components:
  schemas:
    A:
      $ref: '#/components/schemas/B'
    B:
      $ref: '#/components/schemas/A'
    C:
      $ref: '#/components/schemas/C'
    D:
      type: string
",
    )
    .unwrap();

    let locations: Vec<&str> = document.errors().iter().map(|e| e.location()).collect();
    assert_eq!(
        locations,
        vec![
            "#/components/schemas/A",
            "#/components/schemas/B",
            "#/components/schemas/C",
        ]
    );
    assert!(document.errors().iter().all(|e| e.error_code() == "OA-1-15"));
    assert!(document.root().unwrap_err().is_reference());
}

#[test]
fn cyclic_schemas_terminate() {
    let document = Document::from_yaml_str("trees.yaml", NODE_TREE).unwrap();
    assert!(document.is_valid());

    let root = document.root().unwrap();
    let node = root.components().unwrap().schema("Node").unwrap().unwrap();
    let children = node.property("children").unwrap().unwrap();
    let item = children.items().unwrap().unwrap();
    assert_eq!(item.schema_type(), Some("object"));

    // The placeholder builds the same schema again, one level down.
    let grandchildren = item.property("children").unwrap().unwrap();
    assert_eq!(grandchildren.schema_type(), Some("array"));
}

#[test]
fn references_into_other_files() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("openapi.yaml"),
        "\
openapi: 3.0.3
info:
  title: Pets
  version: '1.0'
components:
  schemas:
    Pet:
      $ref: 'schemas.yaml#/Pet'
    Animal:
      $ref: './schemas.yaml#/Pet'
",
    )
    .unwrap();
    fs::write(
        dir.path().join("schemas.yaml"),
        "Pet:\n  type: object\n  title: A pet\n",
    )
    .unwrap();

    let document = Document::open(dir.path().join("openapi.yaml")).unwrap();
    assert!(document.is_valid());

    let components = document.root().unwrap().components().unwrap();
    let pet: Schema = components.schema("Pet").unwrap().unwrap();
    assert_eq!(pet.title(), Some("A pet"));
    assert_eq!(components.schema("Animal").unwrap().unwrap().title(), Some("A pet"));

    // Both references share one source for schemas.yaml.
    assert_eq!(document.sources().len(), 2);
}

#[test]
fn errors_in_other_files_name_the_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("openapi.yaml"),
        "\
openapi: 3.0.3
info:
  title: Pets
  version: '1.0'
components:
  schemas:
    Pet:
      $ref: 'schemas.yaml#/Pet'
",
    )
    .unwrap();
    fs::write(dir.path().join("schemas.yaml"), "Pet:\n  type: map\n").unwrap();

    let document = Document::open(dir.path().join("openapi.yaml")).unwrap();
    assert_eq!(document.errors().len(), 1);
    let error = document.errors().first().unwrap();
    assert!(error.location().starts_with("#/components/schemas/Pet/type (file:"));
    assert!(error.location().ends_with("schemas.yaml#/Pet/type)"));
    assert_eq!(error.source_location.as_ref().unwrap().line, 2);
}

#[test]
fn missing_files_are_reported_in_place() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("openapi.yaml"),
        "\
openapi: 3.0.3
info:
  title: Pets
  version: '1.0'
components:
  schemas:
    Pet:
      $ref: 'missing.yaml#/Pet'
",
    )
    .unwrap();

    let document = Document::open(dir.path().join("openapi.yaml")).unwrap();
    let error = document.errors().first().unwrap();
    assert_eq!(error.location(), "#/components/schemas/Pet");
    assert_eq!(error.error_code(), "OA-1-15");
    assert!(document.root().unwrap_err().is_reference());
}
