use openapi_yaml::{Error, parse, parse_file};

const PETSTORE: &str = "\
openapi: 3.0.3
info:
  title: Swagger Petstore
  version: '1.0.0'
paths:
  /pets:
    get:
      tags: [pets]
";

#[test]
fn nested_nodes_are_located() {
    let yaml = parse_file(PETSTORE, "petstore.yaml").unwrap();

    let version = yaml.navigate(&["info", "version"]).unwrap();
    assert_eq!(version.yaml.as_str(), Some("1.0.0"));
    assert_eq!(version.source_location.line, 4);
    assert_eq!(version.source_location.col, 12);
    assert_eq!(version.source_location.file.as_deref(), Some("petstore.yaml"));

    let tag = yaml.navigate(&["paths", "/pets", "get", "tags", "0"]).unwrap();
    assert_eq!(tag.yaml.as_str(), Some("pets"));
    assert_eq!(tag.source_location.line, 8);
    assert_eq!(tag.source_location.to_string(), "petstore.yaml:8:14");
}

#[test]
fn version_numbers_stay_text() {
    let yaml = parse(PETSTORE).unwrap();
    assert_eq!(yaml.get_hash_value("openapi").unwrap().yaml.as_str(), Some("3.0.3"));
}

#[test]
fn json_documents_parse() {
    let yaml = parse(r#"{"openapi": "3.1.0", "info": {"title": "Pets", "version": "1"}}"#).unwrap();
    let keys: Vec<String> = yaml
        .as_hash()
        .unwrap()
        .iter()
        .filter_map(|entry| entry.key.scalar_text())
        .collect();
    assert_eq!(keys, vec!["openapi", "info"]);
    assert_eq!(yaml.navigate(&["info", "version"]).unwrap().yaml.as_str(), Some("1"));
}

#[test]
fn broken_documents_report_where() {
    let err = parse_file("info:\n  title: [Pets\n", "broken.yaml").unwrap_err();
    assert!(matches!(err, Error::ParseError { .. }));
    assert!(err.location().is_some());
}
