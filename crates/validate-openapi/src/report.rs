//! Rendering of validation results.

use clap::ValueEnum;
use openapi_parser::{ErrorCollection, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// One line per error, followed by a summary
    Text,
    /// A JSON object with the input path and every error
    Json,
}

pub fn render(format: Format, input: &str, errors: &ErrorCollection) -> String {
    match format {
        Format::Text => render_text(input, errors),
        Format::Json => render_json(input, errors),
    }
}

fn render_text(input: &str, errors: &ErrorCollection) -> String {
    if errors.is_empty() {
        return format!("✓ {} is a valid OpenAPI document\n", input);
    }
    let mut out = String::new();
    for (location, group) in errors.group_by_location() {
        out.push_str(&format!("{}\n", location));
        for error in group {
            out.push_str(&format!("  ✖ {}\n", detail(error)));
        }
    }
    let noun = if errors.len() == 1 { "error" } else { "errors" };
    out.push_str(&format!("\n{} {} in {}\n", errors.len(), noun, input));
    out
}

fn detail(error: &ValidationError) -> String {
    match &error.source_location {
        Some(at) => format!("{} [{}] at {}", error.message(), error.error_code(), at),
        None => format!("{} [{}]", error.message(), error.error_code()),
    }
}

fn render_json(input: &str, errors: &ErrorCollection) -> String {
    let report = serde_json::json!({
        "input": input,
        "valid": errors.is_empty(),
        "errors": errors.to_json(),
    });
    format!("{:#}\n", report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use openapi_parser::ValidationErrorKind;
    use openapi_parser::SourceLocation;

    fn errors() -> ErrorCollection {
        vec![
            ValidationError::new(
                ValidationErrorKind::MissingFields {
                    fields: vec!["version".to_string()],
                },
                "#/info",
            ),
            ValidationError::new(ValidationErrorKind::custom("Expected a valid URL"), "#/info/termsOfService")
                .with_source_location(Some(SourceLocation::new(Some("api.yaml".into()), 40, 4, 19, 9))),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_text_for_valid_document() {
        let out = render(Format::Text, "api.yaml", &ErrorCollection::new());
        assert_eq!(out, "✓ api.yaml is a valid OpenAPI document\n");
    }

    #[test]
    fn test_text_groups_by_location() {
        let out = render(Format::Text, "api.yaml", &errors());
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(
            lines,
            vec![
                "#/info",
                "  ✖ Missing required fields: version [OA-1-13]",
                "#/info/termsOfService",
                "  ✖ Expected a valid URL [OA-1-99] at api.yaml:4:19",
                "",
                "2 errors in api.yaml",
            ]
        );
    }

    #[test]
    fn test_json_report() {
        let out = render(Format::Json, "api.yaml", &errors());
        let report: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(report["valid"], false);
        assert_eq!(report["errors"][1]["location"], "#/info/termsOfService");
        assert_eq!(report["errors"][1]["source_location"]["line"], 4);
    }
}
