//! JSON Schema generation for CLI output types.
//!
//! Every command with JSON output has a schema here, exported by the `schema`
//! subcommand. `graph` covers both `build` output and `graph --format json`.

use schemars::{schema_for, Schema};
use std::collections::BTreeMap;

/// Returns all JSON schemas for commands with JSON output.
/// Uses BTreeMap for deterministic ordering (important for diffable output).
pub fn all_schemas() -> BTreeMap<&'static str, Schema> {
    let mut schemas = BTreeMap::new();

    schemas.insert("graph", schema_for!(crate::graph::GraphModel));
    schemas.insert("show", schema_for!(crate::cmd::show::ShowJsonOutput));
    schemas.insert(
        "validate",
        schema_for!(crate::cmd::validate::ValidationSummary),
    );

    schemas
}

/// Generate a single schema by command name.
pub fn get_schema(command: &str) -> Option<Schema> {
    all_schemas().remove(command)
}

/// List all available schema names.
pub fn schema_names() -> Vec<&'static str> {
    all_schemas().keys().copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_names() {
        assert_eq!(schema_names(), vec!["graph", "show", "validate"]);
    }

    #[test]
    fn test_graph_schema_has_model_fields() {
        let schema = serde_json::to_value(get_schema("graph").unwrap()).unwrap();
        let required = schema["required"].as_array().unwrap();
        assert!(required.iter().any(|v| v == "nodes"));
        assert!(required.iter().any(|v| v == "edges"));
        assert!(get_schema("split").is_none());
    }
}
