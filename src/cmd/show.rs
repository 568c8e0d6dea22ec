use super::input::{load_or_build, resolve_config};
use crate::graph::{field_rows, FieldRow, GraphModel};
use schemars::JsonSchema;
use serde::Serialize;
use std::path::PathBuf;

/// JSON output of the show command
#[derive(Debug, Serialize, JsonSchema)]
pub(crate) struct ShowJsonOutput {
    pub table: String,
    pub layer: Option<String>,
    pub sub_layer: Option<String>,
    /// Tables feeding this one, in edge order
    pub sources: Vec<String>,
    /// Tables fed by this one, in edge order
    pub targets: Vec<String>,
    pub fields: Vec<FieldRow>,
}

impl ShowJsonOutput {
    fn from_model(model: &GraphModel, table: &str) -> Option<Self> {
        let node = model.node(table)?;
        Some(Self {
            table: node.id.clone(),
            layer: node.layer.clone(),
            sub_layer: node.sub_layer.clone(),
            sources: model
                .edges
                .iter()
                .filter(|e| e.target == table)
                .map(|e| e.source.clone())
                .collect(),
            targets: model
                .edges
                .iter()
                .filter(|e| e.source == table)
                .map(|e| e.target.clone())
                .collect(),
            fields: field_rows(node),
        })
    }
}

pub fn run(
    input: PathBuf,
    table: String,
    config: Option<PathBuf>,
    delimiter: Option<char>,
    json: bool,
) -> anyhow::Result<()> {
    let config = resolve_config(config.as_deref(), delimiter, true)?;
    let (model, _) = load_or_build(&input, &config)?;

    let Some(output) = ShowJsonOutput::from_model(&model, &table) else {
        anyhow::bail!("table not found in lineage graph: {}", table);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Table: {}", output.table);
    println!("Layer: {}", output.layer.as_deref().unwrap_or("-"));
    println!("Sub-layer: {}", output.sub_layer.as_deref().unwrap_or("-"));
    if !output.sources.is_empty() {
        println!("Sources: {}", output.sources.join(", "));
    }
    if !output.targets.is_empty() {
        println!("Targets: {}", output.targets.join(", "));
    }
    println!();

    if output.fields.is_empty() {
        println!("No fields recorded.");
        return Ok(());
    }

    let width = output
        .fields
        .iter()
        .map(|r| r.field.chars().count())
        .max()
        .unwrap_or(0)
        .max("Field".len());

    println!("{:<width$}  Source field", "Field", width = width);
    println!("{}", "─".repeat(width + 14));
    for row in &output.fields {
        println!("{:<width$}  {}", row.field, row.source_field, width = width);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{LineageEdge, TableNode};

    #[test]
    fn test_show_output_neighbours() {
        let model = GraphModel {
            nodes: vec![
                TableNode {
                    id: "T1".to_string(),
                    layer: Some("silver".to_string()),
                    sub_layer: None,
                    columns: vec!["a".to_string(), "b".to_string()],
                    columns_source: vec!["x".to_string()],
                },
                TableNode {
                    id: "S1".to_string(),
                    layer: None,
                    sub_layer: None,
                    columns: vec![],
                    columns_source: vec![],
                },
            ],
            edges: vec![LineageEdge {
                source: "S1".to_string(),
                target: "T1".to_string(),
                columns: vec!["x".to_string()],
            }],
        };

        let output = ShowJsonOutput::from_model(&model, "T1").unwrap();
        assert_eq!(output.sources, vec!["S1"]);
        assert!(output.targets.is_empty());
        assert_eq!(output.fields.len(), 2);
        assert_eq!(output.fields[1].source_field, "");
        assert!(ShowJsonOutput::from_model(&model, "missing").is_none());
    }
}
