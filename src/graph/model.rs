//! The exported lineage graph model.
//!
//! This is the JSON artifact handed to viewers: a node list and an edge list,
//! both in first-seen order.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// A table in the lineage graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TableNode {
    pub id: String,
    pub layer: Option<String>,
    pub sub_layer: Option<String>,
    /// Field names on this table
    #[serde(default)]
    pub columns: Vec<String>,
    /// Upstream field for each entry of `columns`, same index
    #[serde(default)]
    pub columns_source: Vec<String>,
}

impl TableNode {
    /// Number of rows in the field table (the longer of the two lists)
    pub fn field_count(&self) -> usize {
        self.columns.len().max(self.columns_source.len())
    }
}

/// A source -> target relation between two tables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct LineageEdge {
    pub source: String,
    pub target: String,
    /// Source fields that crossed this edge, in record order
    #[serde(default)]
    pub columns: Vec<String>,
}

impl LineageEdge {
    /// Crossing fields without repeats, first occurrence order
    pub fn distinct_columns(&self) -> Vec<&str> {
        let mut seen = ahash::AHashSet::new();
        self.columns
            .iter()
            .map(String::as_str)
            .filter(|c| seen.insert(*c))
            .collect()
    }
}

/// Lineage graph: nodes and edges
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct GraphModel {
    pub nodes: Vec<TableNode>,
    pub edges: Vec<LineageEdge>,
}

/// Summary numbers for a graph
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, JsonSchema)]
pub struct GraphStats {
    pub table_count: usize,
    pub edge_count: usize,
    pub field_count: usize,
    /// Tables without incoming edges
    pub root_count: usize,
    /// Table count per layer; unlayered tables are counted under "(none)"
    pub layers: BTreeMap<String, usize>,
}

impl GraphModel {
    pub fn node(&self, id: &str) -> Option<&TableNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn stats(&self) -> GraphStats {
        let mut layers = BTreeMap::new();
        for node in &self.nodes {
            let key = node.layer.clone().unwrap_or_else(|| "(none)".to_string());
            *layers.entry(key).or_insert(0) += 1;
        }

        let targets: ahash::AHashSet<&str> =
            self.edges.iter().map(|e| e.target.as_str()).collect();

        GraphStats {
            table_count: self.nodes.len(),
            edge_count: self.edges.len(),
            field_count: self.nodes.iter().map(TableNode::field_count).sum(),
            root_count: self
                .nodes
                .iter()
                .filter(|n| !targets.contains(n.id.as_str()))
                .count(),
            layers,
        }
    }

    /// Serialize with 4-space indentation, non-ASCII kept as is
    pub fn to_json_pretty(&self) -> anyhow::Result<String> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)?;
        Ok(String::from_utf8(buf)?)
    }

    /// SHA-256 of the pretty JSON form, hex encoded
    pub fn fingerprint(&self) -> anyhow::Result<String> {
        let json = self.to_json_pretty()?;
        Ok(hex::encode(Sha256::digest(json.as_bytes())))
    }

    /// Load a model previously written by `build`
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let model: GraphModel = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("invalid graph model {}: {}", path.display(), e))?;
        Ok(model)
    }
}
