//! Graph view with filtering and focus capabilities.
//!
//! A view is a mutable copy of a [`GraphModel`] that filters narrow down.
//! Every filter keeps the original node and edge order.

use crate::graph::model::{GraphModel, LineageEdge, TableNode};
use ahash::{AHashMap, AHashSet};
use glob::Pattern;
use schemars::JsonSchema;
use serde::Serialize;
use std::collections::{BTreeSet, VecDeque};

/// One row of a table's field-mapping table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct FieldRow {
    /// Field on the table
    pub field: String,
    /// Upstream field, empty when none
    pub source_field: String,
}

/// A filtered view of a lineage graph
#[derive(Debug, Clone)]
pub struct GraphView {
    pub nodes: Vec<TableNode>,
    pub edges: Vec<LineageEdge>,
}

impl GraphView {
    /// Create a full view of a model
    pub fn from_model(model: &GraphModel) -> Self {
        Self {
            nodes: model.nodes.clone(),
            edges: model.edges.clone(),
        }
    }

    /// Keep tables whose layer and sub-layer are selected.
    ///
    /// Tables without a layer (or sub-layer) always pass that check, and an
    /// empty selection does not restrict anything.
    pub fn filter_layers(&mut self, layers: &[String], sub_layers: &[String]) {
        if layers.is_empty() && sub_layers.is_empty() {
            return;
        }

        let selected = |value: &Option<String>, choices: &[String]| match value {
            None => true,
            Some(_) if choices.is_empty() => true,
            Some(v) => choices.iter().any(|c| c == v),
        };

        let keep: AHashSet<String> = self
            .nodes
            .iter()
            .filter(|n| selected(&n.layer, layers) && selected(&n.sub_layer, sub_layers))
            .map(|n| n.id.clone())
            .collect();

        self.apply_node_filter(&keep);
    }

    /// Filter to include only tables matching the given patterns
    pub fn filter_tables(&mut self, patterns: &[Pattern]) {
        if patterns.is_empty() {
            return;
        }

        let matching: AHashSet<String> = self
            .nodes
            .iter()
            .filter(|n| patterns.iter().any(|p| p.matches(&n.id)))
            .map(|n| n.id.clone())
            .collect();

        self.apply_node_filter(&matching);
    }

    /// Exclude tables matching the given patterns
    pub fn exclude_tables(&mut self, patterns: &[Pattern]) {
        if patterns.is_empty() {
            return;
        }

        let remaining: AHashSet<String> = self
            .nodes
            .iter()
            .filter(|n| !patterns.iter().any(|p| p.matches(&n.id)))
            .map(|n| n.id.clone())
            .collect();

        self.apply_node_filter(&remaining);
    }

    /// Focus on a table and its lineage neighborhood.
    ///
    /// Without `upstream`/`downstream` only direct sources and targets are
    /// kept. `upstream` follows sources transitively, `downstream` follows
    /// targets transitively, each bounded by `max_depth`.
    pub fn focus_table(
        &mut self,
        table: &str,
        upstream: bool,
        downstream: bool,
        max_depth: Option<usize>,
    ) {
        if !self.nodes.iter().any(|n| n.id == table) {
            self.nodes.clear();
            self.edges.clear();
            return;
        }

        let mut result_nodes = AHashSet::new();
        result_nodes.insert(table.to_string());

        let (sources_of, targets_of) = self.build_adjacency_maps();

        if upstream {
            traverse(&sources_of, table, max_depth, &mut result_nodes);
        }

        if downstream {
            traverse(&targets_of, table, max_depth, &mut result_nodes);
        }

        if !upstream && !downstream {
            for neighbors in [sources_of.get(table), targets_of.get(table)]
                .into_iter()
                .flatten()
            {
                result_nodes.extend(neighbors.iter().cloned());
            }
        }

        self.apply_node_filter(&result_nodes);
    }

    /// Keep only tables that are part of cycles
    pub fn filter_to_cyclic_tables(&mut self, cyclic_tables: &AHashSet<String>) {
        self.apply_node_filter(cyclic_tables);
    }

    pub fn table_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get_table(&self, id: &str) -> Option<&TableNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Total rows over all field tables in the view
    pub fn field_count(&self) -> usize {
        self.nodes.iter().map(TableNode::field_count).sum()
    }

    /// Distinct layers present, sorted
    pub fn layers(&self) -> Vec<String> {
        let set: BTreeSet<&String> = self.nodes.iter().filter_map(|n| n.layer.as_ref()).collect();
        set.into_iter().cloned().collect()
    }

    /// Distinct sub-layers present, sorted
    pub fn sub_layers(&self) -> Vec<String> {
        let set: BTreeSet<&String> = self
            .nodes
            .iter()
            .filter_map(|n| n.sub_layer.as_ref())
            .collect();
        set.into_iter().cloned().collect()
    }

    /// Field-mapping table for a table, `None` if it is not in the view
    pub fn field_rows(&self, id: &str) -> Option<Vec<FieldRow>> {
        self.get_table(id).map(field_rows)
    }

    pub fn into_model(self) -> GraphModel {
        GraphModel {
            nodes: self.nodes,
            edges: self.edges,
        }
    }

    fn apply_node_filter(&mut self, keep: &AHashSet<String>) {
        self.nodes.retain(|n| keep.contains(&n.id));
        self.edges
            .retain(|e| keep.contains(&e.source) && keep.contains(&e.target));
    }

    /// (table -> its sources, table -> its targets)
    fn build_adjacency_maps(
        &self,
    ) -> (AHashMap<String, Vec<String>>, AHashMap<String, Vec<String>>) {
        let mut sources_of: AHashMap<String, Vec<String>> = AHashMap::new();
        let mut targets_of: AHashMap<String, Vec<String>> = AHashMap::new();

        for edge in &self.edges {
            sources_of
                .entry(edge.target.clone())
                .or_default()
                .push(edge.source.clone());
            targets_of
                .entry(edge.source.clone())
                .or_default()
                .push(edge.target.clone());
        }

        (sources_of, targets_of)
    }
}

/// Zip `columns` with `columns_source`, padding the shorter list with ""
pub fn field_rows(node: &TableNode) -> Vec<FieldRow> {
    (0..node.field_count())
        .map(|i| FieldRow {
            field: node.columns.get(i).cloned().unwrap_or_default(),
            source_field: node.columns_source.get(i).cloned().unwrap_or_default(),
        })
        .collect()
}

fn traverse(
    adjacency: &AHashMap<String, Vec<String>>,
    start: &str,
    max_depth: Option<usize>,
    result: &mut AHashSet<String>,
) {
    let mut queue: VecDeque<(String, usize)> = VecDeque::new();
    queue.push_back((start.to_string(), 0));

    while let Some((current, depth)) = queue.pop_front() {
        if let Some(max) = max_depth {
            if depth >= max {
                continue;
            }
        }

        if let Some(neighbors) = adjacency.get(&current) {
            for neighbor in neighbors {
                if result.insert(neighbor.clone()) {
                    queue.push_back((neighbor.clone(), depth + 1));
                }
            }
        }
    }
}
