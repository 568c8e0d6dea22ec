//! Projection of the accumulators into the graph model.

use crate::graph::model::{GraphModel, LineageEdge, TableNode};
use crate::lineage::edges::EdgeAggregator;
use crate::lineage::registry::TableRegistry;

/// Freeze a registry and an edge aggregator into a [`GraphModel`].
///
/// Nodes and edges keep first-seen order. Each node's field pairs are split
/// into the parallel `columns` / `columns_source` lists.
pub fn export(registry: TableRegistry, edges: EdgeAggregator) -> GraphModel {
    let nodes = registry
        .into_entries()
        .into_iter()
        .map(|entry| {
            let (columns, columns_source) = entry
                .fields
                .into_iter()
                .map(|pair| (pair.field, pair.source_field))
                .unzip();
            TableNode {
                id: entry.id,
                layer: entry.layer,
                sub_layer: entry.sub_layer,
                columns,
                columns_source,
            }
        })
        .collect();

    let edges = edges
        .into_edges()
        .into_iter()
        .map(|e| LineageEdge {
            source: e.source,
            target: e.target,
            columns: e.fields,
        })
        .collect();

    GraphModel { nodes, edges }
}
