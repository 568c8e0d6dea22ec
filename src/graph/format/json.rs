//! JSON output: the lineage graph model of the view.

use crate::graph::view::GraphView;

/// Serialize the view as a graph model
pub fn to_json(view: &GraphView) -> anyhow::Result<String> {
    view.clone().into_model().to_json_pretty()
}
