//! Mermaid flowchart output.

use crate::config::LineageConfig;
use crate::graph::format::dot::edge_label;
use crate::graph::format::Layout;
use crate::graph::view::GraphView;
use ahash::AHashMap;
use std::collections::BTreeMap;

/// Generate a Mermaid flowchart from a graph view.
///
/// Nodes get positional ids (`t0`, `t1`, ...) so table names never need
/// escaping outside of labels. Each layer becomes a class with its fill colour.
pub fn to_mermaid(view: &GraphView, layout: Layout, config: &LineageConfig) -> String {
    let mut output = String::new();

    let direction = match layout {
        Layout::LR => "LR",
        Layout::TB => "TB",
    };
    output.push_str(&format!("flowchart {}\n", direction));

    let mut ids: AHashMap<&str, String> = AHashMap::new();
    let mut classes: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for (i, node) in view.nodes.iter().enumerate() {
        let id = format!("t{}", i);
        output.push_str(&format!("    {}[\"{}\"]\n", id, escape_label(&node.id)));
        classes
            .entry(class_name(node.layer.as_deref()))
            .or_default()
            .push(id.clone());
        ids.insert(node.id.as_str(), id);
    }

    if !view.edges.is_empty() {
        output.push('\n');
    }

    for edge in &view.edges {
        let (Some(from), Some(to)) = (ids.get(edge.source.as_str()), ids.get(edge.target.as_str()))
        else {
            continue;
        };
        let label = edge_label(edge);
        if label.is_empty() {
            output.push_str(&format!("    {} --> {}\n", from, to));
        } else {
            output.push_str(&format!(
                "    {} -->|\"{}\"| {}\n",
                from,
                escape_label(&label),
                to
            ));
        }
    }

    if !classes.is_empty() {
        output.push('\n');
    }

    for (class, members) in &classes {
        let layer = view
            .nodes
            .iter()
            .find(|n| class_name(n.layer.as_deref()) == *class)
            .and_then(|n| n.layer.as_deref());
        output.push_str(&format!(
            "    classDef {} fill:{},stroke:#333,color:#000\n",
            class,
            config.color_for(layer)
        ));
        output.push_str(&format!("    class {} {}\n", members.join(","), class));
    }

    output
}

/// Class name for a layer: `layer_<name>`, `layer_none` when unset
fn class_name(layer: Option<&str>) -> String {
    match layer {
        None => "layer_none".to_string(),
        Some(l) => {
            let safe: String = l
                .to_lowercase()
                .chars()
                .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
                .collect();
            format!("layer_{}", safe)
        }
    }
}

/// Escape text inside a quoted Mermaid label
fn escape_label(s: &str) -> String {
    s.replace('"', "#quot;")
}
