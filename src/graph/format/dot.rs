//! Graphviz DOT format output.

use crate::config::LineageConfig;
use crate::graph::format::Layout;
use crate::graph::model::{LineageEdge, TableNode};
use crate::graph::view::{field_rows, GraphView};

/// Edge labels list at most this many distinct fields
const MAX_EDGE_LABEL_FIELDS: usize = 4;

/// Generate DOT output: one HTML-like field table per node, coloured by layer
pub fn to_dot(view: &GraphView, layout: Layout, config: &LineageConfig) -> String {
    let mut output = String::new();

    output.push_str("digraph lineage {\n");
    output.push_str("  graph [pad=\"0.5\", nodesep=\"0.6\", ranksep=\"1.2\"];\n");

    let rankdir = match layout {
        Layout::LR => "LR",
        Layout::TB => "TB",
    };
    output.push_str(&format!("  rankdir={};\n", rankdir));

    output.push_str("  node [shape=none, margin=0, fontname=\"Helvetica\"];\n");
    output.push_str("  edge [color=\"#888888\", fontsize=10, fontname=\"Helvetica\"];\n\n");

    for node in &view.nodes {
        output.push_str(&format!(
            "  {} [label=<{}>];\n",
            escape_dot_id(&node.id),
            generate_table_label(node, config.color_for(node.layer.as_deref()))
        ));
    }

    if !view.edges.is_empty() {
        output.push('\n');
    }

    for edge in &view.edges {
        let label = edge_label(edge);
        if label.is_empty() {
            output.push_str(&format!(
                "  {} -> {};\n",
                escape_dot_id(&edge.source),
                escape_dot_id(&edge.target)
            ));
        } else {
            output.push_str(&format!(
                "  {} -> {} [label=\"{}\"];\n",
                escape_dot_id(&edge.source),
                escape_dot_id(&edge.target),
                escape_dot_string(&label)
            ));
        }
    }

    output.push_str("}\n");
    output
}

/// Distinct crossing fields, shortened past the label limit
pub(crate) fn edge_label(edge: &LineageEdge) -> String {
    let distinct = edge.distinct_columns();
    if distinct.len() <= MAX_EDGE_LABEL_FIELDS {
        distinct.join(", ")
    } else {
        format!(
            "{}, +{} more",
            distinct[..MAX_EDGE_LABEL_FIELDS].join(", "),
            distinct.len() - MAX_EDGE_LABEL_FIELDS
        )
    }
}

fn generate_table_label(node: &TableNode, color: &str) -> String {
    let mut html = String::new();

    html.push_str("<TABLE BORDER=\"0\" CELLBORDER=\"1\" CELLSPACING=\"0\" CELLPADDING=\"4\">");

    html.push_str(&format!(
        "<TR><TD BGCOLOR=\"{}\" COLSPAN=\"2\"><B>{}</B></TD></TR>",
        escape_html(color),
        escape_html(&node.id)
    ));

    let tags: Vec<&str> = [node.layer.as_deref(), node.sub_layer.as_deref()]
        .into_iter()
        .flatten()
        .collect();
    if !tags.is_empty() {
        html.push_str(&format!(
            "<TR><TD COLSPAN=\"2\"><FONT POINT-SIZE=\"9\" COLOR=\"#666666\">{}</FONT></TD></TR>",
            escape_html(&tags.join(" / "))
        ));
    }

    let rows = field_rows(node);
    if !rows.is_empty() {
        html.push_str("<TR>");
        html.push_str("<TD BGCOLOR=\"#e2e8f0\"><FONT POINT-SIZE=\"10\"><B>Field</B></FONT></TD>");
        html.push_str("<TD BGCOLOR=\"#e2e8f0\"><FONT POINT-SIZE=\"10\"><B>Source field</B></FONT></TD>");
        html.push_str("</TR>");
    }

    for row in rows {
        html.push_str(&format!(
            "<TR><TD ALIGN=\"LEFT\">{}</TD><TD ALIGN=\"LEFT\"><FONT COLOR=\"#666666\">{}</FONT></TD></TR>",
            escape_html(&row.field),
            escape_html(&row.source_field)
        ));
    }

    html.push_str("</TABLE>");
    html
}

/// Escape a string for use in DOT HTML labels
fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn escape_dot_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Escape a string for use as a DOT node ID
fn escape_dot_id(s: &str) -> String {
    if s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !s.is_empty()
        && !s.starts_with(|c: char| c.is_ascii_digit())
    {
        s.to_string()
    } else {
        format!("\"{}\"", escape_dot_string(s))
    }
}
