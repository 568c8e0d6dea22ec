//! Self-contained HTML page: Mermaid lineage diagram plus field tables.

use crate::config::LineageConfig;
use crate::graph::format::mermaid;
use crate::graph::format::Layout;
use crate::graph::view::{field_rows, GraphView};

/// Generate an HTML page with the flowchart and one field table per table
pub fn to_html(view: &GraphView, title: &str, layout: Layout, config: &LineageConfig) -> String {
    let mermaid_code = mermaid::to_mermaid(view, layout, config);

    let stats = format!(
        "{} tables · {} fields · {} edges",
        view.table_count(),
        view.field_count(),
        view.edge_count()
    );

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>{title}</title>
  <script src="https://cdn.jsdelivr.net/npm/mermaid@10/dist/mermaid.min.js"></script>
  <script src="https://cdn.jsdelivr.net/npm/panzoom@9/dist/panzoom.min.js"></script>
  <style>
    :root {{
      --color-bg: #0a0a0a;
      --color-surface: #111111;
      --color-text: #e6edf3;
      --color-text-muted: #8b949e;
      --color-border: #27272a;
      --color-accent: #58a6ff;
    }}

    [data-theme="light"] {{
      --color-bg: #ffffff;
      --color-surface: #f6f8fa;
      --color-text: #1f2328;
      --color-text-muted: #656d76;
      --color-border: #d0d7de;
      --color-accent: #0969da;
    }}

    * {{ box-sizing: border-box; margin: 0; padding: 0; }}
    html, body {{ height: 100%; overflow: hidden; }}

    body {{
      font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif;
      background: var(--color-bg);
      color: var(--color-text);
      display: flex;
    }}

    .diagram-container {{
      flex: 1;
      overflow: hidden;
      cursor: grab;
      padding-bottom: 44px;
    }}

    .mermaid {{ display: inline-block; transform-origin: 0 0; }}
    .mermaid svg {{ max-width: none !important; }}

    .sidebar {{
      width: 360px;
      border-left: 1px solid var(--color-border);
      background: var(--color-surface);
      overflow-y: auto;
      padding: 12px 12px 56px;
      font-size: 13px;
    }}

    .sidebar input {{
      width: 100%;
      padding: 6px 8px;
      margin-bottom: 10px;
      border: 1px solid var(--color-border);
      border-radius: 4px;
      background: var(--color-bg);
      color: var(--color-text);
    }}

    details {{ border-bottom: 1px solid var(--color-border); padding: 6px 0; }}
    summary {{ cursor: pointer; font-weight: 600; }}
    .tag {{ color: var(--color-text-muted); font-weight: 400; margin-left: 6px; }}
    table {{ width: 100%; border-collapse: collapse; margin-top: 6px; }}
    th, td {{ text-align: left; padding: 3px 6px; border-bottom: 1px solid var(--color-border); }}
    th {{ color: var(--color-text-muted); font-weight: 600; }}

    .bottom-bar {{
      position: fixed;
      bottom: 0;
      left: 0;
      right: 0;
      height: 44px;
      background: var(--color-surface);
      border-top: 1px solid var(--color-border);
      display: flex;
      justify-content: space-between;
      align-items: center;
      padding: 0 16px;
      font-size: 13px;
    }}

    .muted {{ color: var(--color-text-muted); }}

    .btn {{
      background: none;
      border: 1px solid var(--color-border);
      border-radius: 4px;
      padding: 5px 10px;
      cursor: pointer;
      color: var(--color-text-muted);
      font-family: inherit;
      font-size: 12px;
    }}

    .btn:hover {{ border-color: var(--color-accent); color: var(--color-accent); }}
  </style>
</head>
<body data-theme="dark">
  <div class="diagram-container">
    <div class="mermaid" id="diagram">
{mermaid_code}
    </div>
  </div>

  <aside class="sidebar">
    <input id="tableFilter" type="search" placeholder="Filter tables…" oninput="filterTables(this.value)">
{field_tables}
  </aside>

  <div class="bottom-bar">
    <span><strong>lineage-graph</strong> <span class="muted">· {title}</span></span>
    <span>
      <span class="muted">{stats}</span>
      <button class="btn" onclick="toggleTheme()" title="Toggle theme">Theme</button>
    </span>
  </div>

  <script>
    const mermaidCode = `{mermaid_code_escaped}`;
    let panzoomInstance = null;

    function filterTables(query) {{
      const q = query.trim().toLowerCase();
      document.querySelectorAll('details[data-table]').forEach((el) => {{
        el.style.display = el.dataset.table.toLowerCase().includes(q) ? '' : 'none';
      }});
    }}

    function initPanzoom() {{
      const diagram = document.getElementById('diagram');
      if (panzoomInstance) panzoomInstance.dispose();
      panzoomInstance = panzoom(diagram, {{ maxZoom: 5, minZoom: 0.1, bounds: false }});
    }}

    function render(theme) {{
      mermaid.initialize({{
        startOnLoad: false,
        theme: theme === 'dark' ? 'dark' : 'default',
        maxTextSize: 500000,
        flowchart: {{ useMaxWidth: false }},
        securityLevel: 'strict'
      }});
      const container = document.getElementById('diagram');
      container.innerHTML = mermaidCode;
      container.removeAttribute('data-processed');
      mermaid.run({{ nodes: [container] }}).then(() => initPanzoom());
    }}

    function toggleTheme() {{
      const next = document.body.getAttribute('data-theme') === 'dark' ? 'light' : 'dark';
      document.body.setAttribute('data-theme', next);
      localStorage.setItem('lineage-theme', next);
      render(next);
    }}

    document.addEventListener('DOMContentLoaded', () => {{
      const theme = localStorage.getItem('lineage-theme') ||
        (window.matchMedia('(prefers-color-scheme: dark)').matches ? 'dark' : 'light');
      document.body.setAttribute('data-theme', theme);
      render(theme);
    }});
  </script>
</body>
</html>"##,
        title = escape_html(title),
        mermaid_code = indent_mermaid(&mermaid_code),
        field_tables = render_field_tables(view),
        stats = stats,
        mermaid_code_escaped = escape_js(&mermaid_code),
    )
}

/// One collapsible field-mapping table per node
fn render_field_tables(view: &GraphView) -> String {
    let mut html = String::new();

    for node in &view.nodes {
        let tags: Vec<&str> = [node.layer.as_deref(), node.sub_layer.as_deref()]
            .into_iter()
            .flatten()
            .collect();

        html.push_str(&format!(
            "    <details data-table=\"{}\">\n      <summary>{}",
            escape_html(&node.id),
            escape_html(&node.id)
        ));
        if !tags.is_empty() {
            html.push_str(&format!(
                "<span class=\"tag\">{}</span>",
                escape_html(&tags.join(" / "))
            ));
        }
        html.push_str("</summary>\n");

        let rows = field_rows(node);
        if rows.is_empty() {
            html.push_str("      <p class=\"muted\">No fields</p>\n");
        } else {
            html.push_str("      <table>\n        <tr><th>Field</th><th>Source field</th></tr>\n");
            for row in rows {
                html.push_str(&format!(
                    "        <tr><td>{}</td><td>{}</td></tr>\n",
                    escape_html(&row.field),
                    escape_html(&row.source_field)
                ));
            }
            html.push_str("      </table>\n");
        }

        html.push_str("    </details>\n");
    }

    html
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn escape_js(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('`', "\\`")
        .replace("${", "\\${")
        .replace("</", "<\\/")
}

fn indent_mermaid(code: &str) -> String {
    code.lines()
        .map(|line| format!("      {}", escape_html(line)))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::model::TableNode;

    fn create_test_view() -> GraphView {
        GraphView {
            nodes: vec![TableNode {
                id: "orders".to_string(),
                layer: Some("gold".to_string()),
                sub_layer: Some("marts".to_string()),
                columns: vec!["id".to_string(), "amount".to_string()],
                columns_source: vec!["order_id".to_string()],
            }],
            edges: vec![],
        }
    }

    fn render() -> String {
        to_html(
            &create_test_view(),
            "Lineage <test>",
            Layout::LR,
            &LineageConfig::default(),
        )
    }

    #[test]
    fn test_html_contains_flowchart() {
        let output = render();
        assert!(output.contains("flowchart LR"));
        assert!(output.contains("panzoom"));
    }

    #[test]
    fn test_html_title_escaped() {
        assert!(render().contains("<title>Lineage &lt;test&gt;</title>"));
    }

    #[test]
    fn test_html_field_table_padded() {
        let output = render();
        assert!(output.contains("data-table=\"orders\""));
        assert!(output.contains("<span class=\"tag\">gold / marts</span>"));
        assert!(output.contains("<tr><td>id</td><td>order_id</td></tr>"));
        assert!(output.contains("<tr><td>amount</td><td></td></tr>"));
    }

    #[test]
    fn test_html_stats() {
        assert!(render().contains("1 tables · 2 fields · 0 edges"));
    }
}
