//! Graph command: export a filtered lineage view.

use super::build::print_diagnostics;
use super::input::{display_name, load_or_build, resolve_config};
use crate::graph::{
    cyclic_tables, find_cycles, to_dot, to_html, to_json, to_mermaid, Cycle, GraphView, Layout,
    OutputFormat,
};
use anyhow::{bail, Result};
use glob::Pattern;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Options of the graph command beyond input and output
#[derive(Debug, Default)]
pub struct GraphOptions {
    pub format: Option<String>,
    pub layout: Option<String>,
    pub layers: Option<String>,
    pub sub_layers: Option<String>,
    pub table: Option<String>,
    pub upstream: bool,
    pub downstream: bool,
    pub max_depth: Option<usize>,
    pub tables: Option<String>,
    pub exclude: Option<String>,
    pub cycles_only: bool,
    pub render: bool,
    pub json: bool,
}

/// Run the graph command
pub fn run(
    input: PathBuf,
    output: Option<PathBuf>,
    config: Option<PathBuf>,
    delimiter: Option<char>,
    options: GraphOptions,
) -> Result<()> {
    let format = if options.json {
        OutputFormat::Json
    } else if let Some(ref f) = options.format {
        f.parse().map_err(|e| anyhow::anyhow!("{}", e))?
    } else if let Some(ref out) = output {
        out.extension()
            .and_then(|e| e.to_str())
            .and_then(OutputFormat::from_extension)
            .unwrap_or(OutputFormat::Html)
    } else {
        OutputFormat::Html
    };
    let chatty = format != OutputFormat::Json || output.is_some();

    let layout = options
        .layout
        .as_deref()
        .map(str::parse::<Layout>)
        .transpose()
        .map_err(|e| anyhow::anyhow!("{}", e))?
        .unwrap_or(Layout::LR);

    let config = resolve_config(config.as_deref(), delimiter, !chatty)?;

    if chatty {
        eprintln!("Generating lineage graph: {}", input.display());
    }

    let (model, report) = load_or_build(&input, &config)?;
    if let Some(ref report) = report {
        if chatty {
            print_diagnostics(report);
        }
    }

    if model.is_empty() {
        if chatty {
            eprintln!("No tables found in the input.");
        }
        return Ok(());
    }

    let mut view = GraphView::from_model(&model);

    view.filter_layers(&split_list(&options.layers), &split_list(&options.sub_layers));
    view.filter_tables(&parse_patterns(&options.tables)?);
    view.exclude_tables(&parse_patterns(&options.exclude)?);

    if let Some(ref table) = options.table {
        if model.node(table).is_none() {
            bail!("table not found in lineage graph: {}", table);
        }
        if view.get_table(table).is_none() {
            bail!(
                "table {} is excluded by the --layers/--sub-layers/--tables/--exclude filters",
                table
            );
        }
        view.focus_table(table, options.upstream, options.downstream, options.max_depth);
    }

    let cycles = if options.cycles_only {
        let cycles = find_cycles(&view);
        let cyclic = cyclic_tables(&view);
        view.filter_to_cyclic_tables(&cyclic);
        Some(cycles)
    } else {
        None
    };

    let title = format!("Lineage - {}", display_name(&input));

    let output_content = match format {
        OutputFormat::Dot => to_dot(&view, layout, &config),
        OutputFormat::Mermaid => to_mermaid(&view, layout, &config),
        OutputFormat::Json => to_json(&view)?,
        OutputFormat::Html => to_html(&view, &title, layout, &config),
    };

    let should_render = options.render
        || output
            .as_ref()
            .and_then(|p| p.extension())
            .and_then(|e| e.to_str())
            .map(|e| matches!(e.to_lowercase().as_str(), "png" | "svg" | "pdf"))
            .unwrap_or(false);

    if should_render {
        if format != OutputFormat::Dot {
            bail!("--render requires DOT output (use --format dot or a .png/.svg/.pdf output)");
        }
        let Some(ref out_path) = output else {
            bail!("--render requires an output file (-o graph.svg)");
        };
        render_with_graphviz(&output_content, out_path)?;
        eprintln!("Graph rendered to: {}", out_path.display());
    } else if let Some(ref out_path) = output {
        let mut file = File::create(out_path)?;
        file.write_all(output_content.as_bytes())?;
        if !output_content.ends_with('\n') {
            file.write_all(b"\n")?;
        }
        eprintln!("Graph written to: {}", out_path.display());
    } else {
        println!("{}", output_content.trim_end_matches('\n'));
    }

    if let Some(cycles) = cycles {
        print_cycles(&cycles);
    }

    if chatty {
        eprintln!(
            "\nLineage: {} tables, {} fields, {} edges",
            view.table_count(),
            view.field_count(),
            view.edge_count()
        );
    }

    Ok(())
}

fn print_cycles(cycles: &[Cycle]) {
    if cycles.is_empty() {
        eprintln!("\nNo cycles detected.");
        return;
    }
    eprintln!("\nCycles detected ({}):", cycles.len());
    for (i, cycle) in cycles.iter().enumerate() {
        eprintln!("  {}. {}", i + 1, cycle.display());
    }
}

/// Split a comma-separated option into trimmed, non-empty values
fn split_list(value: &Option<String>) -> Vec<String> {
    value
        .as_deref()
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Parse comma-separated table globs
fn parse_patterns(value: &Option<String>) -> Result<Vec<Pattern>> {
    split_list(value)
        .iter()
        .map(|p| Pattern::new(p).map_err(|e| anyhow::anyhow!("invalid table pattern '{}': {}", p, e)))
        .collect()
}

/// Render DOT to PNG/SVG/PDF using Graphviz
fn render_with_graphviz(dot_source: &str, output_path: &Path) -> Result<()> {
    let ext = output_path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("svg");

    let format_arg = format!("-T{}", ext);

    let mut child = Command::new("dot")
        .arg(&format_arg)
        .arg("-o")
        .arg(output_path)
        .stdin(std::process::Stdio::piped())
        .spawn()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                anyhow::anyhow!(
                    "Graphviz 'dot' command not found. Install Graphviz or use --format html instead."
                )
            } else {
                anyhow::anyhow!("Failed to run dot: {}", e)
            }
        })?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(dot_source.as_bytes())?;
    }

    let status = child.wait()?;
    if !status.success() {
        bail!("Graphviz dot command failed with status: {}", status);
    }

    Ok(())
}
