use super::build::print_diagnostics;
use super::input::{input_files, resolve_config};
use crate::graph::{find_cycles, leaf_tables, root_tables, Cycle, GraphStats, GraphView};
use crate::lineage::BuildReport;
use crate::reader::build_from_paths;
use indicatif::{ProgressBar, ProgressStyle};
use schemars::JsonSchema;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;

/// JSON output of the validate command
#[derive(Debug, Serialize, JsonSchema)]
pub(crate) struct ValidationSummary {
    /// Input files in the order they were read
    pub inputs: Vec<String>,
    pub report: BuildReport,
    pub stats: GraphStats,
    /// Lineage cycles, tables in graph order
    pub cycles: Vec<Cycle>,
    /// Tables without upstream tables
    pub roots: Vec<String>,
    /// Tables nothing is derived from
    pub leaves: Vec<String>,
    /// SHA-256 of the serialized graph model
    pub fingerprint: String,
    pub passed: bool,
}

impl ValidationSummary {
    pub fn has_errors(&self) -> bool {
        self.report.has_skipped()
    }

    pub fn has_warnings(&self) -> bool {
        self.report.has_warnings() || !self.cycles.is_empty()
    }
}

pub fn run(
    input: PathBuf,
    config: Option<PathBuf>,
    delimiter: Option<char>,
    progress: bool,
    strict: bool,
    json: bool,
) -> anyhow::Result<()> {
    let config = resolve_config(config.as_deref(), delimiter, json)?;
    let files = input_files(&input)?;

    if !json {
        eprintln!("Validating mapping: {}", input.display());
        eprintln!();
    }

    let start_time = Instant::now();

    let pb = if progress && !json {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap()
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb.set_message("Validating...");
        Some(pb)
    } else {
        None
    };

    let (model, report) = build_from_paths(&files, &config)?;

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    let elapsed = start_time.elapsed();

    let view = GraphView::from_model(&model);
    let mut summary = ValidationSummary {
        inputs: files.iter().map(|f| f.display().to_string()).collect(),
        stats: model.stats(),
        cycles: find_cycles(&view),
        roots: root_tables(&view),
        leaves: leaf_tables(&view),
        fingerprint: model.fingerprint()?,
        report,
        passed: true,
    };
    summary.passed = !(summary.has_errors() || (strict && summary.has_warnings()));

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_diagnostics(&summary.report);
        if !summary.report.diagnostics.is_empty() {
            eprintln!();
        }

        eprintln!("Validation summary:");
        eprintln!("  Files read: {}", summary.inputs.len());
        eprintln!(
            "  Records: {} read, {} used, {} skipped",
            summary.report.records_read,
            summary.report.records_used,
            summary.report.records_skipped
        );
        eprintln!(
            "  Graph: {} tables, {} edges, {} fields",
            summary.stats.table_count, summary.stats.edge_count, summary.stats.field_count
        );
        for (layer, count) in &summary.stats.layers {
            eprintln!("    - {:<16} {} tables", layer, count);
        }
        eprintln!("  Roots: {}", summary.roots.len());
        eprintln!("  Leaves: {}", summary.leaves.len());
        eprintln!("  Fingerprint: {}", summary.fingerprint);
        eprintln!("  Time: {:.3?}", elapsed);
        eprintln!();

        if summary.cycles.is_empty() {
            eprintln!("  No lineage cycles.");
        } else {
            eprintln!("  Lineage cycles ({}):", summary.cycles.len());
            for (i, cycle) in summary.cycles.iter().enumerate() {
                eprintln!("    {}. {}", i + 1, cycle.display());
            }
        }
        eprintln!();

        if summary.has_errors() {
            eprintln!("Result: FAILED");
        } else if summary.has_warnings() && strict {
            eprintln!("Result: FAILED (--strict mode, warnings treated as errors)");
        } else if summary.has_warnings() {
            eprintln!("Result: PASSED (with warnings)");
        } else {
            eprintln!("Result: PASSED");
        }
    }

    if !summary.passed {
        std::process::exit(1);
    }

    Ok(())
}
