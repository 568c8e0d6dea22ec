use super::input::{input_files, resolve_config};
use crate::lineage::BuildReport;
use crate::reader::{build_from_paths, build_from_paths_with_progress, Compression};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

pub fn run(
    input: PathBuf,
    output: Option<PathBuf>,
    config: Option<PathBuf>,
    delimiter: Option<char>,
    progress: bool,
    strict: bool,
    quiet: bool,
) -> anyhow::Result<()> {
    let config = resolve_config(config.as_deref(), delimiter, quiet)?;
    let files = input_files(&input)?;

    if !quiet {
        if files.len() == 1 {
            eprintln!("Building lineage graph: {}", files[0].display());
        } else {
            eprintln!("Building lineage graph from {} files", files.len());
        }
        for file in &files {
            let compression = Compression::from_path(file);
            if compression != Compression::None {
                eprintln!("Detected compression: {} ({})", compression, file.display());
            }
        }
    }

    let start_time = Instant::now();

    let (model, report) = if progress && !quiet {
        let total_size: u64 = files
            .iter()
            .filter_map(|f| fs::metadata(f).ok())
            .map(|m| m.len())
            .sum();

        let pb = ProgressBar::new(total_size);
        pb.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({percent}%) {msg}",
            )
            .unwrap()
            .progress_chars("█▓▒░  ")
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
        pb.enable_steady_tick(std::time::Duration::from_millis(100));

        let pb_clone = pb.clone();
        let result = build_from_paths_with_progress(&files, &config, move |bytes| {
            pb_clone.set_position(bytes);
        });
        pb.finish_and_clear();
        result?
    } else {
        build_from_paths(&files, &config)?
    };

    let elapsed = start_time.elapsed();

    if !quiet {
        print_diagnostics(&report);
    }

    if strict && report.has_skipped() {
        anyhow::bail!(
            "{} record(s) skipped (--strict), graph not written",
            report.records_skipped
        );
    }

    let json = model.to_json_pretty()?;
    match output {
        Some(ref path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, format!("{}\n", json))?;
        }
        None => println!("{}", json),
    }

    if !quiet {
        let stats = model.stats();
        eprintln!(
            "✓ Built {} tables, {} edges, {} fields from {} records ({} skipped) in {:.3?}",
            stats.table_count,
            stats.edge_count,
            stats.field_count,
            report.records_read,
            report.records_skipped,
            elapsed
        );
        if let Some(ref path) = output {
            eprintln!("Graph written to: {}", path.display());
        }
    }

    Ok(())
}

/// Print stored diagnostics and a note for any that were dropped
pub(crate) fn print_diagnostics(report: &BuildReport) {
    for diagnostic in &report.diagnostics {
        eprintln!("{}", diagnostic);
    }
    if report.diagnostics_truncated > 0 {
        eprintln!(
            "... {} more diagnostic(s) not shown",
            report.diagnostics_truncated
        );
    }
}
