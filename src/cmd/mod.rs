mod build;
mod glob_util;
mod graph;
mod input;
pub(crate) mod schema;
pub(crate) mod show;
pub(crate) mod validate;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lineage-graph")]
#[command(version)]
#[command(about = "Build table-level data lineage graphs from field mapping spreadsheets", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the lineage graph model (JSON) from mapping records
    Build {
        /// Input CSV file or glob pattern (e.g., mappings/*.csv)
        /// Supports .gz, .bz2, .xz, .zst compression
        input: PathBuf,

        /// Output JSON file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// YAML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// CSV field delimiter (overrides config)
        #[arg(long)]
        delimiter: Option<char>,

        /// Show progress during processing
        #[arg(short, long)]
        progress: bool,

        /// Fail when any record was skipped
        #[arg(long)]
        strict: bool,

        /// Suppress summary and diagnostics
        #[arg(short, long)]
        quiet: bool,
    },

    /// Check mapping records and report diagnostics, counts and cycles
    Validate {
        /// Input CSV file or glob pattern
        /// Supports .gz, .bz2, .xz, .zst compression
        input: PathBuf,

        /// YAML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// CSV field delimiter (overrides config)
        #[arg(long)]
        delimiter: Option<char>,

        /// Show progress during validation
        #[arg(short, long)]
        progress: bool,

        /// Treat warnings and lineage cycles as errors
        #[arg(long)]
        strict: bool,

        /// Output results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export a lineage diagram (HTML, DOT, Mermaid or JSON)
    Graph {
        /// Mapping CSV file, glob pattern, or a graph model written by `build` (.json)
        input: PathBuf,

        /// Output file (format detected from extension: .html, .dot, .mmd, .json, .png, .svg, .pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format: html, dot, mermaid, json (default: html, or from output extension)
        #[arg(long)]
        format: Option<String>,

        /// Layout direction: lr (left-right) or tb (top-bottom)
        #[arg(long)]
        layout: Option<String>,

        /// Only show these layers (comma-separated); tables without a layer are kept
        #[arg(long)]
        layers: Option<String>,

        /// Only show these sub-layers (comma-separated)
        #[arg(long)]
        sub_layers: Option<String>,

        /// Focus on a specific table
        #[arg(long)]
        table: Option<String>,

        /// With --table: follow sources transitively
        #[arg(long, requires = "table")]
        upstream: bool,

        /// With --table: follow targets transitively
        #[arg(long, requires = "table")]
        downstream: bool,

        /// With --upstream/--downstream: maximum depth
        #[arg(long, requires = "table")]
        max_depth: Option<usize>,

        /// Only include these tables (comma-separated, supports globs)
        #[arg(short, long)]
        tables: Option<String>,

        /// Exclude these tables (comma-separated, supports globs)
        #[arg(short, long)]
        exclude: Option<String>,

        /// Only show tables that are part of lineage cycles
        #[arg(long)]
        cycles_only: bool,

        /// Render DOT to PNG/SVG/PDF using Graphviz (auto-detected from extension)
        #[arg(long)]
        render: bool,

        /// YAML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// CSV field delimiter (overrides config)
        #[arg(long)]
        delimiter: Option<char>,

        /// Output as JSON (same as --format json)
        #[arg(long)]
        json: bool,
    },

    /// Print the field-mapping table of one table
    Show {
        /// Mapping CSV file, glob pattern, or a graph model written by `build` (.json)
        input: PathBuf,

        /// Table to show
        table: String,

        /// YAML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// CSV field delimiter (overrides config)
        #[arg(long)]
        delimiter: Option<char>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print JSON Schemas for the JSON outputs
    Schema {
        /// Only this schema (graph, show, validate)
        #[arg(long)]
        command: Option<String>,

        /// Write <name>.schema.json files to this directory
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Build {
            input,
            output,
            config,
            delimiter,
            progress,
            strict,
            quiet,
        } => build::run(input, output, config, delimiter, progress, strict, quiet),
        Commands::Validate {
            input,
            config,
            delimiter,
            progress,
            strict,
            json,
        } => validate::run(input, config, delimiter, progress, strict, json),
        Commands::Graph {
            input,
            output,
            format,
            layout,
            layers,
            sub_layers,
            table,
            upstream,
            downstream,
            max_depth,
            tables,
            exclude,
            cycles_only,
            render,
            config,
            delimiter,
            json,
        } => graph::run(
            input,
            output,
            config,
            delimiter,
            graph::GraphOptions {
                format,
                layout,
                layers,
                sub_layers,
                table,
                upstream,
                downstream,
                max_depth,
                tables,
                exclude,
                cycles_only,
                render,
                json,
            },
        ),
        Commands::Show {
            input,
            table,
            config,
            delimiter,
            json,
        } => show::run(input, table, config, delimiter, json),
        Commands::Schema {
            command,
            output_dir,
        } => schema::run(command, output_dir),
        Commands::Completions { shell } => {
            generate(
                shell,
                &mut Cli::command(),
                "lineage-graph",
                &mut io::stdout(),
            );
            Ok(())
        }
    }
}
