//! Shared input handling for commands: configuration, input expansion and
//! obtaining a graph model from mapping files or a saved model.

use super::glob_util::expand_file_pattern;
use crate::config::LineageConfig;
use crate::graph::GraphModel;
use crate::lineage::BuildReport;
use crate::reader::{build_from_paths, Compression};
use std::path::{Path, PathBuf};

/// Resolve the configuration, applying a `--delimiter` override
pub fn resolve_config(
    config: Option<&Path>,
    delimiter: Option<char>,
    quiet: bool,
) -> anyhow::Result<LineageConfig> {
    let (mut config, loaded_from) = LineageConfig::discover(config)?;

    if let Some(path) = loaded_from {
        if !quiet {
            eprintln!("Using config: {}", path.display());
        }
    }

    if let Some(d) = delimiter {
        config.delimiter = d;
    }
    config.delimiter_byte()?;

    Ok(config)
}

/// Expand an input path or glob into the files to read, in sorted order
pub fn input_files(input: &Path) -> anyhow::Result<Vec<PathBuf>> {
    Ok(expand_file_pattern(input)?.files)
}

/// Whether an input is a saved graph model rather than mapping records
pub fn is_model_file(input: &Path) -> bool {
    input
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

/// Load a saved model, or build one from mapping files.
///
/// The build report is `None` when a saved model was loaded.
pub fn load_or_build(
    input: &Path,
    config: &LineageConfig,
) -> anyhow::Result<(GraphModel, Option<BuildReport>)> {
    if is_model_file(input) {
        if !input.exists() {
            anyhow::bail!("input file does not exist: {}", input.display());
        }
        return Ok((GraphModel::load(input)?, None));
    }

    let files = input_files(input)?;
    let (model, report) = build_from_paths(&files, config)?;
    Ok((model, Some(report)))
}

/// Short human name for an input, used in titles: `finance.csv.gz` -> `finance.csv`
pub fn display_name(input: &Path) -> String {
    Compression::from_path(input)
        .inner_path(input)
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| input.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_is_model_file() {
        assert!(is_model_file(Path::new("lineage.json")));
        assert!(is_model_file(Path::new("out/Lineage.JSON")));
        assert!(!is_model_file(Path::new("mapping.csv")));
        assert!(!is_model_file(Path::new("mapping.csv.gz")));
    }

    #[test]
    fn test_display_name_strips_compression() {
        assert_eq!(display_name(Path::new("in/finance.csv.gz")), "finance.csv");
        assert_eq!(display_name(Path::new("mapping.csv")), "mapping.csv");
    }

    #[test]
    fn test_load_or_build_from_csv() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mapping.csv");
        fs::write(
            &path,
            "target_table,target_field,source_table,source_field\nT1,a,S1,x\n",
        )
        .unwrap();

        let (model, report) = load_or_build(&path, &LineageConfig::default()).unwrap();
        assert_eq!(model.nodes.len(), 2);
        assert_eq!(report.unwrap().records_used, 1);
    }

    #[test]
    fn test_load_or_build_from_model() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lineage.json");
        fs::write(
            &path,
            r#"{"nodes": [{"id": "T1", "layer": null, "sub_layer": null, "columns": [], "columns_source": []}], "edges": []}"#,
        )
        .unwrap();

        let (model, report) = load_or_build(&path, &LineageConfig::default()).unwrap();
        assert_eq!(model.nodes[0].id, "T1");
        assert!(report.is_none());
    }

    #[test]
    fn test_resolve_config_delimiter_override() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "delimiter: ','\n").unwrap();

        let config = resolve_config(Some(path.as_path()), Some(';'), true).unwrap();
        assert_eq!(config.delimiter, ';');
        assert!(resolve_config(Some(path.as_path()), Some('é'), true).is_err());
    }
}
