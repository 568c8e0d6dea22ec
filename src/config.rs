//! YAML configuration.
//!
//! Controls how input headers map to canonical columns, CSV separators and
//! the colours used per layer in rendered output.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// File looked up in the working directory when no `--config` is given
pub const LOCAL_CONFIG_FILE: &str = "lineage-graph.yaml";

static NON_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

/// Normalize a header name: lower-case, runs of other characters become `_`
pub fn normalize_header(name: &str) -> String {
    let lower = name.trim().trim_start_matches('\u{feff}').to_lowercase();
    NON_ALNUM
        .replace_all(&lower, "_")
        .trim_matches('_')
        .to_string()
}

fn aliases(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

/// Accepted header names for each canonical column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnAliases {
    pub target_table: Vec<String>,
    pub target_field: Vec<String>,
    pub source_table: Vec<String>,
    pub source_field: Vec<String>,
    pub layer: Vec<String>,
    pub sub_layer: Vec<String>,
}

impl Default for ColumnAliases {
    fn default() -> Self {
        Self {
            target_table: aliases(&["target_table", "table_target", "target", "table"]),
            target_field: aliases(&["target_field", "target_column", "field_target", "column"]),
            source_table: aliases(&["source_table", "source_tables", "table_source", "source"]),
            source_field: aliases(&["source_field", "source_column", "field_source"]),
            layer: aliases(&["layer"]),
            sub_layer: aliases(&["sub_layer", "sublayer", "layer_sub"]),
        }
    }
}

/// Complete YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LineageConfig {
    /// Header aliases per canonical column
    pub columns: ColumnAliases,
    /// CSV field delimiter
    pub delimiter: char,
    /// Separator between table names inside a source_table cell
    pub source_separator: char,
    /// Fill colour per layer name (case-insensitive)
    pub layer_colors: BTreeMap<String, String>,
    /// Colour for tables without a known layer
    pub default_color: String,
    /// Maximum number of diagnostics kept in a build report
    pub max_diagnostics: usize,
}

impl Default for LineageConfig {
    fn default() -> Self {
        let mut layer_colors = BTreeMap::new();
        layer_colors.insert("bronze".to_string(), "brown".to_string());
        layer_colors.insert("silver".to_string(), "gray".to_string());
        layer_colors.insert("gold".to_string(), "gold".to_string());

        Self {
            columns: ColumnAliases::default(),
            delimiter: ',',
            source_separator: ',',
            layer_colors,
            default_color: "lightblue".to_string(),
            max_diagnostics: 100,
        }
    }
}

impl LineageConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: LineageConfig = serde_yaml_ng::from_str(&content)
            .map_err(|e| anyhow::anyhow!("invalid config {}: {}", path.display(), e))?;
        Ok(config)
    }

    /// Resolve the configuration to use.
    ///
    /// An explicit path must exist. Otherwise `./lineage-graph.yaml` and then
    /// `<config dir>/lineage-graph/config.yaml` are tried before falling back
    /// to defaults. Returns the path that was loaded, if any.
    pub fn discover(explicit: Option<&Path>) -> anyhow::Result<(Self, Option<PathBuf>)> {
        if let Some(path) = explicit {
            if !path.exists() {
                anyhow::bail!("config file does not exist: {}", path.display());
            }
            return Ok((Self::load(path)?, Some(path.to_path_buf())));
        }

        let candidates = [
            Some(PathBuf::from(LOCAL_CONFIG_FILE)),
            dirs::config_dir().map(|d| d.join("lineage-graph").join("config.yaml")),
        ];
        for candidate in candidates.into_iter().flatten() {
            if candidate.is_file() {
                return Ok((Self::load(&candidate)?, Some(candidate)));
            }
        }

        Ok((Self::default(), None))
    }

    /// CSV delimiter as a byte; the csv reader only supports ASCII delimiters
    pub fn delimiter_byte(&self) -> anyhow::Result<u8> {
        if !self.delimiter.is_ascii() {
            anyhow::bail!(
                "delimiter must be a single ASCII character, got {:?}",
                self.delimiter
            );
        }
        Ok(self.delimiter as u8)
    }

    /// Fill colour for a layer
    pub fn color_for(&self, layer: Option<&str>) -> &str {
        layer
            .and_then(|l| {
                let lower = l.to_lowercase();
                self.layer_colors
                    .iter()
                    .find(|(k, _)| k.to_lowercase() == lower)
                    .map(|(_, v)| v.as_str())
            })
            .unwrap_or(self.default_color.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("Target Table"), "target_table");
        assert_eq!(normalize_header(" sub-layer "), "sub_layer");
        assert_eq!(normalize_header("\u{feff}target_table"), "target_table");
        assert_eq!(normalize_header("__Layer__"), "layer");
    }

    #[test]
    fn test_parse_yaml_config() {
        let yaml = r##"
delimiter: ";"
columns:
  target_table:
    - table_cible
  source_field:
    - champ_source
layer_colors:
  platinum: "#e5e4e2"
"##;

        let config: LineageConfig = serde_yaml_ng::from_str(yaml).unwrap();

        assert_eq!(config.delimiter, ';');
        assert_eq!(config.delimiter_byte().unwrap(), b';');
        assert_eq!(config.source_separator, ',');
        assert_eq!(config.columns.target_table, vec!["table_cible"]);
        // Unlisted columns keep their defaults
        assert_eq!(config.columns.layer, vec!["layer"]);
        assert_eq!(config.color_for(Some("Platinum")), "#e5e4e2");
        assert_eq!(config.color_for(Some("gold")), "lightblue");
    }

    #[test]
    fn test_default_colors() {
        let config = LineageConfig::default();
        assert_eq!(config.color_for(Some("bronze")), "brown");
        assert_eq!(config.color_for(Some("SILVER")), "gray");
        assert_eq!(config.color_for(Some("gold")), "gold");
        assert_eq!(config.color_for(Some("staging")), "lightblue");
        assert_eq!(config.color_for(None), "lightblue");
    }

    #[test]
    fn test_non_ascii_delimiter_rejected() {
        let config = LineageConfig {
            delimiter: '§',
            ..Default::default()
        };
        assert!(config.delimiter_byte().is_err());
    }

    #[test]
    fn test_discover_explicit_missing() {
        let result = LineageConfig::discover(Some(Path::new("/nonexistent/lineage.yaml")));
        assert!(result.is_err());
    }
}
