//! Mapping record parsing.
//!
//! A mapping record is one row of the lineage spreadsheet: a target table and
//! field, the source table(s) and field it is derived from, and the layer the
//! target table lives in. Parsing normalizes whitespace and splits the
//! multi-valued source table cell.

use std::fmt;

/// Default separator between source tables in a single cell
pub const DEFAULT_SOURCE_SEPARATOR: char = ',';

/// One raw input row, with cells already mapped to canonical columns.
///
/// Cells that were missing from the row (or whose column is missing from the
/// file) are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingRecord {
    pub target_table: Option<String>,
    pub target_field: Option<String>,
    pub source_table: Option<String>,
    pub source_field: Option<String>,
    pub layer: Option<String>,
    pub sub_layer: Option<String>,
}

impl MappingRecord {
    /// Convenience constructor used by tests and benches
    pub fn new(target_table: &str) -> Self {
        Self {
            target_table: Some(target_table.to_string()),
            ..Default::default()
        }
    }

    pub fn target_field(mut self, field: &str) -> Self {
        self.target_field = Some(field.to_string());
        self
    }

    pub fn source(mut self, table: &str, field: &str) -> Self {
        self.source_table = Some(table.to_string());
        self.source_field = Some(field.to_string());
        self
    }

    pub fn layer(mut self, layer: &str) -> Self {
        self.layer = Some(layer.to_string());
        self
    }

    pub fn sub_layer(mut self, sub_layer: &str) -> Self {
        self.sub_layer = Some(sub_layer.to_string());
        self
    }
}

/// A normalized mapping record.
///
/// Optional string fields are `None` when absent or blank after trimming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRecord {
    pub target_table: String,
    pub target_field: Option<String>,
    pub source_field: Option<String>,
    pub layer: Option<String>,
    pub sub_layer: Option<String>,
    /// Source tables in cell order. Empty means the target is a root.
    pub source_tables: Vec<String>,
    /// Raw source cell that was present but held no usable identifier
    pub malformed_sources: Option<String>,
}

/// Problems found while parsing a single record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// The required target table is missing or blank
    InvalidRecord { reason: String },
    /// The source table cell split into zero identifiers
    MalformedMultiValue { raw: String },
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordError::InvalidRecord { reason } => {
                write!(f, "invalid record: {}", reason)
            }
            RecordError::MalformedMultiValue { raw } => {
                write!(
                    f,
                    "source_table {:?} contains no table names, treated as no source",
                    raw
                )
            }
        }
    }
}

impl std::error::Error for RecordError {}

/// Parses raw records into normalized ones
#[derive(Debug, Clone, Copy)]
pub struct RecordParser {
    separator: char,
}

impl Default for RecordParser {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SOURCE_SEPARATOR,
        }
    }
}

impl RecordParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different separator for multi-valued source table cells
    pub fn with_separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    pub fn separator(&self) -> char {
        self.separator
    }

    /// Normalize one record.
    ///
    /// Fails only when the target table is missing. A source cell without any
    /// usable table name is not an error here; it is reported through
    /// [`ParsedRecord::malformed_sources`] and the record keeps no sources.
    pub fn parse(&self, raw: &MappingRecord) -> Result<ParsedRecord, RecordError> {
        let target_table = match normalize(raw.target_table.as_deref()) {
            Some(t) => t,
            None => {
                let reason = if raw.target_table.is_some() {
                    "target_table is blank"
                } else {
                    "target_table is missing"
                };
                return Err(RecordError::InvalidRecord {
                    reason: reason.to_string(),
                });
            }
        };

        let (source_tables, malformed_sources) =
            match self.split_source_tables(raw.source_table.as_deref()) {
                Ok(tables) => (tables, None),
                Err(RecordError::MalformedMultiValue { raw }) => (Vec::new(), Some(raw)),
                Err(e) => return Err(e),
            };

        Ok(ParsedRecord {
            target_table,
            target_field: normalize(raw.target_field.as_deref()),
            source_field: normalize(raw.source_field.as_deref()),
            layer: normalize(raw.layer.as_deref()),
            sub_layer: normalize(raw.sub_layer.as_deref()),
            source_tables,
            malformed_sources,
        })
    }

    /// Split a source table cell into trimmed, non-empty table names.
    ///
    /// An absent cell yields an empty list. A present cell that yields no
    /// names at all (`" , "`) is a `MalformedMultiValue`.
    pub fn split_source_tables(&self, raw: Option<&str>) -> Result<Vec<String>, RecordError> {
        let raw = match raw {
            Some(r) if !r.trim().is_empty() => r,
            _ => return Ok(Vec::new()),
        };

        let tables: Vec<String> = raw
            .split(self.separator)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        if tables.is_empty() {
            return Err(RecordError::MalformedMultiValue {
                raw: raw.to_string(),
            });
        }

        Ok(tables)
    }
}

/// Trim a cell; blank cells count as absent
fn normalize(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims_fields() {
        let raw = MappingRecord {
            target_table: Some("  orders ".to_string()),
            target_field: Some(" id".to_string()),
            source_table: Some(" raw_orders ".to_string()),
            source_field: Some("order_id  ".to_string()),
            layer: Some(" silver ".to_string()),
            sub_layer: Some("   ".to_string()),
        };

        let parsed = RecordParser::new().parse(&raw).unwrap();
        assert_eq!(parsed.target_table, "orders");
        assert_eq!(parsed.target_field.as_deref(), Some("id"));
        assert_eq!(parsed.source_field.as_deref(), Some("order_id"));
        assert_eq!(parsed.layer.as_deref(), Some("silver"));
        assert_eq!(parsed.sub_layer, None);
        assert_eq!(parsed.source_tables, vec!["raw_orders"]);
    }

    #[test]
    fn test_parse_missing_target_is_invalid() {
        let raw = MappingRecord {
            source_table: Some("S1".to_string()),
            ..Default::default()
        };
        let err = RecordParser::new().parse(&raw).unwrap_err();
        assert!(matches!(err, RecordError::InvalidRecord { .. }));
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_parse_blank_target_is_invalid() {
        let raw = MappingRecord::new("   ");
        let err = RecordParser::new().parse(&raw).unwrap_err();
        assert!(err.to_string().contains("blank"));
    }

    #[test]
    fn test_split_multiple_sources() {
        let parser = RecordParser::new();
        let tables = parser.split_source_tables(Some("S1, S2 ,,S3")).unwrap();
        assert_eq!(tables, vec!["S1", "S2", "S3"]);
    }

    #[test]
    fn test_split_absent_source_is_root() {
        let parser = RecordParser::new();
        assert!(parser.split_source_tables(None).unwrap().is_empty());
        assert!(parser.split_source_tables(Some("  ")).unwrap().is_empty());
    }

    #[test]
    fn test_split_only_separators_is_malformed() {
        let parser = RecordParser::new();
        let err = parser.split_source_tables(Some(" , ,")).unwrap_err();
        assert_eq!(
            err,
            RecordError::MalformedMultiValue {
                raw: " , ,".to_string()
            }
        );
    }

    #[test]
    fn test_parse_malformed_sources_is_not_fatal() {
        let raw = MappingRecord::new("T1").source(",", "x");
        let parsed = RecordParser::new().parse(&raw).unwrap();
        assert!(parsed.source_tables.is_empty());
        assert_eq!(parsed.malformed_sources.as_deref(), Some(","));
    }

    #[test]
    fn test_custom_separator() {
        let parser = RecordParser::new().with_separator('|');
        assert_eq!(parser.separator(), '|');
        let tables = parser.split_source_tables(Some("a|b, c")).unwrap();
        assert_eq!(tables, vec!["a", "b, c"]);
    }
}
