//! Single-pass lineage builder.
//!
//! Owns the parser and both accumulators for one pass. Records are pushed in
//! input order; `finish` exports the graph together with the diagnostics
//! gathered along the way.

use crate::graph::model::GraphModel;
use crate::lineage::edges::EdgeAggregator;
use crate::lineage::export::export;
use crate::lineage::registry::TableRegistry;
use crate::record::{MappingRecord, ParsedRecord, RecordError, RecordParser};
use schemars::JsonSchema;
use serde::Serialize;
use std::fmt;

/// Severity of a build diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Record was dropped
    Error,
    /// Record was kept with a degraded interpretation
    Warning,
}

/// A problem attached to one input row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct Diagnostic {
    pub severity: Severity,
    /// 1-based line in the input file, when known
    pub line: Option<u64>,
    /// Input file, when reading from disk
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.severity {
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
        };
        write!(f, "{}", label)?;
        match (&self.file, self.line) {
            (Some(file), Some(line)) => write!(f, " [{}:{}]", file, line)?,
            (Some(file), None) => write!(f, " [{}]", file)?,
            (None, Some(line)) => write!(f, " [line {}]", line)?,
            (None, None) => {}
        }
        write!(f, " {}", self.message)
    }
}

/// Where a record came from
#[derive(Debug, Clone, Default)]
pub struct RecordLocation {
    pub file: Option<String>,
    pub line: Option<u64>,
}

impl RecordLocation {
    pub fn line(line: u64) -> Self {
        Self {
            file: None,
            line: Some(line),
        }
    }
}

/// Counters and diagnostics of one build pass
#[derive(Debug, Clone, Default, Serialize, JsonSchema)]
pub struct BuildReport {
    pub records_read: u64,
    pub records_used: u64,
    pub records_skipped: u64,
    pub warning_count: u64,
    /// Stored diagnostics, capped at the collector limit
    pub diagnostics: Vec<Diagnostic>,
    /// Diagnostics not stored because the limit was reached
    pub diagnostics_truncated: u64,
    #[serde(skip)]
    max_diagnostics: usize,
}

impl BuildReport {
    pub fn new() -> Self {
        Self::with_limit(100)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            max_diagnostics: limit,
            ..Default::default()
        }
    }

    fn push(&mut self, diagnostic: Diagnostic) {
        if self.diagnostics.len() < self.max_diagnostics {
            self.diagnostics.push(diagnostic);
        } else {
            self.diagnostics_truncated += 1;
        }
    }

    /// Record a dropped row
    pub fn skipped(&mut self, location: &RecordLocation, message: impl Into<String>) {
        self.records_skipped += 1;
        self.push(Diagnostic {
            severity: Severity::Error,
            line: location.line,
            file: location.file.clone(),
            message: message.into(),
        });
    }

    /// Record a kept row with a problem
    pub fn warn(&mut self, location: &RecordLocation, message: impl Into<String>) {
        self.warning_count += 1;
        self.push(Diagnostic {
            severity: Severity::Warning,
            line: location.line,
            file: location.file.clone(),
            message: message.into(),
        });
    }

    pub fn has_skipped(&self) -> bool {
        self.records_skipped > 0
    }

    pub fn has_warnings(&self) -> bool {
        self.warning_count > 0
    }
}

/// Builds a lineage graph from mapping records in one pass
#[derive(Debug)]
pub struct LineageBuilder {
    parser: RecordParser,
    registry: TableRegistry,
    edges: EdgeAggregator,
    report: BuildReport,
}

impl Default for LineageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LineageBuilder {
    pub fn new() -> Self {
        Self::with_parser(RecordParser::new())
    }

    pub fn with_parser(parser: RecordParser) -> Self {
        Self {
            parser,
            registry: TableRegistry::new(),
            edges: EdgeAggregator::new(),
            report: BuildReport::new(),
        }
    }

    /// Cap the number of stored diagnostics
    pub fn with_diagnostic_limit(mut self, limit: usize) -> Self {
        self.report.max_diagnostics = limit;
        self
    }

    /// Parse and apply one raw record
    pub fn push(&mut self, raw: &MappingRecord, location: &RecordLocation) {
        self.report.records_read += 1;

        let record = match self.parser.parse(raw) {
            Ok(record) => record,
            Err(e) => {
                self.report.skipped(location, format!("{}, record skipped", e));
                return;
            }
        };

        if let Some(raw_sources) = &record.malformed_sources {
            let err = RecordError::MalformedMultiValue {
                raw: raw_sources.clone(),
            };
            self.report.warn(location, err.to_string());
        }

        self.apply(&record);
        self.report.records_used += 1;
    }

    /// Record a row the reader could not decode
    pub fn skip_unreadable(&mut self, location: &RecordLocation, reason: &str) {
        self.report.records_read += 1;
        self.report
            .skipped(location, format!("unreadable row: {}, record skipped", reason));
    }

    fn apply(&mut self, record: &ParsedRecord) {
        let target_field = record.target_field.as_deref().unwrap_or("");
        let source_field = record.source_field.as_deref().unwrap_or("");

        self.registry.ensure_target(
            &record.target_table,
            record.layer.as_deref(),
            record.sub_layer.as_deref(),
        );
        self.registry
            .append_field_pair(&record.target_table, target_field, source_field);

        for source in &record.source_tables {
            self.registry.ensure(source, None, None);
            self.registry.append_source_field(source, source_field);
            self.edges
                .record_edge(source, &record.target_table, source_field);
        }
    }

    pub fn registry(&self) -> &TableRegistry {
        &self.registry
    }

    pub fn edges(&self) -> &EdgeAggregator {
        &self.edges
    }

    pub fn report(&self) -> &BuildReport {
        &self.report
    }

    /// Export the graph; consumes the accumulators
    pub fn finish(self) -> (GraphModel, BuildReport) {
        (export(self.registry, self.edges), self.report)
    }
}

/// Build a graph from in-memory records, numbering them from line 2
/// (line 1 being the header of a spreadsheet export).
pub fn build_graph<'a, I>(records: I) -> (GraphModel, BuildReport)
where
    I: IntoIterator<Item = &'a MappingRecord>,
{
    let mut builder = LineageBuilder::new();
    for (i, record) in records.into_iter().enumerate() {
        builder.push(record, &RecordLocation::line(i as u64 + 2));
    }
    builder.finish()
}
