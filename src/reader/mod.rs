//! CSV input for mapping records.
//!
//! Reads one or more mapping spreadsheets (optionally compressed), maps their
//! headers onto the canonical columns and feeds every row to a
//! [`LineageBuilder`] in file order.

pub mod compression;

pub use compression::Compression;

use crate::config::{normalize_header, ColumnAliases, LineageConfig};
use crate::graph::model::GraphModel;
use crate::lineage::{BuildReport, LineageBuilder, RecordLocation};
use crate::progress::ProgressReader;
use crate::record::{MappingRecord, RecordParser};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Position of each canonical column in the input header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnIndex {
    pub target_table: usize,
    pub target_field: Option<usize>,
    pub source_table: Option<usize>,
    pub source_field: Option<usize>,
    pub layer: Option<usize>,
    pub sub_layer: Option<usize>,
}

impl ColumnIndex {
    /// Match header names against the configured aliases.
    ///
    /// Aliases are tried in order; a header column is claimed by at most one
    /// canonical column. Fails when no target table column exists.
    pub fn resolve<'h, I>(headers: I, aliases: &ColumnAliases) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = &'h str>,
    {
        let normalized: Vec<String> = headers.into_iter().map(normalize_header).collect();
        let mut claimed = vec![false; normalized.len()];

        let mut find = |names: &[String]| -> Option<usize> {
            for name in names {
                let wanted = normalize_header(name);
                if let Some(idx) = normalized
                    .iter()
                    .enumerate()
                    .position(|(i, h)| !claimed[i] && *h == wanted)
                {
                    claimed[idx] = true;
                    return Some(idx);
                }
            }
            None
        };

        let target_table = match find(&aliases.target_table) {
            Some(idx) => idx,
            None => anyhow::bail!(
                "no target table column found (expected one of: {}); headers were: {}",
                aliases.target_table.join(", "),
                normalized.join(", ")
            ),
        };

        Ok(Self {
            target_table,
            target_field: find(&aliases.target_field),
            source_table: find(&aliases.source_table),
            source_field: find(&aliases.source_field),
            layer: find(&aliases.layer),
            sub_layer: find(&aliases.sub_layer),
        })
    }

    /// Extract a raw record; cells beyond the row length are absent
    pub fn record(&self, row: &csv::StringRecord) -> MappingRecord {
        let cell = |idx: Option<usize>| idx.and_then(|i| row.get(i)).map(str::to_string);
        MappingRecord {
            target_table: cell(Some(self.target_table)),
            target_field: cell(self.target_field),
            source_table: cell(self.source_table),
            source_field: cell(self.source_field),
            layer: cell(self.layer),
            sub_layer: cell(self.sub_layer),
        }
    }
}

/// Streams mapping records out of one CSV source
pub struct MappingReader<R: Read> {
    csv: csv::Reader<R>,
    columns: ColumnIndex,
    file: Option<String>,
}

impl<R: Read> MappingReader<R> {
    /// Read the header row and resolve canonical columns
    pub fn new(reader: R, config: &LineageConfig) -> anyhow::Result<Self> {
        let mut csv = csv::ReaderBuilder::new()
            .delimiter(config.delimiter_byte()?)
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = csv
            .headers()
            .map_err(|e| anyhow::anyhow!("failed to read header row: {}", e))?
            .clone();
        let columns = ColumnIndex::resolve(headers.iter(), &config.columns)?;

        Ok(Self {
            csv,
            columns,
            file: None,
        })
    }

    /// Attach a file name to diagnostics
    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file = Some(name.into());
        self
    }

    pub fn columns(&self) -> &ColumnIndex {
        &self.columns
    }

    /// Push every remaining row into `builder`. Returns the rows seen.
    ///
    /// Rows the CSV layer cannot decode are skipped with a diagnostic; I/O
    /// errors abort.
    pub fn read_into(&mut self, builder: &mut LineageBuilder) -> anyhow::Result<u64> {
        let mut rows = 0;
        let mut row = csv::StringRecord::new();

        loop {
            match self.csv.read_record(&mut row) {
                Ok(true) => {
                    rows += 1;
                    let location = RecordLocation {
                        file: self.file.clone(),
                        line: row.position().map(|p| p.line()),
                    };
                    builder.push(&self.columns.record(&row), &location);
                }
                Ok(false) => break,
                Err(e) if e.is_io_error() => {
                    return Err(anyhow::anyhow!("failed to read input: {}", e));
                }
                Err(e) => {
                    rows += 1;
                    let location = RecordLocation {
                        file: self.file.clone(),
                        line: e.position().map(|p| p.line()),
                    };
                    builder.skip_unreadable(&location, &e.to_string());
                }
            }
        }

        Ok(rows)
    }
}

/// Builder configured from a [`LineageConfig`]
pub fn builder_for(config: &LineageConfig) -> LineageBuilder {
    LineageBuilder::with_parser(RecordParser::new().with_separator(config.source_separator))
        .with_diagnostic_limit(config.max_diagnostics)
}

/// Build a lineage graph from files, processed in the given order
pub fn build_from_paths(
    paths: &[PathBuf],
    config: &LineageConfig,
) -> anyhow::Result<(GraphModel, BuildReport)> {
    build_from_paths_with_progress(paths, config, |_| {})
}

/// Same as [`build_from_paths`], reporting bytes read across all files
pub fn build_from_paths_with_progress<F>(
    paths: &[PathBuf],
    config: &LineageConfig,
    progress: F,
) -> anyhow::Result<(GraphModel, BuildReport)>
where
    F: Fn(u64) + Clone + 'static,
{
    let mut builder = builder_for(config);
    let mut offset = 0u64;

    for path in paths {
        let size = std::fs::metadata(path)
            .map_err(|e| anyhow::anyhow!("cannot read {}: {}", path.display(), e))?
            .len();
        let reader = open_input(path, offset, progress.clone())?;
        let mut mapping = MappingReader::new(reader, config)
            .map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))?
            .with_file_name(path.display().to_string());
        mapping.read_into(&mut builder)?;
        offset += size;
    }

    Ok(builder.finish())
}

/// Open an input file, decompressing by extension and reporting progress
/// as `offset + bytes read`
fn open_input<F>(path: &Path, offset: u64, progress: F) -> anyhow::Result<Box<dyn Read>>
where
    F: Fn(u64) + 'static,
{
    let file = File::open(path)
        .map_err(|e| anyhow::anyhow!("cannot open {}: {}", path.display(), e))?;
    let tracked = ProgressReader::new(file, move |n| progress(offset + n));
    Compression::from_path(path).wrap_reader(Box::new(tracked))
}
