//! Lineage graph construction.
//!
//! This module provides:
//! - A table registry with first-write-wins layers and aligned field pairs
//! - An edge aggregator keyed by (source, target) table pair
//! - The exporter projecting both into a [`GraphModel`](crate::graph::GraphModel)
//! - A single-pass builder tying parser and accumulators together

pub mod builder;
pub mod edges;
pub mod export;
pub mod registry;

pub use builder::{build_graph, BuildReport, Diagnostic, LineageBuilder, RecordLocation, Severity};
pub use edges::{EdgeAggregator, EdgeEntry};
pub use export::export;
pub use registry::{FieldOrigin, FieldPair, TableEntry, TableRegistry};
