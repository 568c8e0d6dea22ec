//! Lineage graph model, views and export.
//!
//! This module provides:
//! - The exported graph model (nodes with field tables, aggregated edges)
//! - Filtered views over a model (layers, table globs, focus on one table)
//! - Cycle detection using Tarjan's SCC algorithm, root and leaf tables
//! - Multiple output formats: DOT (Graphviz), Mermaid, JSON, HTML

pub mod analysis;
pub mod format;
pub mod model;
pub mod view;

pub use analysis::{cyclic_tables, find_cycles, leaf_tables, root_tables, Cycle};
pub use format::{to_dot, to_html, to_json, to_mermaid, Layout, OutputFormat};
pub use model::{GraphModel, GraphStats, LineageEdge, TableNode};
pub use view::{field_rows, FieldRow, GraphView};
