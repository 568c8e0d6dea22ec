//! Edge aggregation: one edge per (source table, target table) pair.

use ahash::AHashMap;

/// Accumulated state for one lineage edge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeEntry {
    pub source: String,
    pub target: String,
    /// Every field observed crossing the edge, duplicates included
    pub fields: Vec<String>,
}

/// Insertion-ordered edge aggregator
#[derive(Debug, Default)]
pub struct EdgeAggregator {
    edges: Vec<EdgeEntry>,
    index: AHashMap<(String, String), usize>,
}

impl EdgeAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Find or create the edge `source -> target` and append `field` to it.
    ///
    /// The edge is created even when `field` is empty; empty fields are not
    /// appended. Field history keeps duplicates in record order.
    pub fn record_edge(&mut self, source: &str, target: &str, field: &str) {
        let key = (source.to_string(), target.to_string());
        let idx = match self.index.get(&key) {
            Some(&idx) => idx,
            None => {
                let idx = self.edges.len();
                self.edges.push(EdgeEntry {
                    source: key.0.clone(),
                    target: key.1.clone(),
                    fields: Vec::new(),
                });
                self.index.insert(key, idx);
                idx
            }
        };

        if !field.is_empty() {
            self.edges[idx].fields.push(field.to_string());
        }
    }

    pub fn get(&self, source: &str, target: &str) -> Option<&EdgeEntry> {
        self.index
            .get(&(source.to_string(), target.to_string()))
            .map(|&i| &self.edges[i])
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Edges in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = &EdgeEntry> {
        self.edges.iter()
    }

    pub fn into_edges(self) -> Vec<EdgeEntry> {
        self.edges
    }
}
