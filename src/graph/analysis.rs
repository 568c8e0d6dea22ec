//! Graph analysis: lineage cycles, root and leaf tables.

use crate::graph::view::GraphView;
use ahash::{AHashMap, AHashSet};
use schemars::JsonSchema;
use serde::Serialize;

/// A cycle in the lineage (tables feeding each other)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct Cycle {
    pub tables: Vec<String>,
}

impl Cycle {
    /// A table feeding itself
    pub fn is_self_reference(&self) -> bool {
        self.tables.len() == 1
    }

    /// Format the cycle for display
    pub fn display(&self) -> String {
        if self.is_self_reference() {
            format!("{} -> {} (self-reference)", self.tables[0], self.tables[0])
        } else {
            let mut parts = self.tables.clone();
            parts.push(self.tables[0].clone());
            parts.join(" -> ")
        }
    }
}

/// Find all cycles using Tarjan's SCC algorithm.
///
/// Node visiting follows view order, so the result is deterministic. Tables
/// inside a cycle are listed in view order.
pub fn find_cycles(view: &GraphView) -> Vec<Cycle> {
    let mut finder = TarjanScc::new(view);
    finder.find_sccs();

    let position: AHashMap<&str, usize> = view
        .nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (n.id.as_str(), i))
        .collect();

    let mut cycles = Vec::new();
    for mut scc in finder.sccs {
        let is_cycle = if scc.len() == 1 {
            let table = &scc[0];
            view.edges
                .iter()
                .any(|e| &e.source == table && &e.target == table)
        } else {
            true
        };

        if is_cycle {
            scc.sort_by_key(|t| position.get(t.as_str()).copied().unwrap_or(usize::MAX));
            cycles.push(Cycle { tables: scc });
        }
    }

    cycles.sort_by_key(|c| position.get(c.tables[0].as_str()).copied().unwrap_or(usize::MAX));
    cycles
}

/// Get all tables that are part of any cycle
pub fn cyclic_tables(view: &GraphView) -> AHashSet<String> {
    find_cycles(view)
        .into_iter()
        .flat_map(|c| c.tables)
        .collect()
}

/// Tables no edge points to, in view order
pub fn root_tables(view: &GraphView) -> Vec<String> {
    let targets: AHashSet<&str> = view.edges.iter().map(|e| e.target.as_str()).collect();
    view.nodes
        .iter()
        .filter(|n| !targets.contains(n.id.as_str()))
        .map(|n| n.id.clone())
        .collect()
}

/// Tables no edge leaves from, in view order
pub fn leaf_tables(view: &GraphView) -> Vec<String> {
    let sources: AHashSet<&str> = view.edges.iter().map(|e| e.source.as_str()).collect();
    view.nodes
        .iter()
        .filter(|n| !sources.contains(n.id.as_str()))
        .map(|n| n.id.clone())
        .collect()
}

struct TarjanScc {
    order: Vec<String>,
    index_counter: usize,
    stack: Vec<String>,
    on_stack: AHashSet<String>,
    indices: AHashMap<String, usize>,
    lowlinks: AHashMap<String, usize>,
    sccs: Vec<Vec<String>>,
    adjacency: AHashMap<String, Vec<String>>,
}

impl TarjanScc {
    fn new(view: &GraphView) -> Self {
        let mut adjacency: AHashMap<String, Vec<String>> = AHashMap::new();
        for node in &view.nodes {
            adjacency.insert(node.id.clone(), Vec::new());
        }
        for edge in &view.edges {
            if adjacency.contains_key(&edge.source) && adjacency.contains_key(&edge.target) {
                adjacency
                    .entry(edge.source.clone())
                    .or_default()
                    .push(edge.target.clone());
            }
        }

        Self {
            order: view.nodes.iter().map(|n| n.id.clone()).collect(),
            index_counter: 0,
            stack: Vec::new(),
            on_stack: AHashSet::new(),
            indices: AHashMap::new(),
            lowlinks: AHashMap::new(),
            sccs: Vec::new(),
            adjacency,
        }
    }

    fn find_sccs(&mut self) {
        let nodes = self.order.clone();
        for node in nodes {
            if !self.indices.contains_key(&node) {
                self.strongconnect(&node);
            }
        }
    }

    fn strongconnect(&mut self, v: &str) {
        self.indices.insert(v.to_string(), self.index_counter);
        self.lowlinks.insert(v.to_string(), self.index_counter);
        self.index_counter += 1;
        self.stack.push(v.to_string());
        self.on_stack.insert(v.to_string());

        if let Some(neighbors) = self.adjacency.get(v).cloned() {
            for w in neighbors {
                if !self.indices.contains_key(&w) {
                    self.strongconnect(&w);
                    let low = self.lowlinks[v].min(self.lowlinks[&w]);
                    self.lowlinks.insert(v.to_string(), low);
                } else if self.on_stack.contains(&w) {
                    let low = self.lowlinks[v].min(self.indices[&w]);
                    self.lowlinks.insert(v.to_string(), low);
                }
            }
        }

        if self.lowlinks[v] == self.indices[v] {
            let mut scc = Vec::new();
            while let Some(w) = self.stack.pop() {
                self.on_stack.remove(&w);
                let done = w == v;
                scc.push(w);
                if done {
                    break;
                }
            }
            self.sccs.push(scc);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::model::{LineageEdge, TableNode};

    fn view(ids: &[&str], edges: &[(&str, &str)]) -> GraphView {
        GraphView {
            nodes: ids
                .iter()
                .map(|id| TableNode {
                    id: id.to_string(),
                    layer: None,
                    sub_layer: None,
                    columns: vec![],
                    columns_source: vec![],
                })
                .collect(),
            edges: edges
                .iter()
                .map(|(s, t)| LineageEdge {
                    source: s.to_string(),
                    target: t.to_string(),
                    columns: vec![],
                })
                .collect(),
        }
    }

    #[test]
    fn test_no_cycles() {
        let v = view(&["a", "b", "c"], &[("a", "b"), ("b", "c")]);
        assert!(find_cycles(&v).is_empty());
    }

    #[test]
    fn test_self_reference_cycle() {
        let v = view(&["snapshot"], &[("snapshot", "snapshot")]);
        let cycles = find_cycles(&v);
        assert_eq!(cycles.len(), 1);
        assert!(cycles[0].is_self_reference());
        assert_eq!(cycles[0].display(), "snapshot -> snapshot (self-reference)");
    }

    #[test]
    fn test_multi_table_cycle_in_view_order() {
        let v = view(&["a", "b", "c", "d"], &[("c", "a"), ("a", "b"), ("b", "c"), ("c", "d")]);
        let cycles = find_cycles(&v);
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].tables, vec!["a", "b", "c"]);
        assert_eq!(cycles[0].display(), "a -> b -> c -> a");

        let cyclic = cyclic_tables(&v);
        assert!(cyclic.contains("a") && cyclic.contains("c"));
        assert!(!cyclic.contains("d"));
    }

    #[test]
    fn test_roots_and_leaves() {
        let v = view(&["raw", "lookup", "stg", "report"], &[
            ("raw", "stg"),
            ("lookup", "stg"),
            ("stg", "report"),
        ]);
        assert_eq!(root_tables(&v), vec!["raw", "lookup"]);
        assert_eq!(leaf_tables(&v), vec!["report"]);
    }
}
