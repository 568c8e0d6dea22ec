//! Table registry: one entry per table seen during a build pass.

use ahash::{AHashMap, AHashSet};

/// Where a field pair came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldOrigin {
    /// The table is the target of a mapping record
    Mapping,
    /// A downstream mapping read this field from the table
    Source,
}

/// One aligned (target field, source field) pair of a table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPair {
    /// Field name on this table
    pub field: String,
    /// Upstream field it is derived from, empty when unknown
    pub source_field: String,
    pub origin: FieldOrigin,
}

/// Accumulated state for one table
#[derive(Debug, Clone)]
pub struct TableEntry {
    pub id: String,
    pub layer: Option<String>,
    pub sub_layer: Option<String>,
    pub fields: Vec<FieldPair>,
    /// Whether any record named this table as its target
    pub is_target: bool,
    /// Field names already listed on this table
    known_fields: AHashSet<String>,
}

impl TableEntry {
    fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            layer: None,
            sub_layer: None,
            fields: Vec::new(),
            is_target: false,
            known_fields: AHashSet::new(),
        }
    }

    /// Whether the table only ever appeared as a source
    pub fn is_source_only(&self) -> bool {
        !self.is_target
    }
}

/// Insertion-ordered table registry.
///
/// Entries are kept in a `Vec` in first-seen order with a hash index on the
/// table id, so export needs no sorting.
#[derive(Debug, Default)]
pub struct TableRegistry {
    entries: Vec<TableEntry>,
    index: AHashMap<String, usize>,
}

impl TableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the entry for `table_id`, creating it if needed.
    ///
    /// `layer` and `sub_layer` are only applied when the entry is created.
    /// Later calls leave them untouched, even when they are still unset.
    pub fn ensure(
        &mut self,
        table_id: &str,
        layer: Option<&str>,
        sub_layer: Option<&str>,
    ) -> &mut TableEntry {
        let created = !self.index.contains_key(table_id);
        let idx = self.entry_index(table_id);
        let entry = &mut self.entries[idx];
        if created {
            entry.layer = layer.map(str::to_string);
            entry.sub_layer = sub_layer.map(str::to_string);
        }
        entry
    }

    /// Like [`ensure`](Self::ensure) but also marks the table as a mapping target
    pub fn ensure_target(
        &mut self,
        table_id: &str,
        layer: Option<&str>,
        sub_layer: Option<&str>,
    ) -> &mut TableEntry {
        let entry = self.ensure(table_id, layer, sub_layer);
        entry.is_target = true;
        entry
    }

    /// Append an aligned field pair to a table.
    ///
    /// Either side may be empty; a pair with both sides empty is dropped.
    /// If the table already lists `target_field` as a source-derived
    /// placeholder, that placeholder is upgraded in place instead of adding a
    /// second pair with the same name. Returns whether anything changed.
    pub fn append_field_pair(
        &mut self,
        table_id: &str,
        target_field: &str,
        source_field: &str,
    ) -> bool {
        if target_field.is_empty() && source_field.is_empty() {
            return false;
        }

        let idx = self.entry_index(table_id);
        let entry = &mut self.entries[idx];

        if !target_field.is_empty() && entry.known_fields.contains(target_field) {
            if let Some(placeholder) = entry.fields.iter_mut().find(|p| {
                p.origin == FieldOrigin::Source && p.field == target_field
            }) {
                placeholder.source_field = source_field.to_string();
                placeholder.origin = FieldOrigin::Mapping;
                return true;
            }
        }

        if !target_field.is_empty() {
            entry.known_fields.insert(target_field.to_string());
        }
        entry.fields.push(FieldPair {
            field: target_field.to_string(),
            source_field: source_field.to_string(),
            origin: FieldOrigin::Mapping,
        });
        true
    }

    /// Record that a downstream mapping reads `field` from `table_id`.
    ///
    /// Adds `(field, "")` the first time a name is seen on the table and does
    /// nothing for repeats or for names the table already maps itself.
    /// Returns whether a pair was added.
    pub fn append_source_field(&mut self, table_id: &str, field: &str) -> bool {
        if field.is_empty() {
            return false;
        }

        let idx = self.entry_index(table_id);
        let entry = &mut self.entries[idx];
        if !entry.known_fields.insert(field.to_string()) {
            return false;
        }

        entry.fields.push(FieldPair {
            field: field.to_string(),
            source_field: String::new(),
            origin: FieldOrigin::Source,
        });
        true
    }

    pub fn get(&self, table_id: &str) -> Option<&TableEntry> {
        self.index.get(table_id).map(|&i| &self.entries[i])
    }

    pub fn contains(&self, table_id: &str) -> bool {
        self.index.contains_key(table_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = &TableEntry> {
        self.entries.iter()
    }

    pub fn into_entries(self) -> Vec<TableEntry> {
        self.entries
    }

    fn entry_index(&mut self, table_id: &str) -> usize {
        if let Some(&idx) = self.index.get(table_id) {
            return idx;
        }
        let idx = self.entries.len();
        self.entries.push(TableEntry::new(table_id));
        self.index.insert(table_id.to_string(), idx);
        idx
    }
}
