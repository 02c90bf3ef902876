//! Table store: named tables, relations, and the table directory

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::table::{Relation, Table};

/// The set of loaded tables and generated relations.
///
/// Single-threaded and synchronous: callers serialize load, relation, and
/// clear calls against one instance. Dropping the set releases every table.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TableSet {
    pub(crate) tables: HashMap<String, Table>,
    pub(crate) relations: Vec<Relation>,
    /// Numeric table code to table name, for relations declared by code.
    pub(crate) directory: HashMap<i32, String>,
}

impl TableSet {
    /// Create an empty store.
    pub fn new() -> Self {
        TableSet::default()
    }

    /// Look up a table by name.
    pub fn get_table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    /// Look up a table through the directory by its numeric code.
    pub fn table_by_code(&self, code: i32) -> Option<&Table> {
        self.tables.get(self.directory.get(&code)?)
    }

    /// Register a numeric code for a table name in the directory.
    pub fn set_table_code(&mut self, code: i32, name: impl Into<String>) {
        self.directory.insert(code, name.into());
    }

    pub fn contains_table(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    pub fn table_names(&self) -> impl Iterator<Item = &String> {
        self.tables.keys()
    }

    /// Generated relations, in generation order.
    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    /// Drop every relation and every relation-generated column. Base columns
    /// stay; everything removed is regenerable.
    pub fn clear_relations(&mut self) {
        self.relations.clear();
        for table in self.tables.values_mut() {
            table.remove_relation_columns();
        }
    }

    /// Drop all tables, relations, and directory entries, returning the
    /// store to empty. The on-disk cache is untouched.
    pub fn clear(&mut self) {
        self.tables.clear();
        self.relations.clear();
        self.directory.clear();
    }
}
