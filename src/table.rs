//! Relational table model
//!
//! A [`Table`] is named, has ordered columns and one value per column per
//! row. Base columns are fixed once rows exist; only relation-generated
//! columns may be added or removed afterwards, and each column carries an
//! explicit origin tag so regeneration can strip exactly its own output.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::record::Value;

/// Name of the synthetic auto-incrementing primary key column, always
/// column 0 of every table.
pub const INDEX_COLUMN: &str = "Index";

/// Where a column came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnOrigin {
    /// Emitted by the table build from record fields.
    Base,
    /// Derived by relation generation; safe to remove and rebuild.
    Relation,
}

/// One column definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub origin: ColumnOrigin,
}

/// A named table of ordered columns and rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    name: String,
    columns: Vec<Column>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Table {
            name: name.into(),
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Position of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Cell lookup by row index and column name.
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let col = self.column_index(column)?;
        self.rows.get(row)?.get(col)
    }

    /// Append a base column. Base columns must all be added before the first
    /// row.
    pub fn add_column(&mut self, name: impl Into<String>) -> Result<()> {
        if !self.rows.is_empty() {
            return Err(Error::InvalidValue(format!(
                "table {} already has rows, base columns are fixed",
                self.name
            )));
        }
        self.columns.push(Column {
            name: name.into(),
            origin: ColumnOrigin::Base,
        });
        Ok(())
    }

    /// Append a row with exactly one value per column.
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(Error::InvalidValue(format!(
                "table {} has {} columns but row has {} values",
                self.name,
                self.columns.len(),
                row.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Insert a relation-generated column at `at`, supplying one value per
    /// existing row.
    pub(crate) fn insert_relation_column(
        &mut self,
        at: usize,
        name: impl Into<String>,
        values: Vec<Value>,
    ) -> Result<()> {
        if values.len() != self.rows.len() {
            return Err(Error::InvalidValue(format!(
                "table {} has {} rows but column has {} values",
                self.name,
                self.rows.len(),
                values.len()
            )));
        }
        let at = at.min(self.columns.len());
        self.columns.insert(
            at,
            Column {
                name: name.into(),
                origin: ColumnOrigin::Relation,
            },
        );
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.insert(at, value);
        }
        Ok(())
    }

    /// Remove every relation-generated column, returning how many were
    /// dropped. Base columns and their order are untouched.
    pub(crate) fn remove_relation_columns(&mut self) -> usize {
        let doomed: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.origin == ColumnOrigin::Relation)
            .map(|(i, _)| i)
            .collect();
        // Remove back-to-front so indices stay valid
        for &i in doomed.iter().rev() {
            self.columns.remove(i);
            for row in &mut self.rows {
                row.remove(i);
            }
        }
        doomed.len()
    }
}

/// A join between a parent key column and a child column, owning one derived
/// column on the child table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relation {
    pub name: String,
    pub parent_table: String,
    pub parent_column: String,
    pub child_table: String,
    pub child_column: String,
}
