//! Metadata-driven table building and relation generation

use std::collections::HashMap;

use tracing::debug;

use crate::error::Result;
use crate::progress::ProgressSink;
use crate::record::{Record, Value};
use crate::schema::{FieldRole, RecordSchema};
use crate::table::{Relation, Table, INDEX_COLUMN};

use super::store::TableSet;

/// Key column of a strings table, matched against `StringId` field values.
pub const STRINGS_KEY_COLUMN: &str = "ReferenceId";

/// Display column of a strings table, projected into derived columns.
pub const STRINGS_VALUE_COLUMN: &str = "String";

/// Auxiliary string lookups supplied alongside the records of one table.
#[derive(Debug, Default, Clone)]
pub struct StringLookups {
    /// Primary string table for `StringOffset` fields, keyed by the raw
    /// integer value.
    pub primary: HashMap<i32, String>,
    /// Secondary string table for `StringIndex` fields, indexed by the raw
    /// integer value; `-1` means absent.
    pub secondary: Vec<String>,
}

impl StringLookups {
    fn resolve_primary(&self, value: &Value) -> String {
        value
            .as_i64()
            .and_then(|v| i32::try_from(v).ok())
            .and_then(|v| self.primary.get(&v))
            .cloned()
            .unwrap_or_default()
    }

    fn resolve_secondary(&self, value: &Value) -> String {
        match value.as_i64() {
            Some(v) if v >= 0 => self
                .secondary
                .get(v as usize)
                .cloned()
                .unwrap_or_default(),
            _ => String::new(),
        }
    }
}

impl TableSet {
    /// Build a table from decoded records under the schema's table name.
    ///
    /// Idempotent: if a table of that name is already in the store the call
    /// is a no-op. Columns follow field order behind the synthetic `Index`
    /// column; `StringOffset` fields store only the resolved string,
    /// `StringIndex` fields store the raw integer plus a `<field>_string`
    /// column. One row is appended per record, `Index` dense from 0.
    pub fn load_table(
        &mut self,
        schema: &RecordSchema,
        records: &[Record],
        strings: &StringLookups,
        progress: &mut dyn ProgressSink,
    ) -> Result<()> {
        let name = &schema.name;
        if self.tables.contains_key(name) {
            debug!(table = %name, "table already loaded, skipping");
            return Ok(());
        }

        progress.stage(&format!("Building table data... {}", name));

        let mut table = Table::new(name.clone());
        table.add_column(INDEX_COLUMN)?;
        for field in &schema.fields {
            match &field.role {
                FieldRole::StringIndex => {
                    table.add_column(field.name.clone())?;
                    table.add_column(format!("{}_string", field.name))?;
                }
                _ => table.add_column(field.name.clone())?,
            }
        }

        let total = records.len() as u64;
        for (index, record) in records.iter().enumerate() {
            progress.rows(index as u64 + 1, total);

            let mut row = Vec::with_capacity(table.columns().len());
            row.push(Value::Int32(index as i32));
            for (field, value) in schema.fields.iter().zip(record.values()) {
                match &field.role {
                    FieldRole::StringOffset => {
                        row.push(Value::Str(strings.resolve_primary(value)));
                    }
                    FieldRole::StringIndex => {
                        row.push(value.clone());
                        row.push(Value::Str(strings.resolve_secondary(value)));
                    }
                    _ => row.push(value.clone()),
                }
            }
            table.push_row(row)?;
        }

        self.tables.insert(name.clone(), table);
        Ok(())
    }

    /// Rebuild the derived join columns of one table.
    ///
    /// Removes every previously relation-generated column of the table, then
    /// for each `StringId` or `TableIndex` field derives a `<field>_string`
    /// column by matching the raw value against the parent table's key
    /// column. Parents that are not in the store yet are skipped silently;
    /// re-run the pass once all tables are loaded. Keys of `-1` or without a
    /// matching parent row yield an empty string.
    pub fn generate_relations(&mut self, schema: &RecordSchema) -> Result<()> {
        let name = &schema.name;
        if !self.tables.contains_key(name) {
            debug!(table = %name, "relations skipped: table not loaded");
            return Ok(());
        }

        self.relations.retain(|r| r.child_table != *name);
        if let Some(table) = self.tables.get_mut(name) {
            table.remove_relation_columns();
        }

        for field in &schema.fields {
            let (parent_name, parent_key, parent_value_col) = match &field.role {
                FieldRole::StringId { table } => (
                    Some(table.clone()),
                    STRINGS_KEY_COLUMN,
                    STRINGS_VALUE_COLUMN.to_string(),
                ),
                FieldRole::TableIndex {
                    code,
                    table,
                    column,
                } => {
                    let resolved = self.directory.get(code).cloned().or_else(|| table.clone());
                    (resolved, INDEX_COLUMN, column.clone())
                }
                _ => continue,
            };

            let Some(parent_name) = parent_name else {
                debug!(table = %name, field = %field.name, "relation skipped: no parent table declared");
                continue;
            };
            let Some(parent) = self.tables.get(&parent_name) else {
                debug!(
                    table = %name,
                    field = %field.name,
                    parent = %parent_name,
                    "relation skipped: parent table not loaded"
                );
                continue;
            };
            let (Some(key_col), Some(value_col)) = (
                parent.column_index(parent_key),
                parent.column_index(&parent_value_col),
            ) else {
                debug!(
                    parent = %parent_name,
                    key = %parent_key,
                    value = %parent_value_col,
                    "relation skipped: parent columns missing"
                );
                continue;
            };
            let Some(child) = self.tables.get(name) else {
                continue;
            };
            let Some(child_col) = child.column_index(&field.name) else {
                debug!(table = %name, field = %field.name, "relation skipped: child column missing");
                continue;
            };

            // First occurrence wins for duplicate parent keys
            let mut key_to_row: HashMap<i64, usize> = HashMap::new();
            for (row_index, row) in parent.rows().iter().enumerate() {
                if let Some(key) = row[key_col].as_i64() {
                    key_to_row.entry(key).or_insert(row_index);
                }
            }

            let derived: Vec<Value> = child
                .rows()
                .iter()
                .map(|row| {
                    let resolved = match row[child_col].as_i64() {
                        Some(key) if key >= 0 => key_to_row
                            .get(&key)
                            .map(|&p| parent.rows()[p][value_col].to_string())
                            .unwrap_or_default(),
                        _ => String::new(),
                    };
                    Value::Str(resolved)
                })
                .collect();

            let relation = Relation {
                name: format!("{}.{}", name, field.name),
                parent_table: parent_name,
                parent_column: parent_key.to_string(),
                child_table: name.clone(),
                child_column: field.name.clone(),
            };

            if let Some(table) = self.tables.get_mut(name) {
                table.insert_relation_column(
                    child_col + 1,
                    format!("{}_string", field.name),
                    derived,
                )?;
            }
            self.relations.push(relation);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::test_support::RecordingProgress;
    use crate::progress::NullProgress;
    use crate::schema::{FieldKind, FieldLayout};

    fn plain_schema(name: &str) -> RecordSchema {
        RecordSchema::new(
            name,
            vec![
                FieldLayout::new("code", FieldKind::Int32),
                FieldLayout::new("name", FieldKind::Str(8)),
            ],
        )
    }

    fn plain_records(values: &[(i32, &str)]) -> Vec<Record> {
        values
            .iter()
            .map(|(code, name)| {
                Record::new(vec![Value::Int32(*code), Value::Str(name.to_string())])
            })
            .collect()
    }

    #[test]
    fn test_load_table_columns_and_index() {
        let mut set = TableSet::new();
        let schema = plain_schema("items");
        set.load_table(
            &schema,
            &plain_records(&[(10, "sword"), (20, "axe")]),
            &StringLookups::default(),
            &mut NullProgress,
        )
        .unwrap();

        let table = set.get_table("items").unwrap();
        let names: Vec<&str> = table.columns().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Index", "code", "name"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.value(0, "Index").unwrap().as_i64(), Some(0));
        assert_eq!(table.value(1, "Index").unwrap().as_i64(), Some(1));
        assert_eq!(table.value(1, "name").unwrap().to_string(), "axe");
    }

    #[test]
    fn test_load_table_idempotent() {
        let mut set = TableSet::new();
        let schema = plain_schema("items");
        set.load_table(
            &schema,
            &plain_records(&[(1, "a")]),
            &StringLookups::default(),
            &mut NullProgress,
        )
        .unwrap();
        // Second load with different records is a no-op
        set.load_table(
            &schema,
            &plain_records(&[(1, "a"), (2, "b"), (3, "c")]),
            &StringLookups::default(),
            &mut NullProgress,
        )
        .unwrap();
        let table = set.get_table("items").unwrap();
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.columns().len(), 3);
    }

    #[test]
    fn test_string_offset_stores_resolved_string_only() {
        let schema = RecordSchema::new(
            "items",
            vec![FieldLayout::with_role(
                "name",
                FieldKind::Int32,
                FieldRole::StringOffset,
            )],
        );
        let mut strings = StringLookups::default();
        strings.primary.insert(64, "resolved".to_string());

        let mut set = TableSet::new();
        set.load_table(
            &schema,
            &[
                Record::new(vec![Value::Int32(64)]),
                Record::new(vec![Value::Int32(999)]),
            ],
            &strings,
            &mut NullProgress,
        )
        .unwrap();

        let table = set.get_table("items").unwrap();
        assert_eq!(table.columns().len(), 2);
        assert_eq!(table.value(0, "name").unwrap().as_str(), Some("resolved"));
        // Unresolved lookup defaults to empty string, never an error
        assert_eq!(table.value(1, "name").unwrap().as_str(), Some(""));
    }

    #[test]
    fn test_string_index_emits_two_columns() {
        let schema = RecordSchema::new(
            "items",
            vec![FieldLayout::with_role(
                "desc",
                FieldKind::Int32,
                FieldRole::StringIndex,
            )],
        );
        let strings = StringLookups {
            primary: HashMap::new(),
            secondary: vec!["zero".to_string(), "one".to_string()],
        };

        let mut set = TableSet::new();
        set.load_table(
            &schema,
            &[
                Record::new(vec![Value::Int32(1)]),
                Record::new(vec![Value::Int32(-1)]),
            ],
            &strings,
            &mut NullProgress,
        )
        .unwrap();

        let table = set.get_table("items").unwrap();
        let names: Vec<&str> = table.columns().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Index", "desc", "desc_string"]);
        assert_eq!(table.value(0, "desc").unwrap().as_i64(), Some(1));
        assert_eq!(table.value(0, "desc_string").unwrap().as_str(), Some("one"));
        // -1 means absent
        assert_eq!(table.value(1, "desc_string").unwrap().as_str(), Some(""));
    }

    #[test]
    fn test_progress_notifications() {
        let mut set = TableSet::new();
        let mut progress = RecordingProgress::default();
        set.load_table(
            &plain_schema("items"),
            &plain_records(&[(1, "a"), (2, "b")]),
            &StringLookups::default(),
            &mut progress,
        )
        .unwrap();
        assert_eq!(progress.stages.len(), 1);
        assert!(progress.stages[0].contains("items"));
        assert_eq!(progress.row_ticks, vec![(1, 2), (2, 2)]);
    }

    fn child_schema() -> RecordSchema {
        RecordSchema::new(
            "units",
            vec![FieldLayout::with_role(
                "quality",
                FieldKind::Int32,
                FieldRole::TableIndex {
                    code: 7,
                    table: Some("qualities".to_string()),
                    column: "name".to_string(),
                },
            )],
        )
    }

    fn load_parent(set: &mut TableSet) {
        set.load_table(
            &plain_schema("qualities"),
            &plain_records(&[(0, "common"), (0, "rare"), (0, "epic")]),
            &StringLookups::default(),
            &mut NullProgress,
        )
        .unwrap();
    }

    #[test]
    fn test_table_index_relation_resolves_by_parent_index() {
        let mut set = TableSet::new();
        load_parent(&mut set);
        set.load_table(
            &child_schema(),
            &[
                Record::new(vec![Value::Int32(2)]),
                Record::new(vec![Value::Int32(-1)]),
                Record::new(vec![Value::Int32(42)]),
            ],
            &StringLookups::default(),
            &mut NullProgress,
        )
        .unwrap();

        set.generate_relations(&child_schema()).unwrap();

        let table = set.get_table("units").unwrap();
        let names: Vec<&str> = table.columns().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Index", "quality", "quality_string"]);
        assert_eq!(table.value(0, "quality_string").unwrap().as_str(), Some("epic"));
        // -1 and unmatched keys resolve to empty strings, not errors
        assert_eq!(table.value(1, "quality_string").unwrap().as_str(), Some(""));
        assert_eq!(table.value(2, "quality_string").unwrap().as_str(), Some(""));

        assert_eq!(set.relations().len(), 1);
        let relation = &set.relations()[0];
        assert_eq!(relation.parent_table, "qualities");
        assert_eq!(relation.parent_column, "Index");
        assert_eq!(relation.child_table, "units");
        assert_eq!(relation.child_column, "quality");
    }

    #[test]
    fn test_forward_reference_tolerated_then_resolved() {
        let mut set = TableSet::new();
        set.load_table(
            &child_schema(),
            &[Record::new(vec![Value::Int32(1)])],
            &StringLookups::default(),
            &mut NullProgress,
        )
        .unwrap();

        // Parent not loaded yet: relation skipped silently
        set.generate_relations(&child_schema()).unwrap();
        assert!(set.relations().is_empty());
        assert!(set
            .get_table("units")
            .unwrap()
            .column_index("quality_string")
            .is_none());

        // Load the parent and re-run the pass
        load_parent(&mut set);
        set.generate_relations(&child_schema()).unwrap();
        let table = set.get_table("units").unwrap();
        assert_eq!(table.value(0, "quality_string").unwrap().as_str(), Some("rare"));
        assert_eq!(set.relations().len(), 1);
    }

    #[test]
    fn test_regeneration_never_double_adds() {
        let mut set = TableSet::new();
        load_parent(&mut set);
        set.load_table(
            &child_schema(),
            &[Record::new(vec![Value::Int32(0)])],
            &StringLookups::default(),
            &mut NullProgress,
        )
        .unwrap();

        set.generate_relations(&child_schema()).unwrap();
        set.generate_relations(&child_schema()).unwrap();
        set.generate_relations(&child_schema()).unwrap();

        let table = set.get_table("units").unwrap();
        assert_eq!(table.columns().len(), 3);
        assert_eq!(set.relations().len(), 1);
    }

    #[test]
    fn test_table_index_resolution_through_directory() {
        let mut set = TableSet::new();
        // Parent registered under a different name than the schema fallback
        set.load_table(
            &plain_schema("quality_levels"),
            &plain_records(&[(0, "common")]),
            &StringLookups::default(),
            &mut NullProgress,
        )
        .unwrap();
        set.set_table_code(7, "quality_levels");
        set.load_table(
            &child_schema(),
            &[Record::new(vec![Value::Int32(0)])],
            &StringLookups::default(),
            &mut NullProgress,
        )
        .unwrap();

        set.generate_relations(&child_schema()).unwrap();
        assert_eq!(set.relations()[0].parent_table, "quality_levels");
        let table = set.get_table("units").unwrap();
        assert_eq!(
            table.value(0, "quality_string").unwrap().as_str(),
            Some("common")
        );
    }

    #[test]
    fn test_string_id_relation_uses_strings_table_convention() {
        // Strings table shaped like the loaded strings files: ReferenceId key,
        // String display column
        let strings_schema = RecordSchema::new(
            "strings",
            vec![
                FieldLayout::new(STRINGS_KEY_COLUMN, FieldKind::Int32),
                FieldLayout::new(STRINGS_VALUE_COLUMN, FieldKind::Str(16)),
            ],
        );
        let child = RecordSchema::new(
            "units",
            vec![FieldLayout::with_role(
                "display",
                FieldKind::Int32,
                FieldRole::StringId {
                    table: "strings".to_string(),
                },
            )],
        );

        let mut set = TableSet::new();
        set.load_table(
            &strings_schema,
            &[
                Record::new(vec![Value::Int32(501), Value::Str("Hammer".into())]),
                Record::new(vec![Value::Int32(502), Value::Str("Anvil".into())]),
            ],
            &StringLookups::default(),
            &mut NullProgress,
        )
        .unwrap();
        set.load_table(
            &child,
            &[
                Record::new(vec![Value::Int32(502)]),
                Record::new(vec![Value::Int32(900)]),
            ],
            &StringLookups::default(),
            &mut NullProgress,
        )
        .unwrap();

        set.generate_relations(&child).unwrap();
        let table = set.get_table("units").unwrap();
        assert_eq!(
            table.value(0, "display_string").unwrap().as_str(),
            Some("Anvil")
        );
        assert_eq!(table.value(1, "display_string").unwrap().as_str(), Some(""));
        assert_eq!(set.relations()[0].parent_column, STRINGS_KEY_COLUMN);
    }

    #[test]
    fn test_clear_relations_strips_generated_columns_everywhere() {
        let mut set = TableSet::new();
        load_parent(&mut set);
        set.load_table(
            &child_schema(),
            &[Record::new(vec![Value::Int32(0)])],
            &StringLookups::default(),
            &mut NullProgress,
        )
        .unwrap();
        set.generate_relations(&child_schema()).unwrap();
        assert_eq!(set.relations().len(), 1);

        set.clear_relations();
        assert!(set.relations().is_empty());
        assert!(set
            .get_table("units")
            .unwrap()
            .column_index("quality_string")
            .is_none());
        // Base columns untouched
        assert!(set.get_table("units").unwrap().column_index("quality").is_some());
    }
}
