//! Record schemas
//!
//! A [`RecordSchema`] is an explicit, data-held description of one fixed-size
//! binary record shape: an ordered list of [`FieldLayout`] entries, each
//! pairing a primitive kind with a declarative semantic role. Roles drive how
//! the table builder turns raw values into columns; they are fixed once a
//! schema is defined.
//!
//! Schemas are registered once per table shape in a [`SchemaRegistry`] keyed
//! by table name.

use std::collections::HashMap;

/// Primitive kind of a binary field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// Signed 32-bit integer.
    Int32,
    /// Unsigned 32-bit integer.
    UInt32,
    /// Unsigned 16-bit integer.
    UInt16,
    /// 32-bit float.
    Float,
    /// Fixed-length raw byte region.
    Bytes(usize),
    /// Fixed-capacity inline string, zero-terminated when shorter.
    Str(usize),
    /// Fixed-length array of a nested kind.
    Array(Box<FieldKind>, usize),
}

impl FieldKind {
    /// On-disk byte width of one value of this kind.
    pub fn width(&self) -> usize {
        match self {
            FieldKind::Int32 | FieldKind::UInt32 | FieldKind::Float => 4,
            FieldKind::UInt16 => 2,
            FieldKind::Bytes(n) | FieldKind::Str(n) => *n,
            FieldKind::Array(elem, n) => elem.width() * n,
        }
    }
}

/// Semantic role of a field, controlling column generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldRole {
    /// Raw value copied into one column.
    Plain,
    /// Raw integer interpreted as a boolean flag.
    Boolean,
    /// Raw integer offset kept as-is (resolved elsewhere).
    IntOffset,
    /// Raw integer resolved against the primary string table; only the
    /// resolved string is kept.
    StringOffset,
    /// Raw integer kept plus a `<field>_string` column resolved against the
    /// secondary string table (`-1` means absent).
    StringIndex,
    /// Key into a named strings table; relation generation derives a
    /// `<field>_string` column from the parent's `String` column.
    StringId { table: String },
    /// Index into another table's `Index` column; relation generation
    /// derives a `<field>_string` column from the named parent column.
    TableIndex {
        /// Numeric table code, resolved through the table directory.
        code: i32,
        /// Fallback parent table name when the code resolves nothing.
        table: Option<String>,
        /// Parent column projected into the derived column.
        column: String,
    },
}

/// One field of a binary record layout.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldLayout {
    pub name: String,
    pub kind: FieldKind,
    pub role: FieldRole,
}

impl FieldLayout {
    /// A plain field with no special role.
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        FieldLayout {
            name: name.into(),
            kind,
            role: FieldRole::Plain,
        }
    }

    /// A field with an explicit semantic role.
    pub fn with_role(name: impl Into<String>, kind: FieldKind, role: FieldRole) -> Self {
        FieldLayout {
            name: name.into(),
            kind,
            role,
        }
    }
}

/// Ordered field list describing one fixed-size record shape.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSchema {
    /// Table name this schema produces (unique key in the store).
    pub name: String,
    pub fields: Vec<FieldLayout>,
}

impl RecordSchema {
    pub fn new(name: impl Into<String>, fields: Vec<FieldLayout>) -> Self {
        RecordSchema {
            name: name.into(),
            fields,
        }
    }

    /// Total byte width of one record: the sum of all field widths, with no
    /// padding between fields.
    pub fn row_width(&self) -> usize {
        self.fields.iter().map(|f| f.kind.width()).sum()
    }
}

/// Registry of record schemas keyed by table name.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<String, RecordSchema>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        SchemaRegistry::default()
    }

    /// Register a schema under its table name, replacing any previous entry.
    pub fn register(&mut self, schema: RecordSchema) {
        self.schemas.insert(schema.name.clone(), schema);
    }

    pub fn get(&self, name: &str) -> Option<&RecordSchema> {
        self.schemas.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_widths() {
        assert_eq!(FieldKind::Int32.width(), 4);
        assert_eq!(FieldKind::UInt16.width(), 2);
        assert_eq!(FieldKind::Str(32).width(), 32);
        assert_eq!(FieldKind::Bytes(7).width(), 7);
        assert_eq!(
            FieldKind::Array(Box::new(FieldKind::Int32), 6).width(),
            24
        );
        assert_eq!(
            FieldKind::Array(Box::new(FieldKind::Array(Box::new(FieldKind::UInt16), 2)), 3)
                .width(),
            12
        );
    }

    #[test]
    fn test_row_width_is_packed_sum() {
        let schema = RecordSchema::new(
            "items",
            vec![
                FieldLayout::new("code", FieldKind::Int32),
                FieldLayout::new("flags", FieldKind::UInt16),
                FieldLayout::new("name", FieldKind::Str(16)),
            ],
        );
        assert_eq!(schema.row_width(), 22);
    }

    #[test]
    fn test_registry() {
        let mut registry = SchemaRegistry::new();
        registry.register(RecordSchema::new(
            "items",
            vec![FieldLayout::new("code", FieldKind::Int32)],
        ));
        assert!(registry.contains("items"));
        assert_eq!(registry.get("items").unwrap().fields.len(), 1);
        assert!(registry.get("missing").is_none());
        assert_eq!(registry.len(), 1);
    }
}
