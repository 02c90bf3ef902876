//! # uncooked
//!
//! A Rust library for decoding fixed-layout binary game-data tables and
//! exposing them as a queryable relational model with resolved
//! cross-references.
//!
//! ## Overview
//!
//! Game-data files store arrays of fixed-size, byte-packed records whose
//! layouts are externally fixed and undocumented. This library provides:
//!
//! - A byte-buffer codec with explicit cursor semantics: little-endian
//!   primitives, fixed arrays, inline and zero-terminated strings, a
//!   growable write buffer with mid-buffer insertion, and wildcard byte
//!   pattern search
//! - Delimited-text tokenization with per-row error reporting
//! - A record-array decoder driven by explicit, data-held schemas
//! - A relational table builder that derives human-readable columns from
//!   per-field semantic roles and joins tables across foreign indices
//! - A store cache that persists the whole table graph keyed by a version
//!   stamp
//!
//! ## Example - Decoding records into tables
//!
//! ```rust,no_run
//! use uncooked::progress::NullProgress;
//! use uncooked::record::decode_records;
//! use uncooked::schema::{FieldKind, FieldLayout, FieldRole, RecordSchema};
//! use uncooked::tableset::{StringLookups, TableSet};
//!
//! fn main() -> anyhow::Result<()> {
//!     let schema = RecordSchema::new(
//!         "items",
//!         vec![
//!             FieldLayout::new("code", FieldKind::Int32),
//!             FieldLayout::new("name", FieldKind::Str(32)),
//!             FieldLayout::with_role(
//!                 "quality",
//!                 FieldKind::Int32,
//!                 FieldRole::TableIndex {
//!                     code: 7,
//!                     table: Some("qualities".into()),
//!                     column: "name".into(),
//!                 },
//!             ),
//!         ],
//!     );
//!
//!     let data = std::fs::read("items.bin")?;
//!     let mut cursor = 0;
//!     let count = data.len() / schema.row_width();
//!     let records = decode_records(&schema, &data, &mut cursor, count)?;
//!
//!     let mut set = TableSet::new();
//!     set.load_table(&schema, &records, &StringLookups::default(), &mut NullProgress)?;
//!     set.generate_relations(&schema)?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Example - Restoring from cache
//!
//! ```rust,no_run
//! use uncooked::tableset::{Cache, CacheOutcome, TableSet};
//!
//! fn main() -> anyhow::Result<()> {
//!     let cache = Cache::new("cache/tables.cache");
//!     let set = match cache.load()? {
//!         CacheOutcome::Restored(set) => set,
//!         // Stale or missing: rebuild from source, then cache.save(&set)
//!         CacheOutcome::Stale | CacheOutcome::Missing => TableSet::new(),
//!     };
//!     println!("{} tables loaded", set.table_count());
//!     Ok(())
//! }
//! ```

pub mod buffer;
pub mod delimited;
pub mod error;
pub mod progress;
pub mod record;
pub mod schema;
pub mod table;
pub mod tableset;

pub use delimited::{DelimitedOptions, DelimitedReader};
pub use error::{Error, Result};
pub use progress::{NullProgress, ProgressSink};
pub use record::{decode_record, decode_records, encode_record, Record, Value};
pub use schema::{FieldKind, FieldLayout, FieldRole, RecordSchema, SchemaRegistry};
pub use table::{Column, ColumnOrigin, Relation, Table, INDEX_COLUMN};
pub use tableset::{Cache, CacheOutcome, StringLookups, TableSet, TABLE_VERSION};
