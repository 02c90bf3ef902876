//! Relational table store
//!
//! A [`TableSet`] owns the named tables and relations built from decoded
//! record arrays. Loading is metadata-driven: per-field semantic roles on a
//! [`RecordSchema`](crate::schema::RecordSchema) decide which columns each
//! field produces and which cross-table joins relation generation derives.
//!
//! Load order between tables is not guaranteed. Relation generation is an
//! explicit, idempotent pass that silently skips parents that are not loaded
//! yet; callers re-run it once every table is in the store.
//!
//! The whole store can be persisted to a single cache blob keyed by a
//! version stamp and restored on the next run, skipping all table builds.
//!
//! ## Example
//!
//! ```rust,no_run
//! use uncooked::schema::{FieldKind, FieldLayout, FieldRole, RecordSchema};
//! use uncooked::tableset::{StringLookups, TableSet};
//! use uncooked::progress::NullProgress;
//!
//! let schema = RecordSchema::new(
//!     "items",
//!     vec![
//!         FieldLayout::new("code", FieldKind::Int32),
//!         FieldLayout::with_role("name", FieldKind::Int32, FieldRole::StringOffset),
//!     ],
//! );
//!
//! let data = std::fs::read("items.bin")?;
//! let mut cursor = 0;
//! let records = uncooked::record::decode_records(&schema, &data, &mut cursor, 100)?;
//!
//! let mut set = TableSet::new();
//! set.load_table(&schema, &records, &StringLookups::default(), &mut NullProgress)?;
//! set.generate_relations(&schema)?;
//! # Ok::<(), uncooked::Error>(())
//! ```

mod builder;
mod cache;
mod store;

pub use builder::{StringLookups, STRINGS_KEY_COLUMN, STRINGS_VALUE_COLUMN};
pub use cache::{Cache, CacheOutcome, TABLE_VERSION};
pub use store::TableSet;
