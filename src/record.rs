//! Record array decode/encode
//!
//! Turns a byte buffer into an ordered sequence of typed [`Record`]s using a
//! [`RecordSchema`], and back again. Record order is preserved: it becomes
//! row order (and thus the `Index` column) downstream.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::buffer;
use crate::error::{Error, Result};
use crate::schema::{FieldKind, RecordSchema};

/// A decoded field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Int32(i32),
    UInt32(u32),
    UInt16(u16),
    Float(f32),
    Bytes(Vec<u8>),
    Str(String),
    Array(Vec<Value>),
}

impl Value {
    /// Integer view of the value, for key lookups. `None` for non-integer
    /// kinds.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int32(v) => Some(*v as i64),
            Value::UInt32(v) => Some(*v as i64),
            Value::UInt16(v) => Some(*v as i64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int32(v) => write!(f, "{}", v),
            Value::UInt32(v) => write!(f, "{}", v),
            Value::UInt16(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Str(s) => write!(f, "{}", s),
            Value::Bytes(b) => {
                for (i, byte) in b.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{:02x}", byte)?;
                }
                Ok(())
            }
            Value::Array(values) => {
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                Ok(())
            }
        }
    }
}

/// One decoded record: field values in schema order. Immutable after decode.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    values: Vec<Value>,
}

impl Record {
    pub fn new(values: Vec<Value>) -> Self {
        Record { values }
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn decode_field(kind: &FieldKind, data: &[u8], cursor: &mut usize) -> Result<Value> {
    match kind {
        FieldKind::Int32 => Ok(Value::Int32(buffer::read_i32(data, cursor)?)),
        FieldKind::UInt32 => Ok(Value::UInt32(buffer::read_u32(data, cursor)?)),
        FieldKind::UInt16 => Ok(Value::UInt16(buffer::read_u16(data, cursor)?)),
        FieldKind::Float => Ok(Value::Float(buffer::read_f32(data, cursor)?)),
        FieldKind::Bytes(n) => {
            if *cursor + n > data.len() {
                return Err(Error::OutOfRange {
                    offset: *cursor,
                    len: *n,
                    size: data.len(),
                });
            }
            let bytes = data[*cursor..*cursor + n].to_vec();
            *cursor += n;
            Ok(Value::Bytes(bytes))
        }
        FieldKind::Str(n) => Ok(Value::Str(buffer::read_str_len(data, cursor, *n)?)),
        FieldKind::Array(elem, n) => {
            let mut values = Vec::with_capacity(*n);
            for _ in 0..*n {
                values.push(decode_field(elem, data, cursor)?);
            }
            Ok(Value::Array(values))
        }
    }
}

/// Decode one record at the cursor, advancing it by the schema row width.
pub fn decode_record(schema: &RecordSchema, data: &[u8], cursor: &mut usize) -> Result<Record> {
    let mut values = Vec::with_capacity(schema.fields.len());
    for field in &schema.fields {
        values.push(decode_field(&field.kind, data, cursor)?);
    }
    Ok(Record { values })
}

/// Decode `count` consecutive fixed-size records starting at the cursor.
///
/// Fails up front with `TruncatedInput` when fewer than
/// `count * row_width` bytes remain; on success the cursor has advanced by
/// exactly that much and records are in source order.
pub fn decode_records(
    schema: &RecordSchema,
    data: &[u8],
    cursor: &mut usize,
    count: usize,
) -> Result<Vec<Record>> {
    let expected = count * schema.row_width();
    let available = data.len().saturating_sub(*cursor);
    if available < expected {
        return Err(Error::TruncatedInput {
            expected,
            available,
        });
    }
    let mut records = Vec::with_capacity(count);
    for _ in 0..count {
        records.push(decode_record(schema, data, cursor)?);
    }
    Ok(records)
}

fn encode_field(kind: &FieldKind, value: &Value, out: &mut Vec<u8>) -> Result<()> {
    match (kind, value) {
        (FieldKind::Int32, Value::Int32(v)) => out.extend_from_slice(&v.to_le_bytes()),
        (FieldKind::UInt32, Value::UInt32(v)) => out.extend_from_slice(&v.to_le_bytes()),
        (FieldKind::UInt16, Value::UInt16(v)) => out.extend_from_slice(&v.to_le_bytes()),
        (FieldKind::Float, Value::Float(v)) => out.extend_from_slice(&v.to_le_bytes()),
        (FieldKind::Bytes(n), Value::Bytes(b)) => {
            if b.len() != *n {
                return Err(Error::InvalidValue(format!(
                    "byte field expects {} bytes, value has {}",
                    n,
                    b.len()
                )));
            }
            out.extend_from_slice(b);
        }
        (FieldKind::Str(n), Value::Str(s)) => {
            let bytes = buffer::encode_str(s);
            if bytes.len() > *n {
                return Err(Error::StringTooLong {
                    len: bytes.len(),
                    capacity: *n,
                });
            }
            out.extend_from_slice(&bytes);
            // NUL-pad to field capacity
            out.resize(out.len() + (n - bytes.len()), 0);
        }
        (FieldKind::Array(elem, n), Value::Array(values)) => {
            if values.len() != *n {
                return Err(Error::InvalidValue(format!(
                    "array field expects {} elements, value has {}",
                    n,
                    values.len()
                )));
            }
            for v in values {
                encode_field(elem, v, out)?;
            }
        }
        (kind, value) => {
            return Err(Error::InvalidValue(format!(
                "value {:?} does not match field kind {:?}",
                value, kind
            )));
        }
    }
    Ok(())
}

/// Encode one record back to its fixed-size binary form, appending to `out`.
pub fn encode_record(schema: &RecordSchema, record: &Record, out: &mut Vec<u8>) -> Result<()> {
    if record.len() != schema.fields.len() {
        return Err(Error::InvalidValue(format!(
            "record has {} values but schema {} has {} fields",
            record.len(),
            schema.name,
            schema.fields.len()
        )));
    }
    for (field, value) in schema.fields.iter().zip(record.values()) {
        encode_field(&field.kind, value, out)?;
    }
    Ok(())
}
