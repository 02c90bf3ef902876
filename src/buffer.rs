//! Byte buffer codec
//!
//! Stateless decode/encode helpers over a byte slice plus an explicit cursor,
//! a growable write buffer with mid-buffer insertion, and a wildcard byte
//! pattern search. All multi-byte values are little-endian.
//!
//! Every `read_*` function advances the cursor it is given; the `*_at`
//! variants read at a fixed offset and leave no cursor behind.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{Error, Result};

/// Wildcard byte for [`find_pattern`]: matches any haystack byte.
pub const WILDCARD: u8 = 0x90;

fn check_bounds(data: &[u8], offset: usize, len: usize) -> Result<()> {
    if offset + len > data.len() {
        return Err(Error::OutOfRange {
            offset,
            len,
            size: data.len(),
        });
    }
    Ok(())
}

/// Read a little-endian i32, advancing the cursor by 4.
pub fn read_i32(data: &[u8], cursor: &mut usize) -> Result<i32> {
    let value = read_i32_at(data, *cursor)?;
    *cursor += 4;
    Ok(value)
}

/// Read a little-endian i32 at a fixed offset.
pub fn read_i32_at(data: &[u8], offset: usize) -> Result<i32> {
    check_bounds(data, offset, 4)?;
    Ok(LittleEndian::read_i32(&data[offset..]))
}

/// Read a little-endian u32, advancing the cursor by 4.
pub fn read_u32(data: &[u8], cursor: &mut usize) -> Result<u32> {
    let value = read_u32_at(data, *cursor)?;
    *cursor += 4;
    Ok(value)
}

/// Read a little-endian u32 at a fixed offset.
pub fn read_u32_at(data: &[u8], offset: usize) -> Result<u32> {
    check_bounds(data, offset, 4)?;
    Ok(LittleEndian::read_u32(&data[offset..]))
}

/// Read a little-endian i16, advancing the cursor by 2.
pub fn read_i16(data: &[u8], cursor: &mut usize) -> Result<i16> {
    let value = read_i16_at(data, *cursor)?;
    *cursor += 2;
    Ok(value)
}

/// Read a little-endian i16 at a fixed offset.
pub fn read_i16_at(data: &[u8], offset: usize) -> Result<i16> {
    check_bounds(data, offset, 2)?;
    Ok(LittleEndian::read_i16(&data[offset..]))
}

/// Read a little-endian u16, advancing the cursor by 2.
pub fn read_u16(data: &[u8], cursor: &mut usize) -> Result<u16> {
    let value = read_u16_at(data, *cursor)?;
    *cursor += 2;
    Ok(value)
}

/// Read a little-endian u16 at a fixed offset.
pub fn read_u16_at(data: &[u8], offset: usize) -> Result<u16> {
    check_bounds(data, offset, 2)?;
    Ok(LittleEndian::read_u16(&data[offset..]))
}

/// Read a little-endian f32, advancing the cursor by 4.
pub fn read_f32(data: &[u8], cursor: &mut usize) -> Result<f32> {
    let value = read_f32_at(data, *cursor)?;
    *cursor += 4;
    Ok(value)
}

/// Read a little-endian f32 at a fixed offset.
pub fn read_f32_at(data: &[u8], offset: usize) -> Result<f32> {
    check_bounds(data, offset, 4)?;
    Ok(LittleEndian::read_f32(&data[offset..]))
}

/// Read `count` consecutive little-endian i32 values, advancing the cursor
/// by `count * 4`.
pub fn read_i32_array(data: &[u8], cursor: &mut usize, count: usize) -> Result<Vec<i32>> {
    check_bounds(data, *cursor, count * 4)?;
    let mut values = Vec::with_capacity(count);
    for _ in 0..count {
        values.push(read_i32(data, cursor)?);
    }
    Ok(values)
}

/// Read a zero-terminated string starting at `offset`.
///
/// Scans forward for the first NUL byte; if none is found before the end of
/// the buffer the remaining bytes form the string. A NUL at `offset` yields
/// an empty string. The cursor is not advanced (the string length is not
/// knowable by the caller up front).
pub fn read_str(data: &[u8], offset: usize) -> Result<String> {
    if offset > data.len() {
        return Err(Error::OutOfRange {
            offset,
            len: 0,
            size: data.len(),
        });
    }
    let end = data[offset..]
        .iter()
        .position(|&b| b == 0)
        .map(|p| offset + p)
        .unwrap_or(data.len());
    Ok(String::from_utf8_lossy(&data[offset..end]).to_string())
}

/// Read a fixed-capacity inline string of exactly `len` bytes.
///
/// The string content ends at the first NUL byte within the window (or the
/// full window if there is none), but the cursor always advances by `len`.
pub fn read_str_len(data: &[u8], cursor: &mut usize, len: usize) -> Result<String> {
    check_bounds(data, *cursor, len)?;
    let window = &data[*cursor..*cursor + len];
    *cursor += len;
    let end = window.iter().position(|&b| b == 0).unwrap_or(len);
    Ok(String::from_utf8_lossy(&window[..end]).to_string())
}

/// Read a zero-terminated UTF-16LE string starting at `offset`.
///
/// Scans forward in u16 code units for the first zero unit; if none is found
/// the string runs to the end of the buffer (truncated to whole units).
pub fn read_str_utf16(data: &[u8], offset: usize) -> Result<String> {
    if offset > data.len() {
        return Err(Error::OutOfRange {
            offset,
            len: 0,
            size: data.len(),
        });
    }
    let mut units = Vec::new();
    let mut pos = offset;
    while pos + 2 <= data.len() {
        let unit = LittleEndian::read_u16(&data[pos..]);
        if unit == 0 {
            break;
        }
        units.push(unit);
        pos += 2;
    }
    Ok(String::from_utf16_lossy(&units))
}

/// Encode a string as UTF-8 bytes, without terminator or truncation.
pub fn encode_str(s: &str) -> Vec<u8> {
    s.as_bytes().to_vec()
}

/// Encode a string as UTF-16LE bytes, without terminator or truncation.
pub fn encode_str_utf16(s: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(s.len() * 2);
    for unit in s.encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    bytes
}

/// Encode an i32 slice as consecutive little-endian values.
pub fn encode_i32_array(values: &[i32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(values.len() * 4);
    for v in values {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    bytes
}

/// Search `haystack` for the first occurrence of `needle`, treating
/// [`WILDCARD`] bytes in the needle as matching anything.
///
/// A needle extending past the end of the haystack is a non-match; the scan
/// never reads out of bounds. Returns the start index of the first match.
pub fn find_pattern(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    for start in 0..=haystack.len() - needle.len() {
        let found = needle
            .iter()
            .enumerate()
            .all(|(j, &b)| b == WILDCARD || haystack[start + j] == b);
        if found {
            return Some(start);
        }
    }
    None
}

/// A growable write buffer with explicit offsets.
///
/// Writes land at a caller-supplied offset; whenever a write would run past
/// the current capacity the backing storage grows by the write length plus
/// a fixed 1024-byte slack, preserving all content before the offset.
#[derive(Debug, Clone, Default)]
pub struct WriteBuffer {
    data: Vec<u8>,
}

impl WriteBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        WriteBuffer { data: Vec::new() }
    }

    /// Create a zero-filled buffer of the given capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        WriteBuffer {
            data: vec![0; capacity],
        }
    }

    /// Current capacity of the backing storage.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Write `bytes` at `offset`, growing if needed. Returns the offset just
    /// past the written block.
    pub fn write_at(&mut self, offset: usize, bytes: &[u8]) -> usize {
        if offset + bytes.len() > self.data.len() {
            let needed = offset + bytes.len() - self.data.len();
            self.data.resize(self.data.len() + needed + 1024, 0);
        }
        self.data[offset..offset + bytes.len()].copy_from_slice(bytes);
        offset + bytes.len()
    }

    /// Insert `bytes` at `offset`, shifting the existing tail forward.
    ///
    /// Content before `offset` is untouched, the new block occupies
    /// `[offset, offset + len)`, and the previously existing
    /// `[offset, capacity)` tail follows immediately after it.
    pub fn insert_at(&mut self, offset: usize, bytes: &[u8]) -> usize {
        let tail = self.data[offset..].to_vec();
        self.data.resize(self.data.len() + bytes.len() + 1024, 0);
        self.data[offset..offset + bytes.len()].copy_from_slice(bytes);
        self.data[offset + bytes.len()..offset + bytes.len() + tail.len()]
            .copy_from_slice(&tail);
        offset + bytes.len()
    }

    /// View the full backing storage.
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Consume the buffer, returning the backing storage.
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }
}
