//! Delimited-text tokenizer
//!
//! Splits a byte buffer into fixed-width logical rows using a single
//! delimiter byte and a carriage-return row terminator. Consecutive
//! delimiters yield explicit empty fields, and the column count per row is
//! declared up front so short or long rows can be reported.
//!
//! Escaping is configuration, not convention: literal `\n` sequences and
//! surrounding double quotes are only rewritten when the caller asks.

use crate::error::{Error, Result};

/// Row terminator byte (carriage-return convention, part of a two-byte
/// `\r\n` sequence).
pub const ROW_TERMINATOR: u8 = 0x0D;

/// Options controlling delimited parsing.
#[derive(Debug, Clone)]
pub struct DelimitedOptions {
    /// Field delimiter byte.
    pub delimiter: u8,
    /// Declared number of columns per logical row.
    pub columns: usize,
    /// Skip the first (header) row.
    pub skip_header: bool,
    /// Rewrite literal `\n` two-byte sequences into newlines.
    pub unescape_newlines: bool,
    /// Strip double-quote characters from field content.
    pub strip_quotes: bool,
}

impl DelimitedOptions {
    /// Comma-delimited with the given column count, no header, no escaping.
    pub fn csv(columns: usize) -> Self {
        DelimitedOptions {
            delimiter: b',',
            columns,
            skip_header: false,
            unescape_newlines: false,
            strip_quotes: false,
        }
    }
}

/// How a field read ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldEnd {
    Delimiter,
    Row,
    Eof,
}

/// Streaming reader over delimited byte content.
///
/// [`next_row`](DelimitedReader::next_row) reports malformed rows
/// individually so the caller decides between aborting and skipping.
pub struct DelimitedReader<'a> {
    data: &'a [u8],
    offset: usize,
    row: usize,
    header_pending: bool,
    opts: DelimitedOptions,
}

impl<'a> DelimitedReader<'a> {
    pub fn new(data: &'a [u8], opts: DelimitedOptions) -> Self {
        let header_pending = opts.skip_header;
        DelimitedReader {
            data,
            offset: 0,
            row: 0,
            header_pending,
            opts,
        }
    }

    /// Read one field: bytes up to the next delimiter, row terminator, or
    /// end of input. A delimiter at the cursor is an explicit empty field.
    fn read_field(&mut self) -> (String, FieldEnd) {
        let start = self.offset;
        while self.offset < self.data.len() {
            let b = self.data[self.offset];
            if b == self.opts.delimiter {
                let field = self.make_field(start, self.offset);
                self.offset += 1;
                return (field, FieldEnd::Delimiter);
            }
            if b == ROW_TERMINATOR {
                let field = self.make_field(start, self.offset);
                // Skip the two-byte terminator sequence
                self.offset = (self.offset + 2).min(self.data.len());
                return (field, FieldEnd::Row);
            }
            self.offset += 1;
        }
        (self.make_field(start, self.offset), FieldEnd::Eof)
    }

    fn make_field(&self, start: usize, end: usize) -> String {
        let mut field = String::from_utf8_lossy(&self.data[start..end]).to_string();
        if self.opts.unescape_newlines {
            field = field.replace("\\n", "\n");
        }
        if self.opts.strip_quotes {
            field = field.replace('"', "");
        }
        field
    }

    /// Read all fields up to the end of the current logical row.
    fn read_row_fields(&mut self) -> Vec<String> {
        let mut fields = Vec::with_capacity(self.opts.columns);
        loop {
            let (field, end) = self.read_field();
            fields.push(field);
            if end != FieldEnd::Delimiter {
                break;
            }
        }
        fields
    }

    /// Read the next logical row, or `None` at end of input.
    ///
    /// A row whose field count differs from the declared column count yields
    /// `Err(MalformedRow)` carrying the zero-based row index; the reader
    /// stays positioned on the following row either way.
    pub fn next_row(&mut self) -> Option<Result<Vec<String>>> {
        if self.header_pending {
            self.header_pending = false;
            if self.offset < self.data.len() {
                self.read_row_fields();
            }
        }
        if self.offset >= self.data.len() {
            return None;
        }
        let fields = self.read_row_fields();
        let row = self.row;
        self.row += 1;
        if fields.len() != self.opts.columns {
            return Some(Err(Error::MalformedRow {
                row,
                expected: self.opts.columns,
                found: fields.len(),
            }));
        }
        Some(Ok(fields))
    }

    /// Collect every row, aborting on the first malformed one.
    pub fn rows(mut self) -> Result<Vec<Vec<String>>> {
        let mut rows = Vec::new();
        while let Some(row) = self.next_row() {
            rows.push(row?);
        }
        Ok(rows)
    }
}
