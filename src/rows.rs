//! Column catalog and per-row decoder.

use std::{borrow::Cow, collections::HashMap, fmt, iter::Zip, slice, str::Utf8Error};

use tracing::{debug, trace};

use crate::{Column, Cursor, CursorError, RawSlot, Result, RowsError};

/// Decodes the rows of a [`Cursor`] into raw, name-addressable fields.
///
/// The column catalog is captured once in [`SqlRows::new`] and never changes.
/// The row buffer holds one [`RawSlot`] per catalog entry and is refilled by
/// every [`SqlRows::fetch`].
///
/// Rows are advanced through [`SqlRows::next`]. The decoder keeps the cursor
/// (usually a `&mut` borrow of it) for its whole lifetime, so the cursor
/// cannot be advanced behind its back.
#[derive(Debug)]
pub struct SqlRows<C: Cursor> {
    cursor: C,
    columns: Vec<Column>,
    slots: Vec<RawSlot>,
}

impl<C: Cursor> SqlRows<C> {
    /// Binds a decoder to an open cursor positioned before its first row.
    pub fn new(cursor: C) -> Result<Self> {
        let columns = cursor.columns().map_err(RowsError::MetadataUnavailable)?;
        debug!(fields = columns.len(), "bound row decoder to cursor");
        let slots = vec![RawSlot::Unset; columns.len()];
        Ok(Self {
            cursor,
            columns,
            slots,
        })
    }

    /// Number of fields in every row.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// The column catalog, in result-set order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Advances the cursor. The previous row's fields become unreadable
    /// until the new row is fetched.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> bool {
        self.reset();
        self.cursor.advance()
    }

    /// Reads every column of the current row into the row buffer.
    pub fn fetch(&mut self) -> Result<()> {
        self.reset();
        if let Err(err) = self.cursor.scan(&mut self.slots) {
            self.reset();
            debug!(error = %err, "row scan failed");
            return Err(RowsError::ScanFailed(err));
        }
        trace!(fields = self.slots.len(), "fetched row");
        Ok(())
    }

    /// Name and raw value of the field at `index`.
    pub fn field_by_index(&self, index: usize) -> Result<(&str, FieldValue<'_>)> {
        let (column, slot) = self
            .columns
            .get(index)
            .zip(self.slots.get(index))
            .ok_or(RowsError::OutOfRange {
                index,
                length: self.columns.len(),
            })?;
        let value = FieldValue::from_slot(slot).ok_or(RowsError::NotFetched)?;
        Ok((column.name.as_str(), value))
    }

    /// Index and raw value of the first field named exactly `name`.
    ///
    /// With duplicate column names only the first one is reachable here.
    pub fn field_by_name(&self, name: &str) -> Result<(usize, FieldValue<'_>)> {
        let index = self
            .columns
            .iter()
            .position(|column| column.name == name)
            .ok_or_else(|| RowsError::FieldNotFound(name.to_owned()))?;
        let (_, value) = self.field_by_index(index)?;
        Ok((index, value))
    }

    /// Fields of the fetched row in column order. Empty if nothing was fetched.
    pub fn fields(&self) -> Fields<'_> {
        Fields {
            inner: self.columns.iter().zip(self.slots.iter()),
        }
    }

    /// Snapshot of the fetched row as name to text.
    ///
    /// Duplicate column names keep the last column's value. NULL becomes the
    /// empty string.
    pub fn all_fields(&self) -> HashMap<String, String> {
        self.fields()
            .map(|(name, value)| (name.to_owned(), value.to_text().into_owned()))
            .collect()
    }

    /// Terminal error of the underlying cursor. Check it once `next` returns
    /// `false`; if set, the result set is incomplete.
    pub fn err(&self) -> Option<&CursorError> {
        self.cursor.err()
    }

    /// Closes the underlying cursor.
    pub fn close(&mut self) {
        self.reset();
        self.cursor.close();
        debug!("closed row decoder cursor");
    }

    /// Releases the decoder and hands the cursor back.
    pub fn into_cursor(self) -> C {
        self.cursor
    }

    fn reset(&mut self) {
        self.slots.fill(RawSlot::Unset);
    }
}

/// Iterator over the `(name, value)` pairs of a fetched row.
#[derive(Debug)]
pub struct Fields<'a> {
    inner: Zip<slice::Iter<'a, Column>, slice::Iter<'a, RawSlot>>,
}

impl<'a> Iterator for Fields<'a> {
    type Item = (&'a str, FieldValue<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.by_ref().find_map(|(column, slot)| {
            FieldValue::from_slot(slot).map(|value| (column.name.as_str(), value))
        })
    }
}

/// Borrowed view of one fetched column. No type conversion is applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldValue<'a>(Option<&'a [u8]>);

impl<'a> FieldValue<'a> {
    fn from_slot(slot: &'a RawSlot) -> Option<Self> {
        match slot {
            RawSlot::Unset => None,
            RawSlot::Null => Some(Self(None)),
            RawSlot::Bytes(bytes) => Some(Self(Some(bytes.as_slice()))),
        }
    }

    pub fn is_null(&self) -> bool {
        self.0.is_none()
    }

    /// Raw bytes; empty for NULL.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.0.unwrap_or(&[])
    }

    pub fn as_str(&self) -> std::result::Result<&'a str, Utf8Error> {
        std::str::from_utf8(self.as_bytes())
    }

    /// Text form, replacing invalid UTF-8 sequences.
    pub fn to_text(&self) -> Cow<'a, str> {
        String::from_utf8_lossy(self.as_bytes())
    }
}

impl fmt::Display for FieldValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl PartialEq<str> for FieldValue<'_> {
    fn eq(&self, other: &str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl PartialEq<&str> for FieldValue<'_> {
    fn eq(&self, other: &&str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}
