//! The boundary consumed from the database client layer.
//!
//! A [`Cursor`] is a forward-only, stateful sequence of rows. The decoder in
//! [`crate::rows`] only ever talks to it through this trait.

use serde::{Deserialize, Serialize};

/// Column descriptor advertised by a cursor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column name as reported by the driver. Not guaranteed unique.
    pub name: String,
    /// Declared SQL type, informational only.
    pub decl_type: Option<String>,
}

impl Column {
    pub fn new(name: impl Into<String>, decl_type: Option<&str>) -> Self {
        Self {
            name: name.into(),
            decl_type: decl_type.map(str::to_owned),
        }
    }
}

/// Per-column receptacle for the raw bytes of one row.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum RawSlot {
    /// Nothing scanned into this slot for the current row.
    #[default]
    Unset,
    /// SQL NULL.
    Null,
    /// Column bytes exactly as the driver delivered them.
    Bytes(Vec<u8>),
}

impl RawSlot {
    pub fn is_set(&self) -> bool {
        !matches!(self, RawSlot::Unset)
    }
}

/// Errors raised by a [`Cursor`].
#[derive(Debug, thiserror::Error)]
pub enum CursorError {
    #[error("rows are closed")]
    Closed,
    #[error("scan called without a positioned row")]
    NoRow,
    #[error("expected {expected} destination slots, got {got}")]
    SlotCount { expected: usize, got: usize },
    /// Error reported by the database driver behind the cursor.
    #[error("driver error: {0}")]
    Driver(Box<dyn std::error::Error + Send + Sync>),
}

impl CursorError {
    pub fn driver(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Driver(err.into())
    }
}

/// Forward-only query cursor.
pub trait Cursor {
    /// Moves to the next row. Returns `false` at end of results or on error;
    /// the error, if any, is then available from [`Cursor::err`].
    fn advance(&mut self) -> bool;

    /// Copies every column of the positioned row into `dest` in one pass.
    /// `dest` must have exactly one slot per column.
    fn scan(&mut self, dest: &mut [RawSlot]) -> Result<(), CursorError>;

    /// Ordered column metadata. Fails once the cursor is closed.
    fn columns(&self) -> Result<Vec<Column>, CursorError>;

    /// Releases the cursor. Calling it again is a no-op.
    fn close(&mut self);

    /// Terminal error accumulated while advancing.
    fn err(&self) -> Option<&CursorError>;
}

impl<C: Cursor + ?Sized> Cursor for &mut C {
    fn advance(&mut self) -> bool {
        (**self).advance()
    }

    fn scan(&mut self, dest: &mut [RawSlot]) -> Result<(), CursorError> {
        (**self).scan(dest)
    }

    fn columns(&self) -> Result<Vec<Column>, CursorError> {
        (**self).columns()
    }

    fn close(&mut self) {
        (**self).close()
    }

    fn err(&self) -> Option<&CursorError> {
        (**self).err()
    }
}
