//! Row decoding over SQL query cursors for the Runar ecosystem.
//!
//! # Intention
//!
//! - Walk any query result set through one uniform API: advance, fetch the
//!   raw column bytes once per row, then read fields by index or by name.
//! - Keep every value as the raw text the driver produced. No typed
//!   conversion happens here.
//!
//! # Architectural Boundaries
//!
//! - The cursor is an external collaborator ([`Cursor`]). Opening queries,
//!   pooling and transactions belong to the caller.
//! - [`SqliteCursor`] is the only driver adapter shipped with the crate.
//!
//! # Example
//!
//! ```
//! use rust_sql_rows::{SqlRows, SqliteConfig, SqliteCursor};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let conn = SqliteConfig::in_memory().open()?;
//! conn.execute_batch(
//!     "CREATE TABLE quotes (id INTEGER, author TEXT, quoteText TEXT);
//!      INSERT INTO quotes VALUES (0, 'Plato', 'The unexamined life...');",
//! )?;
//!
//! let mut stmt = conn.prepare("SELECT * FROM quotes")?;
//! let mut cursor = SqliteCursor::open(&mut stmt, [])?;
//! let mut rows = SqlRows::new(&mut cursor)?;
//! while rows.next() {
//!     rows.fetch()?;
//!     let (name, value) = rows.field_by_index(1)?;
//!     assert_eq!((name, value.to_text().as_ref()), ("author", "Plato"));
//! }
//! assert!(rows.err().is_none());
//! # Ok(())
//! # }
//! ```

pub mod cursor;
pub mod error;
pub mod rows;
pub mod sqlite;

pub use cursor::{Column, Cursor, CursorError, RawSlot};
pub use error::RowsError;
pub use rows::{FieldValue, Fields, SqlRows};
pub use sqlite::{SqliteConfig, SqliteCursor};

pub type Result<T> = std::result::Result<T, RowsError>;
