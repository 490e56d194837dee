use rusqlite::{types::ValueRef, Connection, Params, Row, Rows, Statement};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Column, Cursor, CursorError, RawSlot};

/// SQLite connection configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqliteConfig {
    /// Path to the SQLite database file. `None` opens a private in-memory database.
    #[serde(default)]
    pub db_path: Option<String>,
}

impl SqliteConfig {
    /// Create a new SQLite config for a database file
    pub fn new(db_path: impl Into<String>) -> Self {
        Self {
            db_path: Some(db_path.into()),
        }
    }

    /// Create a config for an in-memory database
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open a connection. Pooling and transactions are up to the caller.
    pub fn open(&self) -> rusqlite::Result<Connection> {
        match &self.db_path {
            Some(path) => {
                debug!(path = %path, "opening sqlite database");
                Connection::open(path)
            }
            None => {
                debug!("opening in-memory sqlite database");
                Connection::open_in_memory()
            }
        }
    }
}

impl From<rusqlite::Error> for CursorError {
    fn from(err: rusqlite::Error) -> Self {
        CursorError::driver(err)
    }
}

/// [`Cursor`] over the rows of a prepared rusqlite statement.
///
/// Stepping copies the positioned row out of SQLite, so `scan` can be called
/// any number of times for the same row. The cursor closes itself once the
/// rows are exhausted or stepping fails.
pub struct SqliteCursor<'stmt> {
    rows: Option<Rows<'stmt>>,
    columns: Vec<Column>,
    current: Option<Vec<RawSlot>>,
    err: Option<CursorError>,
}

impl<'stmt> SqliteCursor<'stmt> {
    /// Runs `stmt` with `params`, capturing its column names and declared types.
    pub fn open<P: Params>(
        stmt: &'stmt mut Statement<'_>,
        params: P,
    ) -> Result<Self, CursorError> {
        let columns = stmt
            .columns()
            .iter()
            .map(|column| Column::new(column.name(), column.decl_type()))
            .collect();
        let rows = stmt.query(params)?;
        Ok(Self {
            rows: Some(rows),
            columns,
            current: None,
            err: None,
        })
    }
}

impl std::fmt::Debug for SqliteCursor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteCursor")
            .field("columns", &self.columns)
            .field("closed", &self.rows.is_none())
            .field("positioned", &self.current.is_some())
            .field("err", &self.err)
            .finish()
    }
}

impl Cursor for SqliteCursor<'_> {
    fn advance(&mut self) -> bool {
        self.current = None;
        let Some(rows) = self.rows.as_mut() else {
            return false;
        };
        let width = self.columns.len();
        let stepped = match rows.next() {
            Ok(Some(row)) => read_row(row, width).map(Some),
            Ok(None) => Ok(None),
            Err(err) => Err(CursorError::from(err)),
        };
        match stepped {
            Ok(Some(row)) => {
                self.current = Some(row);
                true
            }
            Ok(None) => {
                debug!("sqlite rows exhausted");
                self.close();
                false
            }
            Err(err) => {
                debug!(error = %err, "sqlite step failed");
                self.err = Some(err);
                self.close();
                false
            }
        }
    }

    fn scan(&mut self, dest: &mut [RawSlot]) -> Result<(), CursorError> {
        if self.rows.is_none() {
            return Err(CursorError::Closed);
        }
        let row = self.current.as_ref().ok_or(CursorError::NoRow)?;
        if dest.len() != row.len() {
            return Err(CursorError::SlotCount {
                expected: row.len(),
                got: dest.len(),
            });
        }
        // The row stays owned here so repeated scans of one row all succeed.
        dest.clone_from_slice(row);
        Ok(())
    }

    fn columns(&self) -> Result<Vec<Column>, CursorError> {
        if self.rows.is_none() {
            return Err(CursorError::Closed);
        }
        Ok(self.columns.clone())
    }

    fn close(&mut self) {
        self.current = None;
        self.rows = None;
    }

    fn err(&self) -> Option<&CursorError> {
        self.err.as_ref()
    }
}

fn read_row(row: &Row<'_>, width: usize) -> Result<Vec<RawSlot>, CursorError> {
    (0..width)
        .map(|idx| row.get_ref(idx).map(raw_slot).map_err(CursorError::from))
        .collect()
}

// Numbers are rendered the way SQLite's own text conversion would show them.
fn raw_slot(value: ValueRef<'_>) -> RawSlot {
    match value {
        ValueRef::Null => RawSlot::Null,
        ValueRef::Integer(value) => RawSlot::Bytes(value.to_string().into_bytes()),
        ValueRef::Real(value) => RawSlot::Bytes(real_text(value).into_bytes()),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => RawSlot::Bytes(bytes.to_vec()),
    }
}

/// Text form of a REAL as `CAST(x AS TEXT)` produces it: SQLite's `%!.15g`.
///
/// 15 significant digits, trailing zeros dropped but at least one digit kept
/// after the point, exponent form outside `1e-4..1e15` with a signed exponent
/// of at least two digits (`1.0e+21`).
fn real_text(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_owned();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Inf" } else { "-Inf" }.to_owned();
    }

    // Rounding to 15 digits first decides which notation %g picks.
    let scientific = format!("{value:.14e}");
    let (mantissa, exponent) = scientific
        .split_once('e')
        .unwrap_or((scientific.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if (-4..15).contains(&exponent) {
        let precision = (14 - exponent) as usize;
        keep_one_fraction_digit(&format!("{value:.precision$}"))
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{sign}{:02}",
            keep_one_fraction_digit(mantissa),
            exponent.abs()
        )
    }
}

fn keep_one_fraction_digit(digits: &str) -> String {
    if !digits.contains('.') {
        return format!("{digits}.0");
    }
    let trimmed = digits.trim_end_matches('0');
    match trimmed.strip_suffix('.') {
        Some(whole) => format!("{whole}.0"),
        None => trimmed.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use rusqlite::types::ValueRef;

    use super::{raw_slot, real_text, SqliteConfig};
    use crate::RawSlot;

    #[test]
    fn config_defaults_to_memory() {
        let config: SqliteConfig = serde_json::from_str("{}").expect("must parse");
        assert_eq!(config, SqliteConfig::in_memory());

        let config: SqliteConfig =
            serde_json::from_str(r#"{"db_path": "/tmp/quotes.db"}"#).expect("must parse");
        assert_eq!(config, SqliteConfig::new("/tmp/quotes.db"));
    }

    #[test]
    fn raw_slot_keeps_text_form() {
        assert_eq!(raw_slot(ValueRef::Null), RawSlot::Null);
        assert_eq!(raw_slot(ValueRef::Integer(-42)), RawSlot::Bytes(b"-42".to_vec()));
        assert_eq!(raw_slot(ValueRef::Real(1.5)), RawSlot::Bytes(b"1.5".to_vec()));
        assert_eq!(raw_slot(ValueRef::Real(1.0)), RawSlot::Bytes(b"1.0".to_vec()));
        assert_eq!(
            raw_slot(ValueRef::Blob(&[0, 159, 146])),
            RawSlot::Bytes(vec![0, 159, 146])
        );
    }

    #[test]
    fn real_text_matches_sqlite_cast() {
        assert_eq!(real_text(1.0), "1.0");
        assert_eq!(real_text(0.1 + 0.2), "0.3");
        assert_eq!(real_text(1e21), "1.0e+21");
        assert_eq!(real_text(-2.5), "-2.5");
        assert_eq!(real_text(0.0), "0.0");
        assert_eq!(real_text(1e-5), "1.0e-05");
        assert_eq!(real_text(0.0001), "0.0001");
        assert_eq!(real_text(123456.789), "123456.789");
        assert_eq!(real_text(1e14), "100000000000000.0");
        assert_eq!(real_text(1e15), "1.0e+15");
        assert_eq!(real_text(1.5e300), "1.5e+300");
        assert_eq!(real_text(f64::INFINITY), "Inf");
        assert_eq!(real_text(f64::NEG_INFINITY), "-Inf");
    }
}
