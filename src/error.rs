use crate::CursorError;

/// Error type returned by [`SqlRows`](crate::SqlRows).
#[derive(Debug, thiserror::Error)]
pub enum RowsError {
    /// The cursor could not report its columns when the decoder was built.
    #[error("column metadata unavailable: {0}")]
    MetadataUnavailable(CursorError),
    /// The cursor refused to scan the current row. The row must not be read.
    #[error("scan failed: {0}")]
    ScanFailed(CursorError),
    /// Field index past the end of the column catalog.
    #[error("index {index} out of range for {length} fields")]
    OutOfRange { index: usize, length: usize },
    /// No column carries this exact name.
    #[error("field not found: {0}")]
    FieldNotFound(String),
    /// Field read before a successful fetch of the current row.
    #[error("no row fetched")]
    NotFetched,
}

#[cfg(test)]
mod tests {
    use crate::{CursorError, RowsError};

    #[test]
    fn scan_failure_keeps_cursor_message() {
        let err = RowsError::ScanFailed(CursorError::Closed);
        assert_eq!(err.to_string(), "scan failed: rows are closed");
    }

    #[test]
    fn driver_errors_keep_their_source() {
        let err = RowsError::ScanFailed(CursorError::driver("disk I/O error"));
        assert_eq!(err.to_string(), "scan failed: driver error: disk I/O error");
    }

    #[test]
    fn out_of_range_reports_bounds() {
        let err = RowsError::OutOfRange {
            index: 3,
            length: 3,
        };
        assert_eq!(err.to_string(), "index 3 out of range for 3 fields");
    }
}
