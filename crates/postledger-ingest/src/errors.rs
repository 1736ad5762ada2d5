use thiserror::Error;

/// Errors raised while decoding a performance report.
///
/// Any variant aborts the whole file: callers never receive a partial
/// [`crate::model::ProcessResult`].
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("CSV syntax error: {source}")]
    Csv {
        #[from]
        source: csv::Error,
    },

    #[error("row {line} has {found} columns, header has {expected}")]
    ColumnCount {
        line: usize,
        expected: usize,
        found: usize,
    },
}
