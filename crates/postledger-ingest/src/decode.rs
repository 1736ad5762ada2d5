use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::ParseError;
use crate::model::{FieldValue, RawRow};

/// Matches a bare numeric string after currency punctuation is stripped.
static NUMERIC_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)$").expect("numeric pattern"));

/// Casts one data cell.
///
/// Empty strings and the literal `N/A` become null. Currency and thousands
/// punctuation (`$`, `,`) is stripped before the numeric check, so
/// `"$1,234.56"` decodes to `1234.56`. Anything non-numeric passes through
/// as trimmed text.
pub fn cast_field(raw: &str) -> FieldValue {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "N/A" {
        return FieldValue::Null;
    }

    let stripped: String = trimmed.chars().filter(|c| *c != '$' && *c != ',').collect();
    if NUMERIC_PATTERN.is_match(&stripped) {
        if let Ok(parsed) = stripped.parse::<f64>() {
            if parsed.is_finite() {
                return FieldValue::Number(parsed);
            }
        }
    }

    FieldValue::Text(trimmed.to_string())
}

/// Streams a delimited report as [`RawRow`]s.
///
/// The first record defines the column set for the rest of the file; a row
/// with a different column count, or malformed quoting anywhere, yields a
/// [`ParseError`] and the caller is expected to abort the whole file.
/// Single pass, not restartable.
pub struct RowDecoder<'a> {
    headers: Vec<String>,
    records: csv::StringRecordsIntoIter<&'a [u8]>,
    // 1-indexed position of the last record handed out, starting at the
    // header row.
    line: usize,
}

impl<'a> RowDecoder<'a> {
    pub fn new(content: &'a str) -> Result<Self, ParseError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(content.as_bytes());

        let headers = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        Ok(Self {
            headers,
            records: reader.into_records(),
            line: 1,
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }
}

impl Iterator for RowDecoder<'_> {
    type Item = Result<RawRow, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = match self.records.next()? {
            Ok(record) => record,
            Err(err) => return Some(Err(err.into())),
        };
        self.line += 1;

        if record.len() != self.headers.len() {
            return Some(Err(ParseError::ColumnCount {
                line: self.line,
                expected: self.headers.len(),
                found: record.len(),
            }));
        }

        let mut fields = HashMap::with_capacity(self.headers.len());
        for (header, value) in self.headers.iter().zip(record.iter()) {
            fields.insert(header.clone(), cast_field(value));
        }

        Some(Ok(RawRow { fields }))
    }
}
