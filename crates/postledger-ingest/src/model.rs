use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::mapping::field;

/// A decoded cell value.
///
/// The decoder casts every data cell (header cells are kept verbatim):
/// empty strings and `"N/A"` become `Null`, currency-punctuated numerics
/// become `Number`, everything else stays `Text`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Number(f64),
    Text(String),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Renders the value as a non-empty map key, if it can serve as one.
    pub fn key_string(&self) -> Option<String> {
        match self {
            FieldValue::Null => None,
            FieldValue::Number(n) => Some(n.to_string()),
            FieldValue::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
        }
    }
}

/// One decoded data row, keyed by source column name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawRow {
    pub fields: HashMap<String, FieldValue>,
}

impl RawRow {
    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.fields.get(column)
    }
}

/// A row re-keyed to canonical field names.
///
/// Source columns with no canonical name are dropped; canonical fields
/// absent from the source are simply missing from the map.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MappedRow {
    pub fields: HashMap<&'static str, FieldValue>,
}

impl MappedRow {
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        self.fields.get(name).and_then(FieldValue::as_number)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(FieldValue::as_text)
    }
}

/// A mapped row plus the derived attributes the aggregator consumes.
#[derive(Debug, Clone, Serialize)]
pub struct TransformedRow {
    pub fields: HashMap<&'static str, FieldValue>,
    pub publish_time: Option<NaiveDateTime>,
    pub report_date: Option<NaiveDateTime>,
    pub earnings: f64,
    pub post_type: Option<String>,
    pub quarter_range: Option<String>,
}

impl TransformedRow {
    pub fn post_id(&self) -> Option<String> {
        self.fields.get(field::POST_ID).and_then(FieldValue::key_string)
    }

    /// Numeric field lookup defaulting to zero, for snapshot metrics.
    pub fn metric(&self, name: &str) -> f64 {
        self.fields
            .get(name)
            .and_then(FieldValue::as_number)
            .unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Engagement {
    pub reactions: f64,
    pub comments: f64,
    pub shares: f64,
}

/// A point-in-time metric reading for a post on a given report date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub date: Option<NaiveDateTime>,
    pub earnings: f64,
    pub qualified_views: f64,
    pub seconds_viewed: f64,
    pub engagement: Engagement,
}

/// Everything accumulated for one distinct post id.
///
/// `snapshots` preserves input order; the three lifetime metrics are the
/// maximum ever observed across those snapshots, never a sum.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PostAggregate {
    pub fields: HashMap<&'static str, FieldValue>,
    pub publish_time: Option<NaiveDateTime>,
    pub post_type: Option<String>,
    pub quarter_range: Option<String>,
    pub snapshots: Vec<Snapshot>,
    pub lifetime_earnings: f64,
    pub lifetime_qualified_views: f64,
    pub lifetime_seconds_viewed: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReportMetadata {
    /// All transformed rows, including those later dropped for a missing
    /// post id.
    pub total_rows: usize,
    pub unique_posts: usize,
    pub rows_missing_post_id: usize,
    /// Min/max over non-null report dates, or `None` if no row had one.
    pub date_range: Option<DateRange>,
}

/// The full outcome of one pipeline run, handed to the persistence layer.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProcessResult {
    pub raw: Vec<TransformedRow>,
    pub aggregated: HashMap<String, PostAggregate>,
    pub metadata: ReportMetadata,
}
