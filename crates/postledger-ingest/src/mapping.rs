use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::model::{MappedRow, RawRow};

/// Canonical field names used throughout the pipeline.
pub mod field {
    pub const POST_ID: &str = "post_id";
    pub const PAGE_ID: &str = "page_id";
    pub const PAGE_NAME: &str = "page_name";
    pub const TITLE: &str = "title";
    pub const DESCRIPTION: &str = "description";
    pub const DURATION_SECONDS: &str = "duration_seconds";
    pub const PUBLISH_TIME: &str = "publish_time";
    pub const CAPTION_TYPE: &str = "caption_type";
    pub const PERMALINK: &str = "permalink";
    pub const POST_TYPE: &str = "post_type";
    pub const ASSET_TAG: &str = "asset_tag";
    pub const REPORT_DATE: &str = "report_date";
    pub const ENGAGEMENT_TOTAL: &str = "engagement_total";
    pub const REACTIONS: &str = "reactions";
    pub const COMMENTS: &str = "comments";
    pub const SHARES: &str = "shares";
    pub const SECONDS_VIEWED: &str = "seconds_viewed";
    pub const AVG_SECONDS_VIEWED: &str = "avg_seconds_viewed";
    pub const ESTIMATED_EARNINGS: &str = "estimated_earnings";
    pub const APPROXIMATE_EARNINGS: &str = "approximate_earnings";
    pub const QUALIFIED_VIEWS: &str = "qualified_views";
    pub const THREE_SECOND_VIEWS: &str = "three_second_views";
    pub const ONE_MINUTE_VIEWS: &str = "one_minute_views";
}

/// Source column header → canonical field name.
///
/// These headers must match the platform's performance export verbatim,
/// including the `(USD)` suffixes. Columns not listed here are dropped at
/// the mapping stage.
pub static COLUMN_MAP: &[(&str, &str)] = &[
    ("Post ID", field::POST_ID),
    ("Page ID", field::PAGE_ID),
    ("Page name", field::PAGE_NAME),
    ("Title", field::TITLE),
    ("Description", field::DESCRIPTION),
    ("Duration (sec)", field::DURATION_SECONDS),
    ("Publish time", field::PUBLISH_TIME),
    ("Caption type", field::CAPTION_TYPE),
    ("Permalink", field::PERMALINK),
    ("Post type", field::POST_TYPE),
    ("Custom labels", field::ASSET_TAG),
    ("Date", field::REPORT_DATE),
    ("Reactions, Comments and Shares", field::ENGAGEMENT_TOTAL),
    ("Reactions", field::REACTIONS),
    ("Comments", field::COMMENTS),
    ("Shares", field::SHARES),
    ("Seconds viewed", field::SECONDS_VIEWED),
    ("Average Seconds viewed", field::AVG_SECONDS_VIEWED),
    ("Estimated earnings (USD)", field::ESTIMATED_EARNINGS),
    (
        "Approximate content monetization earnings (USD)",
        field::APPROXIMATE_EARNINGS,
    ),
    ("Qualified views", field::QUALIFIED_VIEWS),
    ("3-second video views", field::THREE_SECOND_VIEWS),
    ("1-minute video views", field::ONE_MINUTE_VIEWS),
];

static LOOKUP: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| COLUMN_MAP.iter().copied().collect());

pub fn canonical_field(column: &str) -> Option<&'static str> {
    LOOKUP.get(column).copied()
}

/// Re-keys a raw row to canonical field names. Total over any input: unknown
/// columns are dropped, missing ones are left out of the result.
pub fn map_row(raw: &RawRow) -> MappedRow {
    let mut fields = HashMap::new();
    for (column, value) in &raw.fields {
        if let Some(name) = canonical_field(column.as_str()) {
            fields.insert(name, value.clone());
        }
    }
    MappedRow { fields }
}
