use tracing::info;

use crate::aggregate::PostAggregator;
use crate::decode::RowDecoder;
use crate::errors::ParseError;
use crate::mapping::map_row;
use crate::model::{DateRange, ProcessResult, ReportMetadata, TransformedRow};
use crate::transform::transform;

/// Runs one performance report through decode → map → transform → aggregate.
///
/// One invocation processes exactly one file to completion or failure; a
/// syntax error anywhere aborts with no partial result. Invocations share
/// no state, so callers may process different files concurrently.
pub fn process_report(content: &str) -> Result<ProcessResult, ParseError> {
    let decoder = RowDecoder::new(content)?;

    let mut raw = Vec::new();
    for record in decoder {
        let row = record?;
        raw.push(transform(map_row(&row)));
    }

    let mut aggregator = PostAggregator::new();
    for row in &raw {
        aggregator.fold(row);
    }
    let (aggregated, rows_missing_post_id) = aggregator.finish();

    let metadata = ReportMetadata {
        total_rows: raw.len(),
        unique_posts: aggregated.len(),
        rows_missing_post_id,
        date_range: date_range(&raw),
    };

    info!(
        total_rows = metadata.total_rows,
        unique_posts = metadata.unique_posts,
        rows_missing_post_id = metadata.rows_missing_post_id,
        "processed performance report"
    );

    Ok(ProcessResult {
        raw,
        aggregated,
        metadata,
    })
}

fn date_range(rows: &[TransformedRow]) -> Option<DateRange> {
    let mut range: Option<DateRange> = None;
    for date in rows.iter().filter_map(|row| row.report_date) {
        range = Some(match range {
            None => DateRange {
                start: date,
                end: date,
            },
            Some(current) => DateRange {
                start: current.start.min(date),
                end: current.end.max(date),
            },
        });
    }
    range
}
