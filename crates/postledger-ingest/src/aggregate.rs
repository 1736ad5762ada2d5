use std::collections::HashMap;

use tracing::debug;

use crate::mapping::field;
use crate::model::{Engagement, PostAggregate, Snapshot, TransformedRow};

/// Folds transformed rows into per-post aggregates.
///
/// Rows without a usable post id are dropped silently but counted, so
/// operators can spot unexpected data loss. Non-metric fields are
/// last-write-wins across a post's rows; snapshots keep input order; the
/// lifetime metrics only ever move up.
#[derive(Debug, Default)]
pub struct PostAggregator {
    posts: HashMap<String, PostAggregate>,
    skipped: usize,
}

impl PostAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fold(&mut self, row: &TransformedRow) {
        let Some(post_id) = row.post_id() else {
            self.skipped += 1;
            debug!("dropping row without a post id");
            return;
        };

        let snapshot = Snapshot {
            date: row.report_date,
            earnings: row.earnings,
            qualified_views: row.metric(field::QUALIFIED_VIEWS),
            seconds_viewed: row.metric(field::SECONDS_VIEWED),
            engagement: Engagement {
                reactions: row.metric(field::REACTIONS),
                comments: row.metric(field::COMMENTS),
                shares: row.metric(field::SHARES),
            },
        };

        let entry = self.posts.entry(post_id).or_default();

        for (name, value) in &row.fields {
            entry.fields.insert(name, value.clone());
        }
        if row.publish_time.is_some() {
            entry.publish_time = row.publish_time;
        }
        if let Some(post_type) = &row.post_type {
            entry.post_type = Some(post_type.clone());
        }
        if let Some(quarter) = &row.quarter_range {
            entry.quarter_range = Some(quarter.clone());
        }

        entry.lifetime_earnings = entry.lifetime_earnings.max(snapshot.earnings);
        entry.lifetime_qualified_views =
            entry.lifetime_qualified_views.max(snapshot.qualified_views);
        entry.lifetime_seconds_viewed =
            entry.lifetime_seconds_viewed.max(snapshot.seconds_viewed);
        entry.snapshots.push(snapshot);
    }

    /// Consumes the aggregator, returning the per-post map and the number
    /// of rows dropped for lacking a post id.
    pub fn finish(self) -> (HashMap<String, PostAggregate>, usize) {
        (self.posts, self.skipped)
    }
}

pub fn aggregate(rows: &[TransformedRow]) -> (HashMap<String, PostAggregate>, usize) {
    let mut aggregator = PostAggregator::new();
    for row in rows {
        aggregator.fold(row);
    }
    aggregator.finish()
}
