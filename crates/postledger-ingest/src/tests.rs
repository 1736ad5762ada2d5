use std::fs;
use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};

use crate::aggregate::aggregate;
use crate::decode::{cast_field, RowDecoder};
use crate::errors::ParseError;
use crate::mapping::{field, map_row};
use crate::model::{FieldValue, MappedRow, RawRow};
use crate::pipeline::process_report;
use crate::transform::{extract_quarter, normalize_post_type, parse_flexible_date, transform};

fn fixture(path: &str) -> String {
    let base = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let full_path = base.join("tests/data").join(path);
    fs::read_to_string(&full_path)
        .unwrap_or_else(|err| panic!("failed to read fixture {}: {}", full_path.display(), err))
}

fn mapped(entries: &[(&'static str, FieldValue)]) -> MappedRow {
    MappedRow {
        fields: entries.iter().cloned().collect(),
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

#[test]
fn cast_field_policy() {
    assert_eq!(cast_field(""), FieldValue::Null);
    assert_eq!(cast_field("  "), FieldValue::Null);
    assert_eq!(cast_field("N/A"), FieldValue::Null);
    assert_eq!(cast_field("$1,234.56"), FieldValue::Number(1234.56));
    assert_eq!(cast_field(" 42 "), FieldValue::Number(42.0));
    assert_eq!(cast_field("-3.5"), FieldValue::Number(-3.5));
    assert_eq!(cast_field("abc"), FieldValue::Text("abc".to_string()));
    assert_eq!(cast_field("12.5%"), FieldValue::Text("12.5%".to_string()));
    assert_eq!(
        cast_field("2025-06-01"),
        FieldValue::Text("2025-06-01".to_string())
    );
}

#[test]
fn date_formats_agree_on_calendar_date() {
    let expected = NaiveDate::from_ymd_opt(2025, 4, 15).unwrap();
    for raw in ["2025-04-15 10:00:00", "2025-04-15", "04/15/2025"] {
        let parsed = parse_flexible_date(raw)
            .unwrap_or_else(|| panic!("'{raw}' should parse"));
        assert_eq!(parsed.date(), expected, "mismatch for '{raw}'");
    }
    assert_eq!(
        parse_flexible_date("04/15/2025 10:00:00").map(|dt| dt.date()),
        Some(expected)
    );
    assert_eq!(
        parse_flexible_date("2025-04-15T10:00:00+00:00").map(|dt| dt.date()),
        Some(expected)
    );
    assert_eq!(parse_flexible_date("not-a-date"), None);
}

#[test]
fn earnings_selection_respects_cutover() {
    fn earnings(publish: &str, entries: &[(&'static str, FieldValue)]) -> f64 {
        let mut row = mapped(entries);
        row.fields.insert(
            field::PUBLISH_TIME,
            FieldValue::Text(publish.to_string()),
        );
        transform(row).earnings
    }

    let both = &[
        (field::ESTIMATED_EARNINGS, FieldValue::Number(3.0)),
        (field::APPROXIMATE_EARNINGS, FieldValue::Number(5.0)),
    ];

    assert_eq!(earnings("2025-04-02", both), 5.0);
    assert_eq!(earnings("2025-03-02", both), 3.0);

    // Before the cutover, the approximate column is the fallback.
    assert_eq!(
        earnings(
            "2025-03-02",
            &[(field::APPROXIMATE_EARNINGS, FieldValue::Number(5.0))],
        ),
        5.0
    );

    // The boundary itself is exclusive.
    assert_eq!(earnings("2025-04-01 00:00:00", both), 3.0);

    assert_eq!(earnings("2025-04-02", &[]), 0.0);
}

#[test]
fn post_type_normalization() {
    assert_eq!(normalize_post_type("Videos"), "Video");
    assert_eq!(normalize_post_type("Reel Video"), "Video");
    assert_eq!(normalize_post_type("REEL"), "Reel");
    assert_eq!(normalize_post_type("photo album"), "Photo");
    assert_eq!(normalize_post_type("Unknown"), "Unknown");
}

#[test]
fn quarter_extraction_is_independent_of_date_parsing() {
    assert_eq!(extract_quarter("2025-04-15"), Some("2025-Q2".to_string()));
    assert_eq!(extract_quarter("2025-12-01"), Some("2025-Q4".to_string()));
    assert_eq!(extract_quarter("2025-01"), Some("2025-Q1".to_string()));
    assert_eq!(extract_quarter("2025-13-40"), None);
    assert_eq!(extract_quarter("04/15/2025"), None);

    // A broken day still yields a quarter even though the date fails to
    // parse, and a slash date parses while yielding no quarter.
    assert_eq!(parse_flexible_date("2025-04-xx"), None);
    assert_eq!(extract_quarter("2025-04-xx"), Some("2025-Q2".to_string()));
    assert!(parse_flexible_date("04/15/2025").is_some());
    assert_eq!(extract_quarter("04/15/2025"), None);
}

#[test]
fn lifetime_maxima_are_permutation_invariant() {
    let row = |views: f64| {
        transform(mapped(&[
            (field::POST_ID, FieldValue::Text("P1".to_string())),
            (field::QUALIFIED_VIEWS, FieldValue::Number(views)),
        ]))
    };

    for order in [[100.0, 50.0, 200.0], [200.0, 100.0, 50.0], [50.0, 200.0, 100.0]] {
        let rows: Vec<_> = order.into_iter().map(row).collect();
        let (aggregated, skipped) = aggregate(&rows);
        assert_eq!(skipped, 0);
        let post = aggregated.get("P1").expect("P1 missing");
        assert_eq!(post.lifetime_qualified_views, 200.0);
        assert_eq!(post.snapshots.len(), 3);
    }
}

#[test]
fn rows_without_post_id_are_counted_not_keyed() {
    let keyed = transform(mapped(&[
        (field::POST_ID, FieldValue::Text("P1".to_string())),
        (field::QUALIFIED_VIEWS, FieldValue::Number(7.0)),
    ]));
    let null_id = transform(mapped(&[
        (field::POST_ID, FieldValue::Null),
        (field::QUALIFIED_VIEWS, FieldValue::Number(9.0)),
    ]));
    let absent_id = transform(mapped(&[(
        field::QUALIFIED_VIEWS,
        FieldValue::Number(11.0),
    )]));

    let rows = vec![keyed, null_id, absent_id];
    let (aggregated, skipped) = aggregate(&rows);
    assert_eq!(aggregated.len(), 1);
    assert_eq!(skipped, 2);
    assert!(aggregated.contains_key("P1"));
}

#[test]
fn numeric_post_ids_key_without_fraction() {
    let row = transform(mapped(&[(field::POST_ID, FieldValue::Number(123.0))]));
    assert_eq!(row.post_id().as_deref(), Some("123"));
}

#[test]
fn mapper_drops_unknown_columns_and_omits_absent_fields() {
    let raw = RawRow {
        fields: [
            (
                "Post ID".to_string(),
                FieldValue::Text("P1".to_string()),
            ),
            ("Qualified views".to_string(), FieldValue::Number(12.0)),
            (
                "Sound title".to_string(),
                FieldValue::Text("Original audio".to_string()),
            ),
        ]
        .into_iter()
        .collect(),
    };

    let row = map_row(&raw);
    assert_eq!(row.fields.len(), 2);
    assert_eq!(row.number(field::QUALIFIED_VIEWS), Some(12.0));
    assert!(row.get(field::PAGE_NAME).is_none());
}

#[test]
fn decoder_rejects_ragged_rows() {
    let content = "Post ID,Date,Qualified views\nP1,2025-06-01\n";
    let mut decoder = RowDecoder::new(content).expect("header should decode");
    match decoder.next() {
        Some(Err(ParseError::ColumnCount {
            line,
            expected,
            found,
        })) => {
            assert_eq!(line, 2);
            assert_eq!(expected, 3);
            assert_eq!(found, 2);
        }
        other => panic!("expected a column count error, got {other:?}"),
    }
}

#[test]
fn decoder_handles_quoted_commas_and_newlines() {
    let content =
        "Post ID,Description\nP1,\"first line,\nsecond line\"\n";
    let rows: Vec<_> = RowDecoder::new(content)
        .expect("header should decode")
        .collect::<Result<_, _>>()
        .expect("rows should decode");
    assert_eq!(rows.len(), 1);
    assert_eq!(
        rows[0].get("Description").and_then(FieldValue::as_text),
        Some("first line,\nsecond line")
    );
}

#[test]
fn single_post_snapshots_follow_input_order() {
    let content = "\
Post ID,Date,Qualified views
P1,2025-06-01,10
P1,2025-06-08,20
P1,2025-06-15,35
";
    let result = process_report(content).expect("report should process");
    let post = result.aggregated.get("P1").expect("P1 missing");
    assert_eq!(post.snapshots.len(), 3);
    let views: Vec<f64> = post
        .snapshots
        .iter()
        .map(|snap| snap.qualified_views)
        .collect();
    assert_eq!(views, vec![10.0, 20.0, 35.0]);
    assert_eq!(post.lifetime_qualified_views, 35.0);
}

#[test]
fn processes_page_posts_export_end_to_end() {
    let content = fixture("page_posts_export.csv");
    let result = process_report(&content).expect("fixture should process");

    assert_eq!(result.metadata.total_rows, 5);
    assert_eq!(result.metadata.unique_posts, 2);
    assert_eq!(result.metadata.rows_missing_post_id, 1);
    assert_eq!(result.aggregated.len(), 2);

    let range = result.metadata.date_range.expect("date range missing");
    assert_eq!(range.start, date(2025, 6, 1));
    assert_eq!(range.end, date(2025, 6, 15));

    let single = result
        .aggregated
        .get("1112223334445556_777888999")
        .expect("spring single missing");
    assert_eq!(single.post_type.as_deref(), Some("Video"));
    assert_eq!(single.quarter_range.as_deref(), Some("2025-Q2"));
    assert_eq!(single.snapshots.len(), 3);
    assert_eq!(single.lifetime_qualified_views, 35.0);
    assert_eq!(single.lifetime_seconds_viewed, 3100.0);
    // Published after the cutover, so earnings come from the approximate
    // column of each snapshot.
    assert!((single.lifetime_earnings - 4.10).abs() < 1e-9);
    assert_eq!(
        single.fields.get(field::DESCRIPTION).and_then(FieldValue::as_text),
        Some("Live cut, acoustic set")
    );

    let reel = result
        .aggregated
        .get("1112223334445556_111222333")
        .expect("winter reel missing");
    assert_eq!(reel.post_type.as_deref(), Some("Reel"));
    assert_eq!(reel.snapshots.len(), 1);
    // Published before the cutover, so the estimated column wins.
    assert!((reel.lifetime_earnings - 3.0).abs() < 1e-9);
    assert!(reel.fields.get(field::DESCRIPTION).expect("description").is_null());
}

#[test]
fn field_values_serialize_untagged() {
    let raw = RawRow {
        fields: [
            ("Reactions".to_string(), FieldValue::Number(3.0)),
            ("Description".to_string(), FieldValue::Null),
            (
                "Title".to_string(),
                FieldValue::Text("Spring Single".to_string()),
            ),
        ]
        .into_iter()
        .collect(),
    };

    let json = serde_json::to_value(&raw).expect("row should serialize");
    assert_eq!(json["fields"]["Reactions"], serde_json::json!(3.0));
    assert!(json["fields"]["Description"].is_null());
    assert_eq!(json["fields"]["Title"], serde_json::json!("Spring Single"));
}

#[test]
fn empty_input_yields_empty_result() {
    let result = process_report("").expect("empty input should process");
    assert_eq!(result.metadata.total_rows, 0);
    assert_eq!(result.metadata.unique_posts, 0);
    assert!(result.metadata.date_range.is_none());
    assert!(result.aggregated.is_empty());
}
